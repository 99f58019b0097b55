//! Process exit codes. Scripts match on these; keep them stable.

pub const SUCCESS: i32 = 0;
pub const NOT_FOUND: i32 = 1; // Requested run does not exist
pub const CONFIG_ERROR: i32 = 2; // Bad config, unreachable store, unreadable input
