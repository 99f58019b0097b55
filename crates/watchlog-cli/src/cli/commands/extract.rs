use std::fs;
use std::io::Read;

use anyhow::Context;
use watchlog_core::extract_report;

use super::super::args::ExtractArgs;
use super::print_json;
use crate::exit_codes::SUCCESS;

pub fn run(args: ExtractArgs) -> anyhow::Result<i32> {
    let transcript = if args.transcript.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading transcript from stdin")?;
        buf
    } else {
        fs::read_to_string(&args.transcript)
            .with_context(|| format!("reading transcript {}", args.transcript.display()))?
    };

    print_json(&extract_report(&transcript))?;
    Ok(SUCCESS)
}
