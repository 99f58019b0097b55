use super::super::args::*;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Record(args) => super::record::run(args, &global),
        Command::Extract(args) => super::extract::run(args),
        Command::Import(args) => super::import::run(args, &global).await,
        Command::Runs(args) => super::query::runs(args, &global),
        Command::Show(args) => super::query::show(args, &global),
        Command::LastRun(args) => super::query::last_run(args, &global),
        Command::Namespaces(args) => super::query::namespaces(args, &global),
        Command::Fixes(args) => super::query::fixes(args, &global),
        Command::Stats => super::query::stats(&global),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
