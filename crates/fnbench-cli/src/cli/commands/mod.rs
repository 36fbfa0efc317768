use super::args::{Cli, Command};

pub mod categories;
pub mod run;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Categories => categories::run(),
    }
}
