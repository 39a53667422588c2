//! `liftlog`: sign in to the workout service and manage workouts from a shell.

mod args;
mod commands;

use clap::Parser;

use crate::args::Cli;
use crate::commands::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    liftlog_observability::init();

    let cli = Cli::parse();
    let app = App::open(&cli.global)?;
    app.run(cli.command).await
}
