//! quire-cli: curate the admin collections of a blog backend from the shell.
#![deny(clippy::all, clippy::pedantic)]

mod client;
mod handlers;
mod print;

use std::process::ExitCode;

use quire::{
    config::{self, Command},
    domain::entities::{CommentRecord, PostRecord},
    infra::telemetry,
};

use client::{CliError, Ctx};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<handlers::Status, CliError> {
    let (cli, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;
    let ctx = Ctx::from_settings(&settings)?;

    match cli.command {
        Command::Users(cmd) => handlers::users(&ctx, cmd.action).await,
        Command::Comments(cmd) => handlers::moderate::<CommentRecord>(&ctx, cmd.action).await,
        Command::Posts(cmd) => handlers::moderate::<PostRecord>(&ctx, cmd.action).await,
    }
}

#[cfg(test)]
mod tests;
