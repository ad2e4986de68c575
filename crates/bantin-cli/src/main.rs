//! bantin-cli: headless admin client for the bantin content API.
//! Plays the role of the original admin screens: cached list reads,
//! diff-based partial updates, drag-style reordering, and a durable session.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod context;
mod handlers;
mod io;
mod print;

use clap::Parser;

use args::{Cli, Commands};
use context::{CliError, build_ctx, load_config};
use handlers::{categories, posts, session, users};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    bantin::telemetry::init(&config.logging)?;
    let ctx = build_ctx(&cli, config)?;

    match cli.command {
        Commands::Users(cmd) => users::handle(&ctx, cmd.action).await?,
        Commands::Categories(cmd) => categories::handle(&ctx, cmd.action).await?,
        Commands::Posts(cmd) => posts::handle(&ctx, cmd.action).await?,
        Commands::Session(cmd) => session::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
