//! Lumi CLI - offline H5P content bridge
//!
//! Exports stored content as H5P packages, imports packages as new content
//! and serves the local HTTP bridge the editor UI talks to.
//!
//! ## Quick Start
//!
//! ```bash
//! # Export content 1, choosing the target interactively
//! lumi export 1
//!
//! # Import a package
//! lumi import ./quiz.h5p
//!
//! # Serve the bridge for the editor UI
//! lumi serve
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

use anyhow::Result;
use clap::Parser;

mod commands;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::List(args) => commands::content::list(args).await,
        Command::Show(args) => commands::content::show(args).await,
        Command::Update(args) => commands::content::update(args).await,
        Command::Delete(args) => commands::content::delete(args).await,
        Command::Export(args) => commands::export::run(args).await,
        Command::Import(args) => commands::import::run(args).await,
        #[cfg(feature = "web")]
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Config(args) => commands::config::run(args).await,
    };

    match result {
        Err(e) if is_user_abort(&e) => {
            eprintln!("cancelled");
            Ok(())
        }
        other => other,
    }
}

fn is_user_abort(err: &anyhow::Error) -> bool {
    err.downcast_ref::<lumi_core::Error>()
        .is_some_and(lumi_core::Error::is_user_abort)
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,lumi=info,lumi_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
