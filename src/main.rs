//! This file defines the edustats binary entry point.

use edustats::app;
use edustats::app_state::AppState;
use edustats::cli::{self, Command};
use edustats::distinct::FilterOptions;
use edustats::error::DashboardError;
use edustats::server;
use edustats::tracing;
use edustats::view::{render_view, ViewKind};

use serde::Serialize;
use std::process::exit;
use validator::Validate;

/// Print a value to stdout as pretty JSON.
fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Failed to serialise output: {}", err),
    }
}

/// Run the selected subcommand.
async fn run(args: &cli::CommandLineArgs) -> Result<(), DashboardError> {
    match &args.command {
        None | Some(Command::Serve) => {
            app::init();
            let service = app::service(args)?;
            server::serve(args, service).await;
        }
        Some(Command::Render { view, filters }) => {
            let view: ViewKind = view.parse()?;
            let state = AppState::new(args)?;
            let filters = cli::filter_map(filters);
            filters.validate()?;
            let outcome = render_view(view, state.source.as_ref(), &filters).await;
            print_json(&outcome);
        }
        Some(Command::Options) => {
            let state = AppState::new(args)?;
            let options = FilterOptions::load(state.source.as_ref()).await;
            print_json(&options);
        }
    }
    Ok(())
}

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    let result = run(&args).await;
    tracing::shutdown_tracing();
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        exit(1)
    }
}
