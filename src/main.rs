use clap::Parser;
use expense_ledger::args::{Args, Command};
use expense_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home)?.print(),

        Command::Register(login) => commands::register(&Config::load(home)?, login)?.print(),

        Command::Add(add_args) => commands::add(&Config::load(home)?, add_args)?.print(),

        Command::Edit(edit_args) => commands::edit(&Config::load(home)?, edit_args)?.print(),

        Command::Delete(delete_args) => {
            commands::delete(&Config::load(home)?, delete_args)?.print()
        }

        Command::List(list_args) => commands::list(&Config::load(home)?, list_args)?.print(),

        Command::Total(total_args) => commands::total(&Config::load(home)?, total_args)?.print(),

        Command::Analytics(login) => commands::analytics(&Config::load(home)?, login)?.print(),

        Command::Export(export_args) => {
            commands::export(&Config::load(home)?, export_args)?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the given level for the library and the binary only.
            EnvFilter::new(format!(
                "expense_ledger={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
