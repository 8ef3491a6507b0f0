//! Pasteburn CLI - self-destructing, optionally passphrase-protected pastes
//!
//! Drives the paste engine from the command line against a local store.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod logging;
mod output;

use clap::{CommandFactory, Parser};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose, cli.quiet) {
        eprintln!("Warning: logging disabled: {}", err);
    }

    if let Err(err) = run(&cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Init(args) => return commands::handle_init(cli, args),
        Commands::Completions(args) => return commands::handle_completions(args.shell),
        _ => {}
    }

    let ctx = AppContext::new(cli);
    match command {
        Commands::Put(args) => commands::handle_put(&ctx, args),
        Commands::Get(args) => commands::handle_get(&ctx, args),
        Commands::Confirm(args) => commands::handle_confirm(&ctx, args),
        Commands::Delete(args) => commands::handle_delete(&ctx, args),
        Commands::AdminKey => commands::handle_admin_key(&ctx),
        Commands::Purge => commands::handle_purge(&ctx),
        Commands::Check => commands::handle_check(&ctx),
        Commands::Init(_) | Commands::Completions(_) => Ok(()),
    }
}
