//! Bondsman CLI: command-line client for a running Bondsman node.
//!
//! Subcommands: init, status, create, list, view, sign, validate, confirm,
//! close, ledger, withdraw.

mod commands;

use clap::{Parser, Subcommand};

/// Bondsman: two-party escrow bonds with an arbiter.
#[derive(Parser, Debug)]
#[command(name = "bondsman", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new Bondsman node configuration.
    Init(commands::init::InitArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
    /// Register a new bond.
    Create(commands::create::CreateArgs),
    /// List every bond.
    List(commands::list::ListArgs),
    /// Show one bond.
    View(commands::view::ViewArgs),
    /// Sign a bond as its second party.
    Sign(commands::sign::SignArgs),
    /// Validate a signed bond as the arbiter.
    Validate(commands::validate::ValidateArgs),
    /// Confirm a bond as one of its parties.
    Confirm(commands::confirm::ConfirmArgs),
    /// Close a fully confirmed bond as the arbiter.
    Close(commands::close::CloseArgs),
    /// Show escrow and fee figures (arbiter only).
    Ledger(commands::ledger::LedgerArgs),
    /// Withdraw accrued fees (arbiter only).
    Withdraw(commands::withdraw::WithdrawArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Create(args) => commands::create::run(args).await,
        Commands::List(args) => commands::list::run(args).await,
        Commands::View(args) => commands::view::run(args).await,
        Commands::Sign(args) => commands::sign::run(args).await,
        Commands::Validate(args) => commands::validate::run(args).await,
        Commands::Confirm(args) => commands::confirm::run(args).await,
        Commands::Close(args) => commands::close::run(args).await,
        Commands::Ledger(args) => commands::ledger::run(args).await,
        Commands::Withdraw(args) => commands::withdraw::run(args).await,
    }
}
