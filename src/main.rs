mod audit;
mod cli;
mod config;
mod db;
mod error;
mod executor;
mod fmt;
mod ledger;
mod matcher;
mod models;
mod normalizer;
mod parser;
mod payments;
mod settings;
mod verifier;

use clap::Parser;

use cli::{Cli, Commands, LedgersCommands, PaymentsCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Upload {
            file,
            bank,
            statement_date,
            kind,
        } => cli::upload::run(&file, bank.as_deref(), statement_date.as_deref(), kind.as_deref()),
        Commands::Ledgers { command } => match command {
            LedgersCommands::List => cli::ledgers::list(),
            LedgersCommands::Show { ledger_id } => cli::ledgers::show(ledger_id),
        },
        Commands::Automatch { ledger_id } => cli::automatch::run(ledger_id),
        Commands::Match { item_id, payment_id } => cli::matching::bind(item_id, payment_id),
        Commands::Unmatch { item_id } => cli::matching::unbind(item_id),
        Commands::Verify { ledger_id } => cli::verify::run(ledger_id),
        Commands::Delete { ledger_id } => cli::delete::run(ledger_id),
        Commands::Payments { command } => match command {
            PaymentsCommands::List { status } => cli::payments::list(status.as_deref()),
            PaymentsCommands::Add {
                payer,
                receipt,
                amount,
                date,
                channel,
            } => cli::payments::add(&payer, &receipt, amount, &date, &channel),
        },
        Commands::Status => cli::status::run(),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
