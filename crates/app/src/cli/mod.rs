use clap::{Parser, Subcommand};
use storefront_app::{config::LoggingConfig, observability};

mod db;
mod orders;
mod worker;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Worker(worker::WorkerArgs),
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Worker(args) => worker::run(args).await,
            Commands::Orders(command) => orders::run(command).await,
        }
    }
}
