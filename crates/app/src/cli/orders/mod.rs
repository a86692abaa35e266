use clap::{Args, Subcommand};

mod expire;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Close a pending order now and release its stock
    Expire(expire::ExpireArgs),
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Expire(args) => expire::run(args).await,
    }
}
