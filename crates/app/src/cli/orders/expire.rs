use clap::Args;
use storefront_app::{
    config::{DatabaseConfig, OrdersConfig},
    context::AppContext,
    domain::orders::{CancellationScheduler, ExpiryOutcome, records::OrderUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ExpireArgs {
    /// Order to close
    #[arg(long)]
    order_uuid: Uuid,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    orders: OrdersConfig,
}

pub(crate) async fn run(args: ExpireArgs) -> Result<(), String> {
    let context = AppContext::from_config(&args.database, &args.orders)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))?;

    let order_uuid = OrderUuid::from_uuid(args.order_uuid);

    let outcome = context
        .cancellations
        .handle_expiry(order_uuid)
        .await
        .map_err(|error| format!("failed to expire order: {error}"))?;

    match outcome {
        ExpiryOutcome::Closed { released_lines } => {
            println!("order_uuid: {order_uuid}");
            println!("status: closed");
            println!("released_lines: {released_lines}");
        }
        ExpiryOutcome::Skipped { status } => {
            println!("order_uuid: {order_uuid}");
            println!("status: {status} (unchanged)");
        }
        ExpiryOutcome::Missing => return Err(format!("order {order_uuid} not found")),
    }

    Ok(())
}
