use clap::Args;
use storefront_app::{
    config::{DatabaseConfig, OrdersConfig, WorkerConfig},
    context::AppContext,
    shutdown,
};
use tokio::sync::watch;
use tracing::error;

#[derive(Debug, Args)]
pub(crate) struct WorkerArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    orders: OrdersConfig,

    #[command(flatten)]
    worker: WorkerConfig,
}

pub(crate) async fn run(args: WorkerArgs) -> Result<(), String> {
    let context = AppContext::from_config(&args.database, &args.orders)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))?;

    let (notify, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(notify).await {
            error!(error = %error, "shutdown listener failed");
        }
    });

    context.worker(&args.worker).run(shutdown_rx).await;

    Ok(())
}
