use clap::Args;
use storefront_app::{config::DatabaseConfig, database};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct MigrateArgs {
    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: MigrateArgs) -> Result<(), String> {
    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    info!("migrations applied");

    Ok(())
}
