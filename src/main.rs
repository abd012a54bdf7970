use chrono::Datelike;
use dotenvy::dotenv;
use storefront::{
    config::{database, settings},
    core::revenue::{RevenueScope, format_revenue_summary, monthly_revenue_scoped},
    errors::Result,
    storage::LocalBlobStore,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load application settings
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Blob store for product images
    let blobs = LocalBlobStore::from_config(&app_config.storage);
    tokio::fs::create_dir_all(blobs.root()).await?;
    info!("Serving product images from {}", blobs.root().display());

    // 6. Report the current year's dashboard
    let year = chrono::Local::now().year();
    let scope = RevenueScope::from_config(&app_config.revenue);
    let months = monthly_revenue_scoped(&db, year, scope).await?;
    info!("\n{}", format_revenue_summary(year, &months));

    Ok(())
}
