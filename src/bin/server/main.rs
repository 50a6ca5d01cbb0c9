use anyhow::{Context, Result};
use catalog_server::{
    app::{seed_sample_data, AppBuilder, AppConfig, DocumentBackend, PictureBackend, UpdateStatus},
    MongoConfig,
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "Product and category catalog server", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Document store backend (memory or mongodb)
    #[arg(long, env = "STORE_BACKEND", default_value = "memory")]
    store_backend: String,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URL")]
    mongodb_url: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DATABASE", default_value = "catalog")]
    mongodb_database: String,

    /// Directory uploaded pictures are written to
    #[arg(long, env = "UPLOADS_PATH", default_value = "./uploads")]
    uploads_path: PathBuf,

    /// Status answered by product updates (created or ok)
    #[arg(long, env = "UPDATE_STATUS", default_value = "created")]
    update_status: String,

    /// Replace both collections with the sample catalog on startup
    #[arg(long, env = "SEED_DATA", default_value = "false")]
    seed: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let document_backend = match self.store_backend.as_str() {
            "memory" => DocumentBackend::InMemory,
            "mongodb" | "mongo" => {
                let url = self
                    .mongodb_url
                    .clone()
                    .context("MONGODB_URL is required for the mongodb backend")?;
                DocumentBackend::MongoDb(MongoConfig::new(url, self.mongodb_database.clone()))
            }
            _ => anyhow::bail!("Unknown store backend: {}", self.store_backend),
        };

        let update_status = match self.update_status.to_lowercase().as_str() {
            "created" | "201" => UpdateStatus::Created,
            "ok" | "200" => UpdateStatus::Ok,
            _ => anyhow::bail!("Unknown update status: {}", self.update_status),
        };

        Ok(AppConfig {
            document_backend,
            picture_backend: PictureBackend::LocalDirectory {
                path: self.uploads_path.clone(),
            },
            update_status,
        })
    }

    fn init_logging(&self) -> Result<()> {
        // RUST_LOG wins over --log-level when set
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.log_level.to_lowercase()))
            .context("Invalid log level")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting Catalog Server");
    info!("Store backend: {}", cli.store_backend);
    info!("Uploads path: {}", cli.uploads_path.display());

    let config = cli.to_app_config()?;
    let app_builder = AppBuilder::new().with_config(config);

    let deps = app_builder
        .build_dependencies()
        .await
        .context("Failed to build application")?;

    if cli.seed {
        seed_sample_data(&deps)
            .await
            .context("Failed to seed sample data")?;
        info!("Sample catalog loaded");
    }

    let router = app_builder.build_with(deps).router();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await
        .context("Failed to start server")?;

    Ok(())
}
