use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use phono_api::{
    AppState,
    config::{ServerConfig, StorageBackend},
    jwt::JwtService,
    routes,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Phono API service");

    let config = ServerConfig::from_env()?;
    let jwt_service = JwtService::new(&config.jwt_secret, config.token_ttl_seconds)?;

    let app_state = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            AppState::with_postgres(pool, jwt_service)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data will not survive a restart");
            AppState::in_memory(jwt_service)
        }
    };

    let app = routes::create_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Phono API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
