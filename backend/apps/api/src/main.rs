//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use guardian::{GuardianConfig, MailerConfig, SmtpMailer, guardian_router, store::GuardianStore};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,guardian=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: flip stale pending codes to expired
    // Errors here should not prevent server startup
    let store_for_cleanup = GuardianStore::new(pool.clone());
    match store_for_cleanup.expire_stale_codes().await {
        Ok(links) => {
            tracing::info!(links_expired = links, "Guardian link cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Guardian link cleanup failed, continuing anyway"
            );
        }
    }

    // Guardian configuration
    let guardian_config = if cfg!(debug_assertions) {
        GuardianConfig::with_random_secrets()
    } else {
        // In production, load secrets from environment
        GuardianConfig {
            code_secret: load_secret("GUARDIAN_CODE_SECRET")?,
            session_secret: load_secret("GUARDIAN_SESSION_SECRET")?,
            ..GuardianConfig::default()
        }
    };

    // SMTP relay configuration
    let mailer_config = MailerConfig {
        smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
        smtp_port: env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587),
        username: env::var("SMTP_USERNAME").unwrap_or_default(),
        password: env::var("SMTP_PASSWORD").unwrap_or_default(),
        from_address: env::var("SMTP_FROM")
            .unwrap_or_else(|_| "Vibe Check <no-reply@vibecheck.app>".to_string()),
    };
    let mailer = SmtpMailer::new(mailer_config)?;

    let store = GuardianStore::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:42210,http://127.0.0.1:42210".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", guardian_router(store, mailer, guardian_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31151));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Decode a base64 32-byte secret from the environment
fn load_secret(name: &str) -> anyhow::Result<[u8; 32]> {
    let value = env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set in production"))?;
    let bytes = general_purpose::STANDARD.decode(value.trim())?;
    let secret: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("{name} must decode to exactly 32 bytes"))?;
    Ok(secret)
}
