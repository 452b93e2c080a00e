//! Entry point: load config, wire dependencies, and run the server.

use accounts::auth::TokenService;
use accounts::config::{Config, StoreKind};
use accounts::db::{self, MemoryUserStore, PgUserStore, UserStore};
use accounts::email::{BrevoMailer, LogMailer, Mailer};
use accounts::{create_app, with_request_timeout, AccountService, AccountSettings, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn UserStore> = match config.store {
        StoreKind::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::migrate(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory user store; accounts are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.brevo_api_key {
        Some(key) => Arc::new(BrevoMailer::new(
            key.clone(),
            config.email_sender.clone(),
            config.email_timeout,
        )?),
        None => {
            tracing::warn!("BREVO_API_KEY not set; reset emails are logged, not sent");
            Arc::new(LogMailer)
        }
    };

    let settings = AccountSettings {
        access_token_ttl: config.access_token_ttl,
        reset_token_ttl: config.reset_token_ttl,
        reset_url_base: config.reset_url_base.clone(),
    };
    let accounts = AccountService::new(
        store,
        TokenService::new(&config.jwt_secret),
        mailer,
        settings,
    );

    let app = with_request_timeout(create_app(AppState::new(accounts)), config.request_timeout);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
