use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jetquote::{
    app,
    config::{Config, LogFormat},
    csrf::CsrfGuard,
    database::Database,
    repository::PgBookingStore,
    services::mailer::HttpMailer,
    views::HtmlRenderer,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting private jet quote site");

    // Connect to the database
    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    let mailer = HttpMailer::from_config(&config.mail).context("Failed to build mail client")?;
    info!("Mail relay at {}", config.mail.base_url());

    let csrf = CsrfGuard::new(&config.security.secret_key).context("Failed to build CSRF guard")?;

    let app_state = AppState::new(
        Arc::new(PgBookingStore::new(db.pool.clone())),
        Arc::new(mailer),
        Arc::new(HtmlRenderer::new()),
        csrf,
        config.mail.admin_email.clone(),
    );

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state).into_make_service()).await?;

    Ok(())
}
