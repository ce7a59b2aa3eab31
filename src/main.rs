use dotenvy::dotenv;
use log::info;
use std::sync::Arc;

use bureauserver::api_router::build_router;
use bureauserver::deals::outbox;
use bureauserver::shared::config::AppConfig;
use bureauserver::shared::state::AppState;
use bureauserver::shared::utils::create_conn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_conn(&config.database)?;

    let state = Arc::new(AppState {
        conn: pool,
        config: config.clone(),
    });

    outbox::spawn_sweeper(state.clone());

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
