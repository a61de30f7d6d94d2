use hangout_planner::{app, auth::services::seed_admin, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "hangout_planner=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let (host, port) = (config.host.clone(), config.port);
    let admin_seed = config.admin_seed.clone();

    let state = AppState::init(config).await?;

    match admin_seed {
        Some(seed) => seed_admin(state.users.as_ref(), state.hasher.as_ref(), &seed).await?,
        None => tracing::info!("ADMIN_* not set; skipping admin seed"),
    }

    app::serve(app::build_app(state), &host, port).await
}
