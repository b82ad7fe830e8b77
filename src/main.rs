use axum::extract::DefaultBodyLimit;
use rms_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::cors::permissive_cors,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    match &config.seed_admin_password {
        Some(password) => {
            if let Some(admin) = app_state
                .user_service
                .ensure_seed_admin(&config.seed_admin_username, password)
                .await?
            {
                info!(username = %admin.username, "seed admin created");
            }
        }
        None => tracing::warn!("SEED_ADMIN_PASSWORD not set; skipping first-run admin bootstrap"),
    }

    let app = routes::router(app_state, config.api_rps, config.public_rps)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
