mod api;
mod config;
mod error;
mod guard;
mod routes;
mod services;
mod session;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let api = api::ApiClient::from_config(&config).expect("api client init failed");
    let port = config.port;
    tracing::info!(api_base_url = %config.api_base_url, secure_cookies = config.cookies.secure, "configuration loaded");

    let state = state::AppState::new(api, config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "reserve-portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
