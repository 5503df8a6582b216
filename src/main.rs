use accountd::{app, initialize_state};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(
            |_| "accountd=debug,tower_http=debug".into(),
        ))
        .init();

    let state = initialize_state().await?;
    let address = state.config.listen_address();

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "server started");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
