//! Server binary: logging, bind address from the environment, run.

use omok_arena::ServerBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info")
                }),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);
    let addr = format!("0.0.0.0:{port}");

    let server = ServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "omok-arena listening");
    server.run().await?;
    Ok(())
}
