use mock_server::{ConnectLog, Sink};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let socks_port = std::env::var("SOCKS_PORT").unwrap_or_else(|_| "9050".to_string());

    let upload_addr = format!("127.0.0.1:{port}");
    let socks_addr = format!("127.0.0.1:{socks_port}");
    let uploads = TcpListener::bind(&upload_addr).await?;
    let socks = TcpListener::bind(&socks_addr).await?;
    tracing::info!(upload = %upload_addr, socks = %socks_addr, "listening");

    tokio::try_join!(
        mock_server::run(uploads, Sink::default()),
        mock_server::run_socks5(socks, ConnectLog::default()),
    )?;
    Ok(())
}
