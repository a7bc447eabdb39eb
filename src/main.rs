//! Portfolio Server - Entry Point

use portfolio_server::{Config, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Portfolio Server v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: portfolio-server [--help]");
        println!();
        println!("Environment variables:");
        println!("  HOST / PORT            Bind address (default: 127.0.0.1:4000)");
        println!("  CONTENT_PATH           Content root (default: ../content)");
        println!("  FRONTEND_PATH          Static frontend directory");
        println!("  ADMIN_USERNAME         Admin account (default: admin)");
        println!("  ADMIN_PASSWORD         Admin password (default: admin)");
        println!("  ADMIN_PASSWORD_HASH    Argon2 PHC hash, overrides ADMIN_PASSWORD");
        println!("  JWT_SECRET             Token signing secret");
        println!("  TOKEN_TTL_HOURS        Token lifetime (default: 24)");
        println!("  GITHUB_TOKEN           GitHub API token");
        println!("  CORS_ORIGINS           Comma separated allowed origins");
        println!("  RUST_LOG               Log filter (default: info)");
        println!("  LOG_FORMAT             'json' for JSON logs");
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Portfolio Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
