//! Control panel example
//!
//! Runs hellahella against a hellanzb daemon on the local machine.
//!
//! After starting, you can:
//! - Log in via POST http://localhost:8750/login/login
//! - View the dashboard at GET http://localhost:8750/hellanzb/index
//! - Poll live status via GET http://localhost:8750/live/status
//! - Browse the Swagger UI at http://localhost:8750/swagger-ui

use hellahella::config::{Config, DaemonConfig};
use hellahella::{XmlRpcClient, run_with_shutdown};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Point at the daemon's XML-RPC endpoint
    let mut config = Config {
        daemon: DaemonConfig {
            host: "localhost".to_string(),
            port: 8760,
            password: "changeme".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    config.server.swagger_ui = true;
    config.validate()?;

    let rpc = Arc::new(XmlRpcClient::new(&config.daemon)?);
    let config = Arc::new(config);

    println!("Starting hellahella control panel");
    println!("Dashboard:  http://localhost:8750/hellanzb/index");
    println!("Swagger UI: http://localhost:8750/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  # Log in (keep the session cookie)");
    println!("  curl -c cookies.txt -X POST http://localhost:8750/login/login \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"name\": \"joe\", \"password\": \"honker\"}}'");
    println!();
    println!("  # Live status");
    println!("  curl -b cookies.txt http://localhost:8750/live/status");
    println!();
    println!("  # Pause or resume downloading");
    println!("  curl -b cookies.txt -X POST http://localhost:8750/live/toggle_download");

    // Serve until SIGINT/SIGTERM
    run_with_shutdown(rpc, config).await?;

    Ok(())
}
