//! FinReport MCP Server - financial analysis and reporting via Model Context Protocol
//!
//! # Usage
//!
//! ## stdio transport (desktop clients, local use)
//! ```bash
//! finreport-mcp-server --config finreport.toml
//! ```
//!
//! ## HTTP transport (for remote hosting)
//! ```bash
//! finreport-mcp-server --http --port 8080
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finreport_mcp::config::ServerConfig;
use finreport_mcp::server::FinReportServer;

/// FinReport MCP Server - financial analysis and reporting
#[derive(Parser, Debug)]
#[command(name = "finreport-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (defaults are used if it does not exist)
    #[arg(short, long, env = "FINREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Use HTTP transport instead of stdio (for remote hosting)
    #[arg(long)]
    http: bool,

    /// HTTP port (overrides config, only used with --http)
    #[arg(short, long, env = "FINREPORT_PORT")]
    port: Option<u16>,

    /// HTTP host to bind to (overrides config, only used with --http)
    #[arg(long, env = "FINREPORT_HOST")]
    host: Option<String>,

    /// Directory generated reports are written to (overrides config)
    #[arg(short, long, env = "FINREPORT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("finreport_mcp=debug,finreport_ext_http=debug,rmcp=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("finreport_mcp=info,rmcp=warn"))
    };

    // Only log to stderr for stdio transport to avoid corrupting the protocol
    if args.http {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        config.reports.output_dir = dir;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Starting FinReport MCP Server");
    let server = FinReportServer::from_config(&config)?;

    if args.http {
        run_http_server(server, &config.server.host, config.server.port).await
    } else {
        run_stdio_server(server).await
    }
}

/// Run the server with stdio transport
async fn run_stdio_server(server: FinReportServer) -> anyhow::Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    tracing::info!("Using stdio transport");

    let tools = server.tool_names();
    let service = server.serve(stdio()).await?;

    tracing::info!(tools = %tools.join(", "), "FinReport MCP Server ready");

    service.waiting().await?;

    Ok(())
}

/// Run the server with HTTP transport (for remote hosting)
#[cfg(feature = "http")]
async fn run_http_server(server: FinReportServer, host: &str, port: u16) -> anyhow::Result<()> {
    use axum::Router;
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    };
    use tower_http::cors::{Any, CorsLayer};

    tracing::info!("Using HTTP transport on {}:{}", host, port);

    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    // Configure CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .nest_service("/mcp", mcp_service)
        .route("/health", axum::routing::get(health_check))
        .layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("FinReport MCP Server listening on http://{}/mcp", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

/// Health check endpoint for HTTP transport
#[cfg(feature = "http")]
async fn health_check() -> &'static str {
    "OK"
}

/// Fallback when HTTP feature is not enabled
#[cfg(not(feature = "http"))]
async fn run_http_server(_server: FinReportServer, _host: &str, _port: u16) -> anyhow::Result<()> {
    anyhow::bail!("HTTP transport not available. Rebuild with: cargo build --features http")
}
