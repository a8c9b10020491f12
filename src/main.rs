//! Octotree - repository tree sidebar companion for code-hosting pages
//!
//! # Usage
//! ```bash
//! octotree                                            # Start the companion server
//! octotree --port 4000 --token <TOKEN>                # Custom port, authenticated API
//! octotree resolve https://github.com/ovity/octotree  # Print a repository tree
//! octotree token-url --open                           # Create an access token
//! ```

mod adapter;
mod config;
mod error;
mod github;
mod models;
mod routes;
mod state;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use clap::{Parser, Subcommand};
use rust_embed::Embed;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapter::HostAdapter;
use config::Config;
use github::{BranchCache, GitHub, HttpTransport};
use models::{BranchSignals, PageLocation, PageSnapshot};
use state::AppState;

/// Embedded sidebar template
#[derive(Embed)]
#[folder = "assets"]
struct Assets;

/// Octotree - repository tree sidebar companion
#[derive(Parser)]
#[command(name = "octotree")]
#[command(about = "Repository tree companion for code-hosting pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Config file (default: ~/.config/octotree/config.toml)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Access token for the host API
    #[arg(long, env = "OCTOTREE_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a page URL and print the repository tree as JSON
    Resolve {
        /// Page URL, e.g. https://github.com/ovity/octotree/tree/main
        url: String,

        /// Branch shown on the page, skips the default branch lookup
        #[arg(short, long)]
        branch: Option<String>,

        /// Also resolve non-code pages (issues, pulls, ...)
        #[arg(long)]
        non_code: bool,

        /// Print nested items instead of the flat listing
        #[arg(long)]
        nested: bool,
    },
    /// Print the page where an access token can be created
    TokenUrl {
        /// Any page URL on the host
        #[arg(default_value = "https://github.com")]
        url: String,

        /// Open the page in the browser
        #[arg(short, long)]
        open: bool,
    },
}

/// Serve embedded static files
async fn serve_static(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');
    let path = if path.is_empty() { "sidebar.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn print_error(adapter: &dyn HostAdapter, url: &str, e: &error::AppError) {
    let view = e.view();
    eprintln!("✗ {}: {}", view.title, view.message);
    if view.needs_token {
        if let Ok(location) = PageLocation::parse(url) {
            eprintln!("  Create a token at {}", adapter.create_token_url(&location));
            eprintln!("  and pass it with --token or OCTOTREE_TOKEN.");
        }
    }
}

async fn handle_resolve(
    adapter: Arc<dyn HostAdapter>,
    config: &Config,
    url: &str,
    branch: Option<String>,
    non_code: bool,
    nested: bool,
) -> anyhow::Result<()> {
    let page = PageSnapshot {
        branch: BranchSignals {
            selector_title: branch,
            ..Default::default()
        },
        ..PageSnapshot::new(url)
    };
    let location = page.location()?;
    let token = config.token.as_deref();

    let repo = match adapter
        .resolve_repo(&page, non_code || config.show_in_non_code_page, None, token)
        .await
    {
        Ok(Some(repo)) => repo,
        Ok(None) => {
            eprintln!("✗ Not a repository page: {}", url);
            std::process::exit(1);
        }
        Err(e) => {
            print_error(adapter.as_ref(), url, &e);
            std::process::exit(1);
        }
    };

    let tree = match adapter.load_code_tree(&location, &repo, None, token).await {
        Ok(tree) => tree,
        Err(e) => {
            print_error(adapter.as_ref(), url, &e);
            std::process::exit(1);
        }
    };

    let output = if nested {
        let items = github::tree::nest_tree(&tree.tree, "", true, tree.submodules.as_ref());
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string_pretty(&tree)?
    };
    println!("{}", output);

    if tree.truncated {
        eprintln!("  Warning: the listing was truncated by the API");
    }
    Ok(())
}

fn handle_token_url(adapter: &dyn HostAdapter, url: &str, open: bool) -> anyhow::Result<()> {
    let location = PageLocation::parse(url)?;
    let token_url = adapter.create_token_url(&location);
    println!("{}", token_url);

    if open {
        if let Err(e) = open::that(&token_url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }
    Ok(())
}

async fn serve(adapter: Arc<dyn HostAdapter>, config: Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(adapter, config));
    state.set_active(true).await;

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state.clone()))
        .fallback(get(serve_static))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let url = format!("http://127.0.0.1:{}", port);
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │                  Octotree                   │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  Server:   {}", url);
    println!("  Events:   ws://127.0.0.1:{}/api/v1/events", port);
    println!(
        "  Token:    {}",
        if state.config.token.is_some() { "configured" } else { "none (60 requests/hour)" }
    );
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    state.set_active(false).await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };
    if cli.token.is_some() {
        config.token = cli.token;
    }

    let adapter: Arc<dyn HostAdapter> = Arc::new(GitHub::new(
        Arc::new(HttpTransport::new()),
        Arc::new(BranchCache::new()),
        &config,
    ));

    match cli.command {
        Some(Commands::Resolve {
            url,
            branch,
            non_code,
            nested,
        }) => handle_resolve(adapter, &config, &url, branch, non_code, nested).await,
        Some(Commands::TokenUrl { url, open }) => handle_token_url(adapter.as_ref(), &url, open),
        None => serve(adapter, config, cli.port).await,
    }
}
