use blastkb_server::api::create_router;
use blastkb_server::api::handlers::AppState;
use blastkb_server::api::metrics;
use blastkb_server::cli::{self, Cli, Commands, ServeArgs};
use blastkb_core::Router;
use clap::Parser;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Logs go to stderr so `ask` and `chat` output stays clean on stdout.
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "blastkb_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "blastkb_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let router = match cli::build_router(&args) {
        Ok(router) => router,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Commands::Ask(ref ask) => {
            println!("{}", cli::answer(&router, &ask.text(), args.show_score));
        }
        Commands::Chat => {
            let stdin = std::io::stdin();
            cli::run_chat(&router, args.show_score, stdin.lock(), std::io::stdout())?;
        }
        Commands::Serve(ref serve) => serve_http(router, serve).await?,
    }
    Ok(())
}

async fn serve_http(router: Router, args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    metrics::update_corpus_metrics(router.ranker().map(Arc::as_ref));

    let documents = router.ranker().map_or(0, |r| r.corpus().len());
    let state = AppState {
        router: Arc::new(router),
        prometheus_handle,
        start_time: Instant::now(),
    };
    let app = create_router(state);
    let addr = format!("{}:{}", args.host, args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        documents,
        "blastkb ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let shutdown_timeout = Duration::from_secs(args.shutdown_timeout);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .into_future();

    // Draining is bounded; a stuck connection must not hold the process forever.
    tokio::select! {
        result = server => result?,
        _ = async {
            wait_for_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => tracing::warn!("Shutdown timeout elapsed, dropping open connections"),
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
