use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use manobal::api::{self, AppState};
use manobal::booking::BookingService;
use manobal::catalog::Catalog;
use manobal::config::AppConfig;
use manobal::conversation::{Dispatcher, ModelFallback, SessionStore, spawn_prune_task};
use manobal::llm::create_provider;
use manobal::mail::{Mailer, SmtpMailer};
use manobal::safety::SafetyLayer;
use manobal::scrape::MetadataFetcher;
use manobal::store::{DocumentStore, FirestoreStore, MemoryStore};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing; the guard flushes the file writer on exit
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "manobal.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    eprintln!("💙 Manobal v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Listening: http://{}", config.server.bind);

    // ── Catalog ─────────────────────────────────────────────────────────
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };
    let catalog = Arc::new(catalog);
    eprintln!(
        "   Catalog: {} colleges, {} doctors",
        catalog.colleges().len(),
        catalog.doctors().len()
    );

    // ── Conversation ────────────────────────────────────────────────────
    let llm = create_provider(&config.llm)?;
    let safety = Arc::new(SafetyLayer::new());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&safety),
        Arc::clone(&catalog),
        ModelFallback::new(llm),
    ));
    let sessions = SessionStore::new(config.server.session_idle_timeout);
    let _prune_handle = spawn_prune_task(Arc::clone(&sessions), PRUNE_INTERVAL);

    // ── Store ───────────────────────────────────────────────────────────
    let store: Arc<dyn DocumentStore> = match &config.firestore {
        Some(firestore) => {
            eprintln!("   Store: Firestore (project {})", firestore.project_id);
            Arc::new(FirestoreStore::new(firestore))
        }
        None => {
            tracing::warn!("FIRESTORE_PROJECT_ID not set, bookings and comments are kept in memory");
            eprintln!("   Store: in-memory");
            Arc::new(MemoryStore::new())
        }
    };

    // ── Mail ────────────────────────────────────────────────────────────
    let mailer: Option<Arc<dyn Mailer>> = match config.mail.clone() {
        Some(mail) => {
            eprintln!("   Email: enabled (SMTP: {}:{})", mail.smtp_host, mail.smtp_port);
            Some(Arc::new(SmtpMailer::new(mail)) as Arc<dyn Mailer>)
        }
        None => {
            tracing::warn!("Email credentials are not configured, confirmations will fail");
            eprintln!("   Email: disabled (set EMAIL_USER and EMAIL_PASS)");
            None
        }
    };
    let bookings = Arc::new(BookingService::new(mailer, Arc::clone(&store)));

    let metadata = Arc::new(MetadataFetcher::new(
        config.server.article_timeout,
        Arc::clone(&safety),
    ));

    let app = api::router(AppState {
        dispatcher,
        sessions,
        safety,
        catalog,
        bookings,
        store,
        metadata,
    });

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %config.server.bind, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
