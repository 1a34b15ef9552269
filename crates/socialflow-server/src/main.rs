use std::sync::Arc;

use chrono::Utc;
use socialflow_auth::{JwtConfig, JwtService};
use socialflow_connectors::{
    ConnectorRegistry, ContentGenerator, HttpContentGenerator, MetaConnector, MockConnector,
    StaticGenerator,
};
use socialflow_core::{MemoryStore, SocialFlow};
use socialflow_events::{EventBus, LoggingHandler, MemoryEventBus};
use socialflow_server::config::ServerConfig;
use socialflow_server::{router, AppStateInner};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialflow=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.is_dev_secret() {
        warn!("SOCIALFLOW_JWT_SECRET not set, using the development secret");
    }

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt_secret.clone(),
        access_token_duration: chrono::Duration::hours(config.token_ttl_hours),
        ..Default::default()
    })?;

    let events = Arc::new(MemoryEventBus::new());
    events.register_handler(Arc::new(LoggingHandler::all())).await?;

    let connectors = ConnectorRegistry::new(MockConnector::random())
        .register(Arc::new(MetaConnector::from_config(&config.connectors)?));

    let generator: Arc<dyn ContentGenerator> = if config.connectors.ai_api_key.is_some() {
        Arc::new(HttpContentGenerator::from_config(&config.connectors)?)
    } else {
        warn!("AI_API_KEY not set, AI generation returns canned content");
        Arc::new(StaticGenerator)
    };

    let app = SocialFlow::new(
        Arc::new(MemoryStore::new()),
        events,
        connectors,
        generator,
        Arc::new(jwt),
    );

    if let Some(interval) = config.scheduler_interval {
        let scheduler = app.scheduler.clone();
        info!(interval_secs = interval.as_secs(), "Background scheduler enabled");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = scheduler.process(Utc::now(), None).await {
                    warn!(error = %e, "Scheduler sweep failed");
                }
            }
        });
    }

    let app = router(AppStateInner::new(app));

    let addr = config.bind_addr();
    info!("SocialFlow server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
