mod handlers;
mod metrics;
mod routes;

use axum::Router;
use judgekit_core::config::{JudgeConfig, LanguageConfigManager};
use judgekit_core::error::ConfigError;
use judgekit_core::judge0::{ExecutionService, Judge0Client};
use judgekit_core::tester::AutomatedTester;
use judgekit_core::TemplateRegistry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct AppState {
    pub tester: AutomatedTester<Box<dyn ExecutionService>>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // LOG_FORMAT=json for log shippers
    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_line_number(true)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    metrics::init();

    info!("judgekit API booting...");

    let config = JudgeConfig::from_env();

    let languages = match LanguageConfigManager::load(&config.languages_path) {
        Ok(manager) => {
            info!(
                path = %config.languages_path.display(),
                languages = manager.list_languages().len(),
                "Loaded language config"
            );
            manager
        }
        Err(ConfigError::NotFound(path)) => {
            warn!(path = %path, "Language config not found, using built-in languages");
            LanguageConfigManager::default()
        }
        Err(e) => panic!("Failed to load language config: {}", e),
    };

    let registry =
        TemplateRegistry::with_config(&languages).expect("Failed to build template registry");

    let service: Box<dyn ExecutionService> = Box::new(Judge0Client::from_config(&config));
    let tester = AutomatedTester::new(service, registry)
        .with_languages(languages)
        .with_limits(config.limits)
        .with_poll_policy(config.poll_policy());

    info!(judge0 = %config.api_url, "Execution service configured");

    let state = Arc::new(AppState { tester });

    // Build router
    let app = Router::new().merge(routes::routes()).with_state(state);

    let addr = std::env::var("JUDGEKIT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
