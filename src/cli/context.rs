//! Shared setup for commands that route or run workers

use crate::cli::CommonArgs;
use crate::config::DispatcherConfig;
use crate::logging::init_tracing;
use crate::routing::{CostCalculator, DecisionEngine, RouteTarget};
use crate::tracker::create_tracker;
use crate::worker::{create_mock_worker, create_worker, WorkerId, WorkerRegistry, WorkerSettings};
use std::sync::Arc;
use std::time::Duration;

/// Request timeout for HTTP capacity trackers.
const TRACKER_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load configuration with environment and CLI overrides, then validate it.
pub fn load_config(args: &CommonArgs) -> Result<DispatcherConfig, Box<dyn std::error::Error>> {
    let mut config = DispatcherConfig::load(args.config.as_deref())?.with_env_overrides();

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration and start logging. Logging failures are not fatal.
pub fn init(args: &CommonArgs) -> Result<DispatcherConfig, Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
    Ok(config)
}

/// Build the routing engine with one tracker per configured worker.
///
/// Names and pricing come from the registered workers, so routing prices
/// a task exactly as the worker that would run it.
pub fn build_engine(
    config: &DispatcherConfig,
    registry: &WorkerRegistry,
) -> Result<DecisionEngine, Box<dyn std::error::Error>> {
    let client = Arc::new(
        reqwest::Client::builder()
            .timeout(TRACKER_HTTP_TIMEOUT)
            .build()?,
    );

    let mut targets = Vec::with_capacity(config.workers.len());
    for worker in &config.workers {
        let id = WorkerId::new(&worker.id);
        let registered = registry
            .get(&id)
            .ok_or_else(|| format!("worker '{}' is configured but not registered", id))?;
        let tracker = create_tracker(&id, &worker.tracker, client.clone())?;
        targets.push(
            RouteTarget::new(id, registered.name(), registered.pricing(), tracker)
                .with_aliases(worker.aliases.clone()),
        );
    }

    tracing::debug!(workers = targets.len(), "Built routing engine");
    Ok(DecisionEngine::new(CostCalculator::new(targets)))
}

/// Build the worker registry. With `mock`, every worker is a scripted stand-in.
pub fn build_registry(
    config: &DispatcherConfig,
    settings: &WorkerSettings,
    mock: bool,
) -> WorkerRegistry {
    let mut registry = WorkerRegistry::new();
    for worker in &config.workers {
        let built = if mock {
            create_mock_worker(worker, settings)
        } else {
            create_worker(worker, settings)
        };
        registry.register(built, &worker.aliases);
    }
    registry
}
