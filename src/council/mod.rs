//! Council mode: several workers discuss one task.
//!
//! The [`Orchestrator`] keeps the conversation [`Session`], fans each user
//! message out to every available worker at once, and can ask one worker for a
//! structured [`Plan`] or hand it the task for execution.
//!
//! # Example
//!
//! ```
//! use dispatcher::config::CouncilConfig;
//! use dispatcher::council::Orchestrator;
//! use dispatcher::worker::{ScriptedWorker, WorkerRegistry};
//! use std::sync::Arc;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let mut registry = WorkerRegistry::new();
//!     registry.register(Arc::new(ScriptedWorker::fixed("codex", "Codex", "Use JWT.")), &[]);
//!
//!     let mut council = Orchestrator::new(registry, CouncilConfig::default());
//!     let mut responses = council.broadcast("How should we add auth?");
//!     while let Some(response) = responses.recv().await {
//!         assert_eq!(response.content, "Use JWT.");
//!         council.record(&response);
//!     }
//!     assert_eq!(council.session().len(), 2);
//! });
//! ```

pub mod detect;
pub mod error;
pub mod plan;
pub mod prompt;
pub mod session;

pub use detect::{detect_file, detect_files, MentionDetector};
pub use error::CouncilError;
pub use plan::{
    extract_json_object, json_objects, parse_plan_response, FileAction, FileChange, Plan,
};
pub use prompt::PLAN_INSTRUCTIONS;
pub use session::{Message, Session, USER};

use crate::config::CouncilConfig;
use crate::delegate::DelegationResult;
use crate::logging::preview;
use crate::worker::{Worker, WorkerId, WorkerRegistry};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One worker's answer in council mode.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub worker: WorkerId,
    pub worker_name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Response {
    fn answered(worker: &dyn Worker, content: String, elapsed: Duration) -> Self {
        Self {
            worker: worker.id().clone(),
            worker_name: worker.name().to_string(),
            content,
            error: None,
            elapsed,
        }
    }

    fn failed(worker: &dyn Worker, error: String, elapsed: Duration) -> Self {
        Self {
            worker: worker.id().clone(),
            worker_name: worker.name().to_string(),
            content: String::new(),
            error: Some(error),
            elapsed,
        }
    }

    fn rejected(worker: WorkerId, worker_name: String, error: String) -> Self {
        Self {
            worker,
            worker_name,
            content: String::new(),
            error: Some(error),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Drives one interactive council run.
pub struct Orchestrator {
    registry: WorkerRegistry,
    detector: MentionDetector,
    session: Session,
    available: HashSet<WorkerId>,
    bypass_availability: bool,
    timeout: Duration,
    config: CouncilConfig,
}

impl Orchestrator {
    /// Every registered worker starts out available.
    pub fn new(registry: WorkerRegistry, config: CouncilConfig) -> Self {
        Self {
            detector: MentionDetector::new(&registry),
            available: registry.ids().into_iter().collect(),
            registry,
            session: Session::new(),
            bypass_availability: false,
            timeout: config.timeout(),
            config,
        }
    }

    /// Ignore availability entirely. Used by mock mode.
    pub fn with_bypass_availability(mut self, bypass: bool) -> Self {
        self.bypass_availability = bypass;
        self
    }

    /// Override the shared deadline from the configuration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the set of workers that may take part.
    pub fn set_available(&mut self, workers: impl IntoIterator<Item = WorkerId>) {
        self.available = workers.into_iter().collect();
    }

    pub fn is_available(&self, worker: &WorkerId) -> bool {
        self.bypass_availability || self.available.contains(worker)
    }

    /// Available workers in registration order.
    pub fn available_workers(&self) -> Vec<Arc<dyn Worker>> {
        self.registry
            .workers()
            .iter()
            .filter(|w| self.is_available(w.id()))
            .cloned()
            .collect()
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Worker addressed by name in `text`, if any.
    pub fn detect_worker(&self, text: &str) -> Option<WorkerId> {
        self.detector.detect(text)
    }

    /// Send `message` to every available worker concurrently.
    ///
    /// Responses arrive on the returned channel as each worker finishes, in no
    /// particular order. All queries share one deadline; a worker that misses
    /// it yields an error response. The channel closes once every launched
    /// query has reported, or immediately when no worker is available.
    /// Dropping the receiver cancels the queries still running.
    ///
    /// Answers are not added to the session; pass them to [`record`](Self::record).
    pub fn broadcast(&mut self, message: &str) -> mpsc::Receiver<Response> {
        self.session.add_message(USER, message);

        let targets = self.available_workers();
        let (tx, rx) = mpsc::channel(targets.len().max(1));
        if targets.is_empty() {
            debug!("No workers available for broadcast");
            return rx;
        }

        let members: Vec<String> = targets.iter().map(|w| w.name().to_string()).collect();
        let prompt: Arc<str> = prompt::discussion_prompt(
            &self.session,
            message,
            &members,
            self.config.history_messages,
            self.config.history_chars,
        )
        .into();

        info!(
            workers = targets.len(),
            message = %preview(message),
            "Broadcasting to council"
        );

        let timeout = self.timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        let token = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for worker in targets {
            let tx = tx.clone();
            let prompt = prompt.clone();
            let token = token.clone();
            tasks.spawn(async move {
                let started = std::time::Instant::now();
                let outcome = tokio::select! {
                    _ = token.cancelled() => return,
                    outcome = tokio::time::timeout_at(deadline, worker.query(&prompt)) => outcome,
                };
                let response = match outcome {
                    Ok(Ok(content)) => Response::answered(worker.as_ref(), content, started.elapsed()),
                    Ok(Err(e)) => {
                        debug!(worker = %worker.id(), error = %e, "Council query failed");
                        Response::failed(worker.as_ref(), e.to_string(), started.elapsed())
                    }
                    Err(_) => {
                        debug!(worker = %worker.id(), "Council query hit the deadline");
                        Response::failed(
                            worker.as_ref(),
                            format!("no response within {:?}", timeout),
                            started.elapsed(),
                        )
                    }
                };
                let _ = tx.send(response).await;
            });
        }

        // Supervisor: owns the last sender, so the channel closes when it returns.
        tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Broadcast receiver dropped, cancelling queries");
                    token.cancel();
                }
                _ = async {
                    while let Some(joined) = tasks.join_next().await {
                        if let Err(e) = joined {
                            warn!(error = %e, "Council query task failed");
                        }
                    }
                } => {}
            }
        });

        rx
    }

    /// Add a successful response to the session history.
    pub fn record(&mut self, response: &Response) {
        if !response.is_error() && !response.content.trim().is_empty() {
            self.session
                .add_message(response.worker.as_str(), response.content.clone());
        }
    }

    /// Ask a single worker. Errors are carried in the response.
    pub async fn query(&mut self, worker: &str, message: &str) -> Response {
        self.session.add_message(USER, message);

        let target = match self.resolve(Some(worker)) {
            Ok(target) => target,
            Err(e) => {
                return Response::rejected(WorkerId::new(worker), worker.to_string(), e.to_string())
            }
        };

        let members: Vec<String> = self
            .available_workers()
            .iter()
            .map(|w| w.name().to_string())
            .collect();
        let prompt = prompt::discussion_prompt(
            &self.session,
            message,
            &members,
            self.config.history_messages,
            self.config.history_chars,
        );

        let started = std::time::Instant::now();
        let response = match tokio::time::timeout(self.timeout, target.query(&prompt)).await {
            Ok(Ok(content)) => Response::answered(target.as_ref(), content, started.elapsed()),
            Ok(Err(e)) => Response::failed(target.as_ref(), e.to_string(), started.elapsed()),
            Err(_) => Response::failed(
                target.as_ref(),
                format!("no response within {:?}", self.timeout),
                started.elapsed(),
            ),
        };
        self.record(&response);
        response
    }

    /// Ask one worker for a structured plan of the latest task.
    ///
    /// A reply without a decodable plan still succeeds, as a degraded plan
    /// whose summary is the raw reply.
    pub async fn plan(&mut self, worker: Option<&str>) -> Result<Plan, CouncilError> {
        let target = self.resolve(worker)?;
        let task = self
            .session
            .last_user_message()
            .ok_or(CouncilError::NoTask)?
            .to_string();

        let prompt = prompt::plan_prompt(
            &self.session,
            &task,
            self.config.plan_history_messages,
            self.config.plan_history_chars,
        );

        info!(worker = %target.id(), task = %preview(&task), "Requesting plan");
        let reply = tokio::time::timeout(self.timeout, target.query(&prompt))
            .await
            .map_err(|_| CouncilError::Timeout {
                worker: target.name().to_string(),
                after: self.timeout,
            })??;

        Ok(parse_plan_response(target.id().clone(), &task, &reply))
    }

    /// Execute the latest task with one worker, streaming its output.
    pub async fn execute(&mut self, worker: Option<&str>) -> Result<DelegationResult, CouncilError> {
        let target = self.resolve(worker)?;
        let task = self
            .session
            .last_user_message()
            .ok_or(CouncilError::NoTask)?
            .to_string();

        info!(worker = %target.id(), task = %preview(&task), "Executing council task");
        Ok(target.execute(&task).await?)
    }

    /// Pick the target worker and remember it as the last one addressed.
    ///
    /// Without an explicit name the last addressed worker is used, then the
    /// first available worker in registration order.
    fn resolve(&mut self, worker: Option<&str>) -> Result<Arc<dyn Worker>, CouncilError> {
        let target = match worker {
            Some(name) => self.registry.lookup(name).ok_or_else(|| CouncilError::UnknownWorker {
                name: name.to_string(),
                known: self.registry.ids().iter().map(|id| id.to_string()).collect(),
            })?,
            None => match self.session.last_worker().and_then(|id| self.registry.get(id)) {
                Some(last) => last,
                None => self
                    .available_workers()
                    .into_iter()
                    .next()
                    .ok_or(CouncilError::NoWorkerSelected)?,
            },
        };

        self.session.set_last_worker(target.id().clone());

        if !self.is_available(target.id()) {
            return Err(CouncilError::Unavailable {
                worker: target.name().to_string(),
            });
        }
        Ok(target)
    }
}
