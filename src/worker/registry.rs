//! Registry of configured workers.

use super::{Worker, WorkerId};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered set of workers, addressable by id or alias.
///
/// Registration order is preserved; it names the default executor in council
/// mode and is the order in which status rows are printed.
#[derive(Default, Clone)]
pub struct WorkerRegistry {
    workers: Vec<Arc<dyn Worker>>,
    names: HashMap<String, WorkerId>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker under its id and the given aliases.
    ///
    /// A worker registered again under the same id replaces the earlier one in place.
    pub fn register(&mut self, worker: Arc<dyn Worker>, aliases: &[String]) {
        let id = worker.id().clone();
        self.names.insert(id.as_str().to_string(), id.clone());
        self.names
            .insert(worker.name().trim().to_lowercase(), id.clone());
        for alias in aliases {
            self.names.insert(alias.trim().to_lowercase(), id.clone());
        }

        match self.workers.iter().position(|w| w.id() == &id) {
            Some(idx) => self.workers[idx] = worker,
            None => self.workers.push(worker),
        }
    }

    /// Map a user-supplied name (id, alias or display name) to a worker id.
    pub fn resolve(&self, name: &str) -> Option<WorkerId> {
        self.names.get(&name.trim().to_lowercase()).cloned()
    }

    pub fn get(&self, id: &WorkerId) -> Option<Arc<dyn Worker>> {
        self.workers.iter().find(|w| w.id() == id).cloned()
    }

    /// Resolve a name and return the worker in one step.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Worker>> {
        self.resolve(name).and_then(|id| self.get(&id))
    }

    pub fn workers(&self) -> &[Arc<dyn Worker>] {
        &self.workers
    }

    pub fn ids(&self) -> Vec<WorkerId> {
        self.workers.iter().map(|w| w.id().clone()).collect()
    }

    /// Every name that resolves to `id`, the id itself included.
    pub fn names_for(&self, id: &WorkerId) -> Vec<String> {
        let mut names: Vec<String> = self
            .names
            .iter()
            .filter(|(_, target)| *target == id)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
