use anyhow::Result;

use crate::domain::{
    error::TaskError,
    store::{KeyValueStore, TASKS_KEY},
    task::{Task, TaskId},
};

/// The in-memory task collection and its bridge to the store. Storage order
/// is insertion order; display order comes from the query pipeline.
pub struct TaskRepository<S: KeyValueStore> {
    store: S,
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    pub async fn load(store: S) -> Result<Self> {
        let tasks: Vec<Task> = match store.get(TASKS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| TaskError::MalformedStore { key: TASKS_KEY, source })?,
            None => Vec::new(),
        };
        tracing::debug!(count = tasks.len(), "tasks loaded");
        Ok(Self { store, tasks })
    }

    pub async fn save(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.tasks)?;
        self.store.set(TASKS_KEY, &raw).await
    }

    /// Saves, or puts `previous` back in memory if the write fails so the
    /// collection never diverges from what the store holds.
    pub async fn save_or_restore(&mut self, previous: Vec<Task>) -> Result<()> {
        if let Err(e) = self.save().await {
            tracing::warn!(error = %e, "save failed, in-memory change reverted");
            self.tasks = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] { &self.tasks }

    pub fn add(&mut self, task: Task) { self.tasks.push(task); }

    pub fn find_by_id(&self, id: &TaskId) -> Option<&Task> { self.tasks.iter().find(|t| &t.id == id) }

    pub fn update_in_place(&mut self, id: &TaskId, apply: impl FnOnce(&mut Task)) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|t| &t.id == id)?;
        apply(task);
        Some(task)
    }

    pub fn remove_by_id(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        self.tasks.len() != before
    }

    pub fn clear(&mut self) { self.tasks.clear(); }
}
