use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::task_repository::TaskRepository;
use crate::domain::{
    query::{self, Controls, PageContext, View},
    store::KeyValueStore,
    task::{Confirmation, CreateTask, EditTask, Priority, Task, TaskId},
};

/// User-facing task operations. Rejections (blank title, unknown id, declined
/// confirmation) never mutate anything and surface as `None` / `false`.
#[async_trait]
pub trait TaskService: Send + Sync + 'static {
    async fn add(&self, input: CreateTask) -> Result<Option<Task>>;
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;
    async fn list(&self) -> Result<Vec<Task>>;
    async fn edit(&self, id: TaskId, input: EditTask) -> Result<Option<Task>>;
    async fn toggle_complete(&self, id: TaskId) -> Result<Option<Task>>;
    async fn delete(&self, id: TaskId, confirm: Confirmation) -> Result<bool>;
    async fn clear_all(&self, confirm: Confirmation) -> Result<bool>;
    async fn view(&self, page: PageContext, controls: &Controls) -> Result<View>;
}

pub struct TaskServiceImpl<S: KeyValueStore> {
    repo: Arc<Mutex<TaskRepository<S>>>,
}

impl<S: KeyValueStore> Clone for TaskServiceImpl<S> {
    fn clone(&self) -> Self { Self { repo: Arc::clone(&self.repo) } }
}

impl<S: KeyValueStore> TaskServiceImpl<S> {
    pub fn new(repo: TaskRepository<S>) -> Self { Self { repo: Arc::new(Mutex::new(repo)) } }

    pub async fn load(store: S) -> Result<Self> { Ok(Self::new(TaskRepository::load(store).await?)) }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[async_trait]
impl<S: KeyValueStore> TaskService for TaskServiceImpl<S> {
    async fn add(&self, input: CreateTask) -> Result<Option<Task>> {
        let title = input.title.trim();
        if title.is_empty() {
            tracing::debug!("add rejected: blank title");
            return Ok(None);
        }
        let priority = input.priority.as_deref().and_then(Priority::parse).unwrap_or_default();
        let task = Task::new(
            title.to_string(),
            non_blank(input.description).unwrap_or_default(),
            non_blank(input.due_date),
            priority,
        );
        let mut repo = self.repo.lock().await;
        let previous = repo.tasks().to_vec();
        repo.add(task.clone());
        repo.save_or_restore(previous).await?;
        tracing::info!(id = %task.id, "task added");
        Ok(Some(task))
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> { Ok(self.repo.lock().await.find_by_id(&id).cloned()) }

    async fn list(&self) -> Result<Vec<Task>> { Ok(self.repo.lock().await.tasks().to_vec()) }

    async fn edit(&self, id: TaskId, input: EditTask) -> Result<Option<Task>> {
        let Some(title) = non_blank(input.title) else {
            tracing::debug!(%id, "edit aborted: no title");
            return Ok(None);
        };
        let mut repo = self.repo.lock().await;
        let previous = repo.tasks().to_vec();
        let updated = repo
            .update_in_place(&id, |task| {
                task.title = title;
                if let Some(d) = input.description { task.description = d.trim().to_string(); }
                if let Some(due) = input.due_date { task.due_date = non_blank(Some(due)); }
                if let Some(p) = input.priority.as_deref().and_then(Priority::parse) { task.priority = p; }
            })
            .cloned();
        let Some(task) = updated else {
            tracing::debug!(%id, "edit rejected: not found");
            return Ok(None);
        };
        repo.save_or_restore(previous).await?;
        tracing::info!(%id, "task edited");
        Ok(Some(task))
    }

    async fn toggle_complete(&self, id: TaskId) -> Result<Option<Task>> {
        let mut repo = self.repo.lock().await;
        let previous = repo.tasks().to_vec();
        let Some(task) = repo.update_in_place(&id, |t| t.completed = !t.completed).cloned() else {
            return Ok(None);
        };
        repo.save_or_restore(previous).await?;
        tracing::info!(%id, completed = task.completed, "task toggled");
        Ok(Some(task))
    }

    async fn delete(&self, id: TaskId, confirm: Confirmation) -> Result<bool> {
        if confirm == Confirmation::Declined { return Ok(false); }
        let mut repo = self.repo.lock().await;
        let previous = repo.tasks().to_vec();
        if !repo.remove_by_id(&id) { return Ok(false); }
        repo.save_or_restore(previous).await?;
        tracing::info!(%id, "task deleted");
        Ok(true)
    }

    async fn clear_all(&self, confirm: Confirmation) -> Result<bool> {
        if confirm == Confirmation::Declined { return Ok(false); }
        let mut repo = self.repo.lock().await;
        let previous = repo.tasks().to_vec();
        repo.clear();
        repo.save_or_restore(previous).await?;
        tracing::info!("all tasks cleared");
        Ok(true)
    }

    async fn view(&self, page: PageContext, controls: &Controls) -> Result<View> {
        let repo = self.repo.lock().await;
        Ok(query::compute(repo.tasks(), page, controls))
    }
}
