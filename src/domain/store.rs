use async_trait::async_trait;

pub const TASKS_KEY: &str = "task_manager_tasks_v1";
pub const THEME_KEY: &str = "task_manager_theme";

/// Durable string key/value storage shared by the task list and the theme.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
