pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;

use anyhow::Result;

use application::{task_service::TaskServiceImpl, theme::ThemePreference};
use config::AppConfig;
use domain::store::KeyValueStore;
use infrastructure::sqlite_store::SqliteStore;

/// Opens the configured store and loads tasks and theme from it.
pub async fn bootstrap(config: &AppConfig) -> Result<(TaskServiceImpl<SqliteStore>, ThemePreference<SqliteStore>)> {
    config.prepare_sqlite_file()?;
    let store = SqliteStore::connect(&config.database_url).await?;
    store.init().await?;
    let service = TaskServiceImpl::load(store.clone()).await?;
    Ok((service, ThemePreference::new(store)))
}
