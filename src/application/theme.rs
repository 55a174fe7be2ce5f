use anyhow::Result;

use crate::domain::{store::{KeyValueStore, THEME_KEY}, task::Theme};

pub struct ThemePreference<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ThemePreference<S> {
    pub fn new(store: S) -> Self { Self { store } }

    /// Anything other than a stored `"light"` reads as dark.
    pub async fn load(&self) -> Result<Theme> {
        let theme = match self.store.get(THEME_KEY).await?.as_deref() {
            Some("light") => Theme::Light,
            Some("dark") | None => Theme::Dark,
            Some(other) => {
                tracing::warn!(value = other, "unrecognized stored theme, using dark");
                Theme::Dark
            }
        };
        Ok(theme)
    }

    pub async fn toggle(&self) -> Result<Theme> {
        let next = self.load().await?.toggled();
        self.store.set(THEME_KEY, next.as_str()).await?;
        tracing::info!(theme = next.as_str(), "theme toggled");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::InMemoryStore;

    #[tokio::test]
    async fn defaults_to_dark_and_toggles() {
        let store = InMemoryStore::default();
        let theme = ThemePreference::new(store.clone());
        assert_eq!(theme.load().await.unwrap(), Theme::Dark);
        assert_eq!(theme.toggle().await.unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));
        assert_eq!(theme.toggle().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn garbage_value_reads_as_dark() {
        let store = InMemoryStore::default();
        store.set(THEME_KEY, "purple").await.unwrap();
        assert_eq!(ThemePreference::new(store).load().await.unwrap(), Theme::Dark);
    }
}
