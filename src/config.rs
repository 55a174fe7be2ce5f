use std::{fs::{self, OpenOptions}, net::SocketAddr, path::Path};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Reads `.env` (if any) and then `DATABASE_URL` / `BIND_ADDR`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tasks.db".to_string());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        Self { database_url, bind_addr }
    }

    /// Only the server binds, so `BIND_ADDR` is validated here rather than on load.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().with_context(|| format!("BIND_ADDR must be host:port, got {:?}", self.bind_addr))
    }

    /// Creates the SQLite file and its directory so the pool can open it.
    pub fn prepare_sqlite_file(&self) -> Result<()> {
        let url = self.database_url.as_str();
        if url.starts_with("sqlite::memory:") { return Ok(()); }
        let Some(path) = url.strip_prefix("sqlite://") else { return Ok(()) };
        // On Windows, absolute paths may look like /C:/path
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        let path = path.split('?').next().unwrap_or(path);
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; }
        }
        if !p.exists() {
            OpenOptions::new().create(true).append(true).open(p)
                .with_context(|| format!("cannot create database file {}", p.display()))?;
        }
        Ok(())
    }
}
