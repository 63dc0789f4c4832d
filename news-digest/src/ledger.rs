use crate::types::{DigestError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_LEDGER_FILE: &str = "sent_links.db";

/// Durable set of links that have already been delivered.
///
/// Backed by a single SQLite table with one unique text column. Entries are
/// only ever added.
pub struct Ledger {
    db: SqlitePool,
    path: PathBuf,
}

impl Ledger {
    /// Open the ledger at `path`, creating the file, its directory and the
    /// table if they do not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| DigestError::Storage(sqlx::Error::Io(e)))?;
                info!("Created directory for ledger: {}", dir.display());
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let ledger = Self { db, path };
        ledger.initialize().await?;
        Ok(ledger)
    }

    /// Ensure the schema exists. Safe to call any number of times.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sent (
                link TEXT PRIMARY KEY
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        info!("Ledger '{}' initialized", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every link recorded so far.
    pub async fn load_all(&self) -> Result<HashSet<String>> {
        let links: Vec<String> = sqlx::query_scalar("SELECT link FROM sent")
            .fetch_all(&self.db)
            .await?;

        let links: HashSet<String> = links.into_iter().collect();
        info!("Loaded {} previously sent links from ledger", links.len());
        Ok(links)
    }

    /// Record `link`. Recording a link that is already present is a no-op.
    pub async fn insert(&self, link: &str) -> Result<()> {
        let result = sqlx::query("INSERT OR IGNORE INTO sent (link) VALUES (?)")
            .bind(link)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            debug!("Link already in ledger: {}", link);
        }
        Ok(())
    }

    pub async fn len(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sent")
            .fetch_one(&self.db)
            .await?;
        Ok(count as usize)
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}
