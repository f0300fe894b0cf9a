//! SQLite-backed settings adapter
//!
//! Stores each setting as one row of JSON text, keyed by name.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use ga4tag_types::prelude::*;
use ga4tag_types::settings_adapter::SettingsAdapter;

mod schema;
mod setting;

/// File name of the database inside the data directory
pub const DB_FILE: &str = "settings.db";

#[derive(Debug)]
pub struct SettingsAdapterSqlite {
	db: SqlitePool,
}

impl SettingsAdapterSqlite {
	/// Open (or create) the settings database in `dir`
	pub async fn new(dir: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		info!("Settings database opened: {}", dir.as_ref().display());
		Ok(Self { db })
	}

	/// Close the pool, waiting for open connections to finish
	pub async fn close(&self) {
		self.db.close().await;
	}
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterSqlite {
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		setting::read(&self.db, name).await
	}

	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		setting::update(&self.db, name, value).await
	}

	async fn list_settings(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		setting::list(&self.db, prefix).await
	}
}

// vim: ts=4
