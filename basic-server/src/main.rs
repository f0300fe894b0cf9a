//! Minimal ga4tag server
//!
//! Serves static pages from `SITE_DIR` with the tracking snippet injected.
//! Configuration comes from the environment:
//!
//! - `LISTEN`: listen address (default `127.0.0.1:8080`)
//! - `DB_DIR`: settings database directory (default `./data`)
//! - `SITE_DIR`: static site root (default `./site`)
//! - `GA4TAG_SECRET`: server secret for form tokens
//! - `SESSIONS_FILE`: JSON array of `{ token, id_tag, roles }` sessions

use std::{env, path, sync::Arc};

use axum::Router;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use ga4tag::error::{ClResult, Error};
use ga4tag::session_adapter::StaticSessionAdapter;
use ga4tag::AppBuilder;
use ga4tag_settings_adapter_sqlite::SettingsAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub db_dir: path::PathBuf,
	pub site_dir: path::PathBuf,
	pub secret: Option<String>,
	pub sessions_file: Option<path::PathBuf>,
}

impl Config {
	fn from_env() -> Self {
		Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			site_dir: path::PathBuf::from(
				env::var("SITE_DIR").unwrap_or_else(|_| "./site".to_string()),
			),
			secret: env::var("GA4TAG_SECRET").ok(),
			sessions_file: env::var("SESSIONS_FILE").ok().map(path::PathBuf::from),
		}
	}
}

async fn load_sessions(config: &Config) -> ClResult<StaticSessionAdapter> {
	let Some(sessions_file) = &config.sessions_file else {
		warn!("No SESSIONS_FILE given, every visitor is anonymous");
		return Ok(StaticSessionAdapter::default());
	};
	let json = tokio::fs::read_to_string(sessions_file).await.map_err(|e| {
		Error::ConfigError(format!("Cannot read {}: {}", sessions_file.display(), e))
	})?;
	StaticSessionAdapter::from_json(&json)
}

async fn run(config: Config) -> ClResult<()> {
	let mut builder = AppBuilder::new();

	let settings_adapter = Arc::new(SettingsAdapterSqlite::new(&config.db_dir).await?);
	let session_adapter = Arc::new(load_sessions(&config).await?);
	info!("Serving site from {}", config.site_dir.display());

	builder
		.listen(config.listen)
		.settings_adapter(settings_adapter)
		.session_adapter(session_adapter)
		.site_router(Router::new().fallback_service(ServeDir::new(&config.site_dir)));
	if let Some(secret) = config.secret {
		builder.secret(secret);
	}

	builder.run().await
}

#[tokio::main]
async fn main() {
	let config = Config::from_env();

	if let Err(e) = run(config).await {
		error!("FATAL: {}", e);
		std::process::exit(1);
	}
}

// vim: ts=4
