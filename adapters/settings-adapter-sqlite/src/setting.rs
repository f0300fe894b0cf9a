//! Settings key-value store
//!
//! Values are stored as JSON text. Rows whose value does not parse are
//! treated as absent, so the registered default applies.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use ga4tag_types::prelude::*;

fn parse_value(name: &str, value: Option<String>) -> Option<serde_json::Value> {
	let value = value?;
	serde_json::from_str(&value)
		.inspect_err(|err| warn!("Ignoring unparsable setting '{}': {}", name, err))
		.ok()
}

/// List all settings or those whose name starts with `prefix`
pub(crate) async fn list(
	db: &SqlitePool,
	prefix: Option<&str>,
) -> ClResult<HashMap<String, serde_json::Value>> {
	let rows = if let Some(prefix) = prefix {
		sqlx::query("SELECT name, value FROM settings WHERE substr(name, 1, length(?1)) = ?1")
			.bind(prefix)
			.fetch_all(db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?
	} else {
		sqlx::query("SELECT name, value FROM settings")
			.fetch_all(db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?
	};

	let mut settings = HashMap::new();
	for row in rows {
		let name: String = row.get("name");
		if let Some(value) = parse_value(&name, row.get("value")) {
			settings.insert(name, value);
		}
	}

	Ok(settings)
}

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	Ok(row.and_then(|r| parse_value(name, r.get("value"))))
}

/// Update or create a setting, `None` deletes it
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		let value_str = val.to_string();
		sqlx::query(
			"INSERT OR REPLACE INTO settings (name, value, updated_at) VALUES (?, ?, unixepoch())",
		)
		.bind(name)
		.bind(value_str)
		.execute(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;
	} else {
		sqlx::query("DELETE FROM settings WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;
	}

	Ok(())
}

// vim: ts=4
