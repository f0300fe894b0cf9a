//! Settings adapter: the host platform's key/value configuration store
//!
//! Values are stored as JSON. Writing `None` deletes the entry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// Read a single setting, `None` if it was never stored
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>>;

	/// Create, replace or (with `None`) delete a setting
	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()>;

	/// List stored settings, optionally filtered by name prefix
	async fn list_settings(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>>;
}

// MemorySettingsAdapter //
//***********************//
/// In-process settings store, used by tests and embedded setups
#[derive(Debug, Default)]
pub struct MemorySettingsAdapter {
	values: parking_lot::RwLock<HashMap<String, serde_json::Value>>,
}

impl MemorySettingsAdapter {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SettingsAdapter for MemorySettingsAdapter {
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		Ok(self.values.read().get(name).cloned())
	}

	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		let mut values = self.values.write();
		match value {
			Some(value) => {
				values.insert(name.to_string(), value);
			}
			None => {
				values.remove(name);
			}
		}
		Ok(())
	}

	async fn list_settings(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		let values = self.values.read();
		Ok(values
			.iter()
			.filter(|(name, _)| prefix.is_none_or(|p| name.starts_with(p)))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect())
	}
}


// vim: ts=4
