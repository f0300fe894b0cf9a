//! Settings service with caching, validation, and permission checks

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use ga4tag_types::settings_adapter::SettingsAdapter;

use super::types::{FrozenSettingsRegistry, Setting, SettingValue};
use crate::prelude::*;
use crate::roles::RoleRegistry;

/// LRU cache for settings values
///
/// Every invalidation bumps a generation counter. A value read from storage
/// is only cached if no invalidation happened since the read started.
pub struct SettingsCache {
	cache: parking_lot::Mutex<(LruCache<String, SettingValue>, u64)>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self { cache: parking_lot::Mutex::new((LruCache::new(capacity), 0)) }
	}

	pub fn get(&self, key: &str) -> Option<SettingValue> {
		self.cache.lock().0.get(key).cloned()
	}

	/// Current generation, taken before reading from storage
	pub fn generation(&self) -> u64 {
		self.cache.lock().1
	}

	/// Cache a value read at `generation`, dropped if it is stale by now
	pub fn put(&self, key: String, value: SettingValue, generation: u64) -> bool {
		let mut cache = self.cache.lock();
		if cache.1 != generation {
			debug!("Setting '{}' changed during read, not caching", key);
			return false;
		}
		cache.0.put(key, value);
		true
	}

	pub fn invalidate(&self, key: &str) {
		let mut cache = self.cache.lock();
		cache.0.pop(key);
		cache.1 = cache.1.wrapping_add(1);
	}

	pub fn clear(&self) {
		let mut cache = self.cache.lock();
		cache.0.clear();
		cache.1 = cache.1.wrapping_add(1);
	}
}

/// Settings service - main interface for reading and writing settings
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	role_registry: Arc<RoleRegistry>,
	cache: SettingsCache,
	adapter: Arc<dyn SettingsAdapter>,
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		role_registry: Arc<RoleRegistry>,
		adapter: Arc<dyn SettingsAdapter>,
		cache_size: usize,
	) -> Self {
		Self { registry, role_registry, cache: SettingsCache::new(cache_size), adapter }
	}

	/// Get setting value (stored -> default)
	pub async fn get(&self, key: &str) -> ClResult<SettingValue> {
		if let Some(value) = self.cache.get(key) {
			debug!("Setting cache hit: {}", key);
			return Ok(value);
		}

		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		let generation = self.cache.generation();
		if let Some(json_value) = self.adapter.read_setting(key).await? {
			let value = serde_json::from_value::<SettingValue>(json_value)
				.map_err(|e| Error::ValidationError(format!("Invalid setting value: {}", e)))?;
			self.cache.put(key.to_string(), value.clone(), generation);
			return Ok(value);
		}

		match &def.default {
			Some(default) => {
				self.cache.put(key.to_string(), default.clone(), generation);
				Ok(default.clone())
			}
			None => Err(Error::ValidationError(format!(
				"Setting '{}' has no default and must be configured",
				key
			))),
		}
	}

	/// Set setting value with validation and permission checks
	///
	/// `roles` are the roles of the authenticated caller. Concurrent writers
	/// are not coordinated: the last write wins.
	pub async fn set<S: AsRef<str>>(
		&self,
		key: &str,
		value: SettingValue,
		roles: &[S],
	) -> ClResult<Setting> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		if !self.role_registry.has_capability(roles, def.capability) {
			warn!("Permission denied for setting '{}': requires {}", key, def.capability);
			return Err(Error::PermissionDenied);
		}

		if let Some(default) = &def.default {
			if !value.matches_type(default) {
				return Err(Error::ValidationError(format!(
					"Type mismatch for setting '{}': expected {}, got {}",
					key,
					default.type_name(),
					value.type_name()
				)));
			}
		}

		if let Some(validator) = &def.validator {
			validator(&value)?;
		}

		let json_value = serde_json::to_value(&value)
			.map_err(|e| Error::ValidationError(format!("Failed to serialize setting: {}", e)))?;
		self.adapter.update_setting(key, Some(json_value)).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' updated", key);

		Ok(Setting { key: key.to_string(), value, updated_at: Timestamp::now() })
	}

	/// Delete a stored setting; reads fall back to the default afterwards
	pub async fn delete(&self, key: &str) -> ClResult<()> {
		if self.registry.get(key).is_none() {
			return Err(Error::ValidationError(format!("Unknown setting: {}", key)));
		}
		self.adapter.update_setting(key, None).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' deleted", key);
		Ok(())
	}

	/// Validate that all settings without a default are configured
	pub async fn validate_required_settings(&self) -> ClResult<()> {
		for def in self.registry.list() {
			if def.default.is_some() {
				continue;
			}

			if self.adapter.read_setting(&def.key).await?.is_none() {
				return Err(Error::ValidationError(format!(
					"Required setting '{}' is not configured",
					def.key
				)));
			}
		}
		Ok(())
	}

	pub async fn get_string(&self, key: &str) -> ClResult<String> {
		match self.get(key).await? {
			SettingValue::String(s) => Ok(s),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not a string, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub async fn get_json(&self, key: &str) -> ClResult<serde_json::Value> {
		match self.get(key).await? {
			SettingValue::Json(j) => Ok(j),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not JSON, got {}",
				key,
				v.type_name()
			))),
		}
	}

	/// Read a JSON array of strings
	pub async fn get_string_list(&self, key: &str) -> ClResult<Vec<String>> {
		let json = self.get_json(key).await?;
		serde_json::from_value(json).map_err(|e| {
			Error::ValidationError(format!("Setting '{}' is not a list of strings: {}", key, e))
		})
	}

	pub fn role_registry(&self) -> &Arc<RoleRegistry> {
		&self.role_registry
	}
}


// vim: ts=4
