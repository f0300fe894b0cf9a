//! The two persisted tracking settings
//!
//! Registers the settings, loads them for page renders, and runs submitted
//! values through the validators before they are stored.

use crate::prelude::*;
use crate::roles::MANAGE_OPTIONS;
use crate::settings::{SettingDefinition, SettingValue, SettingsRegistry, SettingsService};
use crate::validate::{self, SettingsErrors};

pub const MEASUREMENT_ID_KEY: &str = "ga4.measurement_id";
pub const EXCLUDED_ROLES_KEY: &str = "ga4.excluded_roles";

/// Register the tracking settings
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder(MEASUREMENT_ID_KEY)
			.description("GA4 Measurement ID (G-XXXXXXXXXX), empty to disable tracking")
			.default(SettingValue::String(String::new()))
			.capability(MANAGE_OPTIONS)
			.validator(|value| match value {
				SettingValue::String(s) if s.is_empty() || validate::is_valid_measurement_id(s) => {
					Ok(())
				}
				SettingValue::String(_) => Err(validate::ValidationError::MalformedId.into()),
				v => Err(Error::ValidationError(format!(
					"Measurement ID must be a string, got {}",
					v.type_name()
				))),
			})
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(EXCLUDED_ROLES_KEY)
			.description("Roles for which tracking is disabled")
			.default(SettingValue::Json(serde_json::json!([])))
			.capability(MANAGE_OPTIONS)
			.validator(|value| match value {
				SettingValue::Json(serde_json::Value::Array(items))
					if items.iter().all(serde_json::Value::is_string) =>
				{
					Ok(())
				}
				_ => Err(Error::ValidationError("Excluded roles must be a list of strings".into())),
			})
			.build()?,
	)?;

	Ok(())
}

/// Current values of the tracking settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingConfig {
	pub measurement_id: String,
	pub excluded_roles: Vec<String>,
}

impl TrackingConfig {
	pub async fn load(settings: &SettingsService) -> ClResult<Self> {
		Ok(Self {
			measurement_id: settings.get_string(MEASUREMENT_ID_KEY).await?,
			excluded_roles: settings.get_string_list(EXCLUDED_ROLES_KEY).await?,
		})
	}
}

/// A settings form submission, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSubmission {
	pub measurement_id: String,
	/// `None` when the field was absent from the form
	pub excluded_roles: Option<Vec<String>>,
}

/// Validate a submission and store both settings
///
/// Validation problems do not abort the save: an invalid measurement ID is
/// stored as the empty string and reported in the returned errors. If the
/// second write fails the measurement ID is put back to its previous value.
pub async fn save_settings<S: AsRef<str>>(
	settings: &SettingsService,
	submission: &SettingsSubmission,
	roles: &[S],
) -> ClResult<(TrackingConfig, SettingsErrors)> {
	let mut errors = SettingsErrors::new();

	let measurement_id = validate::sanitize_measurement_id(&submission.measurement_id, &mut errors);
	let known_roles = settings.role_registry().known_roles();
	let excluded_roles =
		validate::validate_roles(submission.excluded_roles.as_deref(), &known_roles);

	let previous_id = settings.get(MEASUREMENT_ID_KEY).await?;
	settings
		.set(MEASUREMENT_ID_KEY, SettingValue::String(measurement_id.clone()), roles)
		.await?;
	if let Err(e) = settings
		.set(EXCLUDED_ROLES_KEY, SettingValue::Json(serde_json::json!(excluded_roles)), roles)
		.await
	{
		warn!("Saving excluded roles failed, restoring measurement ID: {}", e);
		if let Err(restore_err) = settings.set(MEASUREMENT_ID_KEY, previous_id, roles).await {
			error!("Failed to restore measurement ID: {}", restore_err);
		}
		return Err(e);
	}

	Ok((TrackingConfig { measurement_id, excluded_roles }, errors))
}

/// Remove both settings from storage
pub async fn delete_settings(settings: &SettingsService) -> ClResult<()> {
	settings.delete(MEASUREMENT_ID_KEY).await?;
	settings.delete(EXCLUDED_ROLES_KEY).await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::roles::RoleRegistry;
	use async_trait::async_trait;
	use ga4tag_types::settings_adapter::{MemorySettingsAdapter, SettingsAdapter};
	use std::collections::HashMap;
	use std::sync::Arc;

	/// Store that refuses writes to the excluded roles
	#[derive(Debug, Default)]
	struct RolesWriteFails(MemorySettingsAdapter);

	#[async_trait]
	impl SettingsAdapter for RolesWriteFails {
		async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
			self.0.read_setting(name).await
		}

		async fn update_setting(
			&self,
			name: &str,
			value: Option<serde_json::Value>,
		) -> ClResult<()> {
			if name == EXCLUDED_ROLES_KEY {
				return Err(Error::DbError);
			}
			self.0.update_setting(name, value).await
		}

		async fn list_settings(
			&self,
			prefix: Option<&str>,
		) -> ClResult<HashMap<String, serde_json::Value>> {
			self.0.list_settings(prefix).await
		}
	}

	fn service() -> (SettingsService, Arc<MemorySettingsAdapter>) {
		let mut registry = SettingsRegistry::new();
		register_settings(&mut registry).unwrap();
		let adapter = Arc::new(MemorySettingsAdapter::new());
		let service = SettingsService::new(
			Arc::new(registry.freeze()),
			Arc::new(RoleRegistry::with_defaults()),
			adapter.clone(),
			16,
		);
		(service, adapter)
	}

	#[tokio::test]
	async fn test_defaults() {
		let (service, _) = service();
		assert_eq!(TrackingConfig::load(&service).await.unwrap(), TrackingConfig::default());
	}

	#[tokio::test]
	async fn test_save_valid_submission() {
		let (service, _) = service();
		let submission = SettingsSubmission {
			measurement_id: " G-ABC123 ".into(),
			excluded_roles: Some(vec!["editor".into(), "wizard".into(), "editor".into()]),
		};
		let (config, errors) = save_settings(&service, &submission, &["administrator"]).await.unwrap();
		assert!(errors.is_empty());
		assert_eq!(config.measurement_id, "G-ABC123");
		assert_eq!(config.excluded_roles, vec!["editor"]);
		assert_eq!(TrackingConfig::load(&service).await.unwrap(), config);
	}

	#[tokio::test]
	async fn test_save_invalid_id_clears_stored_value() {
		let (service, _) = service();
		let valid = SettingsSubmission { measurement_id: "G-ABC123".into(), excluded_roles: None };
		save_settings(&service, &valid, &["administrator"]).await.unwrap();

		let invalid = SettingsSubmission { measurement_id: "UA-12345".into(), excluded_roles: None };
		let (config, errors) = save_settings(&service, &invalid, &["administrator"]).await.unwrap();
		assert_eq!(config.measurement_id, "");
		assert_eq!(errors.len(), 1);
		assert_eq!(service.get_string(MEASUREMENT_ID_KEY).await.unwrap(), "");
	}

	#[tokio::test]
	async fn test_save_requires_admin() {
		let (service, adapter) = service();
		let submission = SettingsSubmission { measurement_id: "G-ABC123".into(), excluded_roles: None };
		let res = save_settings(&service, &submission, &["editor"]).await;
		assert!(matches!(res, Err(Error::PermissionDenied)));
		assert!(adapter.read_setting(MEASUREMENT_ID_KEY).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_validator_rejects_direct_malformed_write() {
		let (service, _) = service();
		let res = service
			.set(MEASUREMENT_ID_KEY, SettingValue::String("UA-1".into()), &["administrator"])
			.await;
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[tokio::test]
	async fn test_failed_roles_write_restores_measurement_id() {
		let mut registry = SettingsRegistry::new();
		register_settings(&mut registry).unwrap();
		let adapter = Arc::new(RolesWriteFails::default());
		adapter
			.0
			.update_setting(MEASUREMENT_ID_KEY, Some(serde_json::json!("G-OLD1")))
			.await
			.unwrap();
		let service = SettingsService::new(
			Arc::new(registry.freeze()),
			Arc::new(RoleRegistry::with_defaults()),
			adapter.clone(),
			16,
		);

		let submission = SettingsSubmission {
			measurement_id: "G-NEW1".into(),
			excluded_roles: Some(vec!["editor".into()]),
		};
		let res = save_settings(&service, &submission, &["administrator"]).await;
		assert!(matches!(res, Err(Error::DbError)));

		assert_eq!(service.get_string(MEASUREMENT_ID_KEY).await.unwrap(), "G-OLD1");
		assert_eq!(
			adapter.read_setting(MEASUREMENT_ID_KEY).await.unwrap(),
			Some(serde_json::json!("G-OLD1"))
		);
	}

	#[tokio::test]
	async fn test_delete_settings() {
		let (service, adapter) = service();
		let submission = SettingsSubmission {
			measurement_id: "G-ABC123".into(),
			excluded_roles: Some(vec!["subscriber".into()]),
		};
		save_settings(&service, &submission, &["administrator"]).await.unwrap();
		delete_settings(&service).await.unwrap();
		assert!(adapter.list_settings(Some("ga4.")).await.unwrap().is_empty());
		assert_eq!(TrackingConfig::load(&service).await.unwrap(), TrackingConfig::default());
	}
}

// vim: ts=4
