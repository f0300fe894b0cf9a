//! Handlebars templates of the admin pages

use handlebars::Handlebars;

use crate::prelude::*;

pub const SETTINGS_TEMPLATE: &str = "settings";

/// Template engine for the admin pages
pub struct AdminTemplates {
	handlebars: Handlebars<'static>,
}

impl AdminTemplates {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();

		// Enable strict mode to catch undefined variables
		handlebars.set_strict_mode(true);

		handlebars
			.register_template_string(
				SETTINGS_TEMPLATE,
				include_str!("../templates/settings.html.hbs"),
			)
			.map_err(|e| Error::ConfigError(format!("Invalid admin template: {}", e)))?;

		Ok(Self { handlebars })
	}

	pub fn render(&self, name: &str, vars: &serde_json::Value) -> ClResult<String> {
		self.handlebars.render(name, vars).map_err(|e| {
			error!("Failed to render template {}: {}", name, e);
			Error::Internal(format!("Template render failed: {}", e))
		})
	}
}

impl std::fmt::Debug for AdminTemplates {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AdminTemplates").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn vars() -> serde_json::Value {
		json!({
			"page_title": "Settings",
			"errors": [],
			"notice": "",
			"action_url": "/admin/options/ga4tag",
			"nonce_field": "ga4tag_nonce",
			"nonce": "tok",
			"option_page": "ga4tag_settings",
			"measurement_id": "\"><script>alert(1)</script>",
			"roles": [
				{ "slug": "editor", "name": "Editor", "checked": true },
				{ "slug": "subscriber", "name": "Subscriber", "checked": false },
			],
		})
	}

	#[test]
	fn test_render_escapes_values() {
		let templates = AdminTemplates::new().unwrap();
		let html = templates.render(SETTINGS_TEMPLATE, &vars()).unwrap();
		assert!(!html.contains("<script>alert(1)</script>"));
		assert!(html.contains("&lt;script&gt;"));
	}

	#[test]
	fn test_render_role_checkboxes() {
		let templates = AdminTemplates::new().unwrap();
		let html = templates.render(SETTINGS_TEMPLATE, &vars()).unwrap();
		assert_eq!(html.matches("name=\"excluded_roles[]\"").count(), 2);
		assert_eq!(html.matches("checked=\"checked\"").count(), 1);
		assert!(!html.contains("notice-success"));
	}

	#[test]
	fn test_strict_mode_missing_variable() {
		let templates = AdminTemplates::new().unwrap();
		assert!(templates.render(SETTINGS_TEMPLATE, &json!({ "page_title": "x" })).is_err());
	}
}

// vim: ts=4
