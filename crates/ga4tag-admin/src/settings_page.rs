//! Settings page handlers
//!
//! `GET` renders the form with the stored values. `POST` checks the
//! anti-forgery token and the form envelope, runs the submission through the
//! validators, stores it and renders the page again with the outcome.

use axum::{extract::State, response::Html, Form};
use serde_json::json;

use ga4tag_core::extract::Auth;
use ga4tag_core::tracking::{self, SettingsSubmission, TrackingConfig};
use ga4tag_core::validate::{SettingsErrors, EXCLUDED_ROLES_FIELD, MEASUREMENT_ID_FIELD};

use crate::prelude::*;
use crate::templates::{AdminTemplates, SETTINGS_TEMPLATE};

/// Slug of the settings page under `<admin>/options/`
pub const PAGE_SLUG: &str = "ga4tag";
/// Option group the form submits, checked against `option_page`
pub const OPTION_GROUP: &str = "ga4tag_settings";
pub const NONCE_ACTION: &str = "ga4tag_settings";
pub const NONCE_FIELD: &str = "ga4tag_nonce";

pub const PAGE_TITLE: &str = "Integrate GA4 Google Analytics Settings";
pub const MENU_TITLE: &str = "Integrate GA4 Google Analytics";
pub const SAVED_NOTICE: &str = "Settings saved.";

/// Path of the settings page
pub fn settings_path(app: &App) -> String {
	format!("{}/options/{}", app.opts.admin_prefix.trim_end_matches('/'), PAGE_SLUG)
}

/// Fields of a settings form post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
	pub nonce: Option<String>,
	pub option_page: Option<String>,
	pub action: Option<String>,
	pub measurement_id: Option<String>,
	pub excluded_roles: Option<Vec<String>>,
}

impl SettingsForm {
	/// Collect the form from decoded name/value pairs
	///
	/// Checkbox groups repeat their field name, so the roles are gathered
	/// from every `excluded_roles[]` pair in order.
	pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
		let mut form = Self::default();
		for (name, value) in pairs {
			match name.as_str() {
				NONCE_FIELD => form.nonce = Some(value),
				"option_page" => form.option_page = Some(value),
				"action" => form.action = Some(value),
				MEASUREMENT_ID_FIELD => form.measurement_id = Some(value),
				"excluded_roles[]" | EXCLUDED_ROLES_FIELD => {
					form.excluded_roles.get_or_insert_with(Vec::new).push(value);
				}
				_ => debug!("Ignoring form field: {}", name),
			}
		}
		form
	}
}

fn render_page(
	app: &App,
	auth: &AuthCtx,
	config: &TrackingConfig,
	errors: &SettingsErrors,
	notice: Option<&str>,
) -> ClResult<Html<String>> {
	let nonce = app.nonces.create(NONCE_ACTION, &auth.id_tag)?;
	let roles: Vec<serde_json::Value> = app
		.roles
		.list()
		.map(|role| {
			json!({
				"slug": role.slug,
				"name": role.name,
				"checked": config.excluded_roles.iter().any(|r| r.as_str() == role.slug.as_ref()),
			})
		})
		.collect();
	let errors: Vec<serde_json::Value> = errors
		.iter()
		.map(|e| json!({ "field": e.field, "code": e.code, "message": e.message }))
		.collect();

	let vars = json!({
		"page_title": PAGE_TITLE,
		"errors": errors,
		"notice": notice.unwrap_or_default(),
		"action_url": settings_path(app),
		"nonce_field": NONCE_FIELD,
		"nonce": nonce,
		"option_page": OPTION_GROUP,
		"measurement_id": config.measurement_id,
		"roles": roles,
	});

	let html = app.ext::<AdminTemplates>()?.render(SETTINGS_TEMPLATE, &vars)?;
	Ok(Html(html))
}

/// GET <admin>/options/ga4tag
pub async fn get_settings_page(
	State(app): State<App>,
	Auth(auth): Auth,
) -> ClResult<Html<String>> {
	let config = TrackingConfig::load(&app.settings).await?;
	render_page(&app, &auth, &config, &SettingsErrors::new(), None)
}

/// POST <admin>/options/ga4tag
pub async fn post_settings_page(
	State(app): State<App>,
	Auth(auth): Auth,
	Form(pairs): Form<Vec<(String, String)>>,
) -> ClResult<Html<String>> {
	let form = SettingsForm::from_pairs(pairs);

	let nonce = form.nonce.as_deref().ok_or(Error::InvalidToken)?;
	app.nonces.verify(nonce, NONCE_ACTION, &auth.id_tag).inspect_err(|_| {
		warn!(subject = %auth.id_tag, "Settings form rejected: invalid nonce");
	})?;

	if form.option_page.as_deref() != Some(OPTION_GROUP) || form.action.as_deref() != Some("update")
	{
		warn!(
			subject = %auth.id_tag,
			option_page = ?form.option_page,
			action = ?form.action,
			"Settings form rejected: unexpected form envelope"
		);
		return Err(Error::InvalidToken);
	}

	let measurement_id = form
		.measurement_id
		.ok_or_else(|| Error::ValidationError("Missing field: measurement_id".into()))?;
	let submission = SettingsSubmission { measurement_id, excluded_roles: form.excluded_roles };

	let (config, errors) = tracking::save_settings(&app.settings, &submission, &auth.roles).await?;
	info!(subject = %auth.id_tag, errors = errors.len(), "Tracking settings saved");

	let notice = errors.is_empty().then_some(SAVED_NOTICE);
	render_page(&app, &auth, &config, &errors, notice)
}


// vim: ts=4
