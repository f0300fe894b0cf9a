//! Sanitizing and validating submitted settings
//!
//! Validation never aborts form processing. A failed measurement ID is
//! stored as the empty string and the reason is recorded in
//! [`SettingsErrors`] so the settings page can show it next to the field.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::prelude::*;

/// Form field name of the measurement ID
pub const MEASUREMENT_ID_FIELD: &str = "measurement_id";

/// Form field name of the excluded roles list
pub const EXCLUDED_ROLES_FIELD: &str = "excluded_roles";

static MEASUREMENT_ID_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^G-[A-Za-z0-9]+$").ok());

static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

static OCTET_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").ok());

static WHITESPACE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Why a submitted measurement ID was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
	EmptyId,
	MalformedId,
}

impl ValidationError {
	pub fn code(&self) -> &'static str {
		match self {
			ValidationError::EmptyId => "empty_measurement_id",
			ValidationError::MalformedId => "invalid_measurement_id",
		}
	}

	pub fn message(&self) -> &'static str {
		match self {
			ValidationError::EmptyId => "Measurement ID is required.",
			ValidationError::MalformedId => {
				"Measurement ID must begin with G- followed by a string of letters and numbers."
			}
		}
	}
}

impl std::fmt::Display for ValidationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.message())
	}
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
	fn from(err: ValidationError) -> Self {
		Error::ValidationError(err.message().to_string())
	}
}

/// A measurement ID known to match `G-` followed by ASCII alphanumerics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeasurementId(String);

impl MeasurementId {
	/// Accepts the value as-is; no trimming or case normalization
	pub fn parse(value: &str) -> Option<MeasurementId> {
		is_valid_measurement_id(value).then(|| MeasurementId(value.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl AsRef<str> for MeasurementId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for MeasurementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Check a value against `^G-[A-Za-z0-9]+$`
pub fn is_valid_measurement_id(value: &str) -> bool {
	match MEASUREMENT_ID_RE.as_ref() {
		Some(re) => re.is_match(value),
		None => {
			error!("Measurement ID pattern failed to compile");
			false
		}
	}
}

fn replace_all(re: &LazyLock<Option<Regex>>, text: &str, rep: &str) -> String {
	match re.as_ref() {
		Some(re) => re.replace_all(text, rep).into_owned(),
		None => text.to_string(),
	}
}

/// Sanitize a single-line text field
///
/// Strips markup tags, percent-encoded octets and control characters, and
/// collapses runs of whitespace into a single space.
pub fn sanitize_text_field(input: &str) -> String {
	let text = replace_all(&TAG_RE, input, "");
	let text = replace_all(&OCTET_RE, &text, "");
	let text: String =
		text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect::<String>();
	let text = replace_all(&WHITESPACE_RE, &text, " ");
	text.trim().to_string()
}

/// Validate a submitted measurement ID
///
/// Returns the trimmed value unchanged when it matches the pattern.
pub fn validate_measurement_id(raw: &str) -> Result<MeasurementId, ValidationError> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Err(ValidationError::EmptyId);
	}
	MeasurementId::parse(trimmed).ok_or(ValidationError::MalformedId)
}

/// Validate the excluded roles field
///
/// `None` stands for an absent field. Unknown roles are dropped silently,
/// duplicates keep their first position.
pub fn validate_roles<S: AsRef<str>>(
	raw: Option<&[S]>,
	known_roles: &HashSet<&str>,
) -> Vec<String> {
	let Some(raw) = raw else {
		return Vec::new();
	};

	let mut seen = HashSet::new();
	let mut validated = Vec::with_capacity(raw.len());
	for candidate in raw {
		let role = sanitize_text_field(candidate.as_ref());
		if !known_roles.contains(role.as_str()) {
			debug!("Dropping unknown role: {:?}", role);
			continue;
		}
		if seen.insert(role.clone()) {
			validated.push(role);
		}
	}
	validated
}

/// One message attached to a settings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	pub field: &'static str,
	pub code: &'static str,
	pub message: String,
}

/// Errors collected while processing a settings submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsErrors {
	errors: Vec<FieldError>,
}

impl SettingsErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
		self.errors.push(FieldError { field, code, message: message.into() });
	}

	pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
		self.errors.iter().filter(move |e| e.field == field)
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
		self.errors.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}
}

/// Sanitize and validate a measurement ID for storage
///
/// Always yields the value to store: the validated ID, or the empty string
/// with a message recorded in `errors`.
pub fn sanitize_measurement_id(raw: &str, errors: &mut SettingsErrors) -> String {
	let sanitized = sanitize_text_field(raw);
	match validate_measurement_id(&sanitized) {
		Ok(id) => id.into_string(),
		Err(err) => {
			info!("Rejected measurement ID: {}", err.code());
			errors.add(MEASUREMENT_ID_FIELD, err.code(), err.message());
			String::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn known() -> HashSet<&'static str> {
		["editor", "author"].into_iter().collect()
	}

	#[test]
	fn test_valid_ids_pass_unchanged() {
		for id in ["G-ABC123", "G-x", "G-abcDEF0987654321"] {
			assert_eq!(validate_measurement_id(id).unwrap().as_str(), id);
		}
	}

	#[test]
	fn test_valid_id_is_trimmed() {
		assert_eq!(validate_measurement_id("  G-ABC123\t\n").unwrap().as_str(), "G-ABC123");
	}

	#[test]
	fn test_empty_id() {
		assert_eq!(validate_measurement_id(""), Err(ValidationError::EmptyId));
		assert_eq!(validate_measurement_id("   \t "), Err(ValidationError::EmptyId));
	}

	#[test]
	fn test_malformed_ids() {
		for id in ["UA-12345", "g-abc", "G-", "G-ABC 123", "G-ABC_123", "GA-123", "G-ÄBC"] {
			assert_eq!(validate_measurement_id(id), Err(ValidationError::MalformedId), "{}", id);
		}
	}

	#[test]
	fn test_sanitize_measurement_id_records_errors() {
		let mut errors = SettingsErrors::new();
		assert_eq!(sanitize_measurement_id("UA-12345", &mut errors), "");
		assert_eq!(sanitize_measurement_id(" ", &mut errors), "");
		assert_eq!(sanitize_measurement_id("G-OK1", &mut errors), "G-OK1");

		let codes: Vec<_> = errors.for_field(MEASUREMENT_ID_FIELD).map(|e| e.code).collect();
		assert_eq!(codes, vec!["invalid_measurement_id", "empty_measurement_id"]);
	}

	#[test]
	fn test_sanitize_strips_markup() {
		let mut errors = SettingsErrors::new();
		assert_eq!(sanitize_measurement_id("<b>G-ABC123</b>", &mut errors), "G-ABC123");
		assert!(errors.is_empty());

		assert_eq!(sanitize_measurement_id("<script>alert(1)</script>", &mut errors), "");
		assert_eq!(errors.len(), 1);
	}

	#[test]
	fn test_sanitize_text_field() {
		assert_eq!(sanitize_text_field("  a\n\tb  "), "a b");
		assert_eq!(sanitize_text_field("edi%0Ator"), "editor");
		assert_eq!(sanitize_text_field("<i>author</i>"), "author");
	}

	#[test]
	fn test_validate_roles_filters_unknown() {
		let roles = validate_roles(Some(&["editor", "wizard"][..]), &known());
		assert_eq!(roles, vec!["editor"]);
	}

	#[test]
	fn test_validate_roles_absent_field() {
		assert!(validate_roles::<&str>(None, &known()).is_empty());
	}

	#[test]
	fn test_validate_roles_keeps_order_and_dedups() {
		let roles = validate_roles(Some(&["author", "editor", "author"][..]), &known());
		assert_eq!(roles, vec!["author", "editor"]);
	}

	#[test]
	fn test_validation_error_into_error() {
		let err: Error = ValidationError::EmptyId.into();
		assert!(matches!(err, Error::ValidationError(msg) if msg == "Measurement ID is required."));
	}
}

// vim: ts=4
