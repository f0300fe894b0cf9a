//! Tracking snippet injection
//!
//! Decides per page render whether the GA4 snippet is emitted, renders it
//! with the measurement ID escaped for each output context, and places it
//! in the page footer.

use crate::escape::{esc_attr, esc_js, esc_url_param};
use crate::prelude::*;
use crate::role_gate::has_excluded_role;
use crate::validate::MeasurementId;

/// Loader endpoint of the analytics vendor
pub const GTAG_LOADER_URL: &str = "https://www.googletagmanager.com/gtag/js";

/// Element id of the external loader script
pub const LOADER_SCRIPT_ID: &str = "ga4-tracking-js";

/// Decide whether the tracking snippet is emitted for this render
///
/// The stored ID is validated again here, so a value that bypassed the
/// write path can never reach the page.
pub fn should_inject<S: AsRef<str>>(
	measurement_id: &str,
	excluded_roles: &[S],
	visitor: &Visitor,
	is_admin_context: bool,
) -> bool {
	if is_admin_context {
		return false;
	}
	if MeasurementId::parse(measurement_id).is_none() {
		if !measurement_id.is_empty() {
			warn!("Stored measurement ID is malformed, not injecting");
		}
		return false;
	}
	!has_excluded_role(visitor, excluded_roles)
}

/// The script tags emitted for one measurement ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSnippet {
	measurement_id: MeasurementId,
}

impl TrackingSnippet {
	pub fn new(measurement_id: MeasurementId) -> Self {
		Self { measurement_id }
	}

	/// Build the snippet when `should_inject` allows it
	pub fn for_render<S: AsRef<str>>(
		measurement_id: &str,
		excluded_roles: &[S],
		visitor: &Visitor,
		is_admin_context: bool,
	) -> Option<Self> {
		if !should_inject(measurement_id, excluded_roles, visitor, is_admin_context) {
			return None;
		}
		MeasurementId::parse(measurement_id).map(Self::new)
	}

	/// URL of the external loader, parameterized by the measurement ID
	pub fn loader_url(&self) -> String {
		format!("{}?id={}", GTAG_LOADER_URL, esc_url_param(self.measurement_id.as_str()))
	}

	/// Body of the inline initialization script
	pub fn inline_script(&self) -> String {
		format!(
			"window.dataLayer = window.dataLayer || []; \
			function gtag(){{dataLayer.push(arguments);}} \
			gtag('js', new Date()); \
			gtag('config', '{}');",
			esc_js(self.measurement_id.as_str())
		)
	}

	/// Both script elements, ready to be placed in the page
	pub fn render(&self) -> String {
		format!(
			"<script async defer src=\"{}\" id=\"{}\"></script>\n\
			<script id=\"{}-after\">\n{}\n</script>\n",
			esc_attr(&self.loader_url()),
			LOADER_SCRIPT_ID,
			LOADER_SCRIPT_ID,
			self.inline_script()
		)
	}
}

/// Insert markup right before the closing `</body>` tag
///
/// Pages without a closing body tag get the markup appended.
pub fn inject_into_html(html: &str, markup: &str) -> String {
	let lower = html.to_ascii_lowercase();
	match lower.rfind("</body>") {
		Some(pos) => {
			let mut out = String::with_capacity(html.len() + markup.len());
			out.push_str(&html[..pos]);
			out.push_str(markup);
			out.push_str(&html[pos..]);
			out
		}
		None => {
			let mut out = html.to_string();
			out.push_str(markup);
			out
		}
	}
}


// vim: ts=4
