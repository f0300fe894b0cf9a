//! Common types used throughout ga4tag

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		Timestamp(chrono::Utc::now().timestamp())
	}

	pub fn add_seconds(&self, seconds: i64) -> Timestamp {
		Timestamp(self.0 + seconds)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// ApiResponse //
//*************//
/// Envelope for JSON API responses
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub time: Timestamp,
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, time: Timestamp::now(), req_id: None }
	}

	pub fn with_req_id(mut self, req_id: impl Into<String>) -> Self {
		let req_id = req_id.into();
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}

/// Body of JSON error responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
	pub code: &'static str,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(code: &'static str, message: impl Into<String>) -> Self {
		Self { error: ErrorDetail { code, message: message.into() } }
	}
}

// vim: ts=4
