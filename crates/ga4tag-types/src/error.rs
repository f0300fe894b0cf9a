//! Error type shared by all ga4tag crates

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};

use crate::types::ErrorResponse;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	/// Caller lacks the capability required for an admin action
	Unauthorized,
	/// Anti-forgery token missing, expired or bound to another session
	InvalidToken,
	DbError,
	Parse,
	ValidationError(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
	Json(serde_json::Error),
}

impl Error {
	/// Stable machine-readable code used in JSON error bodies
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-CORE-NOTFOUND",
			Error::PermissionDenied => "E-AUTH-NOPERM",
			Error::Unauthorized => "E-AUTH-UNAUTH",
			Error::InvalidToken => "E-AUTH-BADTOKEN",
			Error::DbError => "E-CORE-DBERR",
			Error::Parse => "E-CORE-PARSE",
			Error::ValidationError(_) => "E-VAL-INVALID",
			Error::ConfigError(_) => "E-CORE-CONFIG",
			Error::Internal(_) | Error::Io(_) | Error::Json(_) => "E-CORE-INTERNAL",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied | Error::Unauthorized | Error::InvalidToken => {
				StatusCode::FORBIDDEN
			}
			Error::ValidationError(_) | Error::Parse => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::InvalidToken => write!(f, "invalid or expired token"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			Error::Json(err) => write!(f, "json error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			Error::Json(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err)
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!("Request failed: {}", self);
		}
		let message = match &self {
			// Internal details stay in the log
			Error::Internal(_) | Error::Io(_) | Error::Json(_) | Error::DbError => {
				"internal server error".to_string()
			}
			e => e.to_string(),
		};
		(status, Json(ErrorResponse::new(self.code(), message))).into_response()
	}
}


// vim: ts=4
