//! Custom extractors for the current visitor

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;

// Auth //
//******//
/// Authenticated visitor, rejects anonymous requests
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// CurrentVisitor //
//****************//
/// The visitor of the request, anonymous when no session was resolved
#[derive(Debug, Clone)]
pub struct CurrentVisitor(pub Visitor);

impl<S> FromRequestParts<S> for CurrentVisitor
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().map(|auth| auth.0.clone());
		Ok(CurrentVisitor(auth.into()))
	}
}

// vim: ts=4
