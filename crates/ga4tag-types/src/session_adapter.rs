//! Visitor identity as provided by the host platform
//!
//! The host owns sessions. ga4tag only needs to know who the current visitor
//! is and which roles they hold.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Context struct for an authenticated visitor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCtx {
	pub id_tag: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn new<S: AsRef<str>>(id_tag: &str, roles: &[S]) -> Self {
		Self { id_tag: id_tag.into(), roles: roles.iter().map(|r| r.as_ref().into()).collect() }
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}
}

/// The visitor of the current request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Visitor {
	#[default]
	Anonymous,
	Authenticated(AuthCtx),
}

impl Visitor {
	/// Roles of the visitor, empty for anonymous visitors
	pub fn roles(&self) -> &[Box<str>] {
		match self {
			Visitor::Anonymous => &[],
			Visitor::Authenticated(auth) => &auth.roles,
		}
	}
}

impl From<Option<AuthCtx>> for Visitor {
	fn from(auth: Option<AuthCtx>) -> Self {
		auth.map_or(Visitor::Anonymous, Visitor::Authenticated)
	}
}

#[async_trait]
pub trait SessionAdapter: Debug + Send + Sync {
	/// Resolve a session token to the visitor it belongs to
	///
	/// Unknown or expired tokens resolve to `None`.
	async fn resolve_session(&self, token: &str) -> ClResult<Option<AuthCtx>>;
}

// StaticSessionAdapter //
//**********************//
/// One entry of a static session table
#[derive(Debug, Clone, Deserialize)]
pub struct StaticSession {
	pub token: String,
	pub id_tag: String,
	#[serde(default)]
	pub roles: Vec<String>,
}

/// Session adapter backed by a fixed token table
#[derive(Debug, Default)]
pub struct StaticSessionAdapter {
	sessions: HashMap<String, AuthCtx>,
}

impl StaticSessionAdapter {
	pub fn new(sessions: impl IntoIterator<Item = StaticSession>) -> Self {
		let sessions = sessions
			.into_iter()
			.map(|s| (s.token, AuthCtx::new(&s.id_tag, &s.roles)))
			.collect();
		Self { sessions }
	}

	/// Parse a JSON array of `{ token, id_tag, roles }` objects
	pub fn from_json(json: &str) -> ClResult<Self> {
		let sessions: Vec<StaticSession> = serde_json::from_str(json)?;
		debug!("Loaded {} static sessions", sessions.len());
		Ok(Self::new(sessions))
	}
}

#[async_trait]
impl SessionAdapter for StaticSessionAdapter {
	async fn resolve_session(&self, token: &str) -> ClResult<Option<AuthCtx>> {
		Ok(self.sessions.get(token).cloned())
	}
}


// vim: ts=4
