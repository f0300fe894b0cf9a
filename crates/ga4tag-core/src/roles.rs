//! Role registry of the host platform
//!
//! Lists the roles visitors can hold, with their display names and the
//! capabilities they grant. The settings page offers every registered role
//! for exclusion, and submitted roles are validated against this list.

use std::collections::HashSet;

use crate::prelude::*;

/// Capability required to change site options
pub const MANAGE_OPTIONS: &str = "manage_options";

pub const ADMINISTRATOR: &str = "administrator";

#[derive(Debug, Clone)]
pub struct RoleDefinition {
	pub slug: Box<str>,
	pub name: Box<str>,
	pub capabilities: Box<[Box<str>]>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
	roles: Vec<RoleDefinition>,
}

impl RoleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the standard CMS roles
	pub fn with_defaults() -> Self {
		let defaults: [(&str, &str, &[&str]); 5] = [
			(ADMINISTRATOR, "Administrator", &[MANAGE_OPTIONS, "edit_posts", "read"]),
			("editor", "Editor", &["edit_others_posts", "edit_posts", "read"]),
			("author", "Author", &["publish_posts", "edit_posts", "read"]),
			("contributor", "Contributor", &["edit_posts", "read"]),
			("subscriber", "Subscriber", &["read"]),
		];
		let roles = defaults
			.into_iter()
			.map(|(slug, name, caps)| RoleDefinition {
				slug: slug.into(),
				name: name.into(),
				capabilities: caps.iter().map(|&c| c.into()).collect(),
			})
			.collect();
		Self { roles }
	}

	/// Register an additional role
	pub fn add(&mut self, slug: &str, name: &str, capabilities: &[&str]) -> ClResult<()> {
		if self.contains(slug) {
			return Err(Error::ConfigError(format!("Role '{}' is already registered", slug)));
		}
		debug!("Registering role: {}", slug);
		self.roles.push(RoleDefinition {
			slug: slug.into(),
			name: name.into(),
			capabilities: capabilities.iter().map(|&c| c.into()).collect(),
		});
		Ok(())
	}

	/// Roles in registration order
	pub fn list(&self) -> impl Iterator<Item = &RoleDefinition> {
		self.roles.iter()
	}

	pub fn contains(&self, slug: &str) -> bool {
		self.roles.iter().any(|r| r.slug.as_ref() == slug)
	}

	/// Role slugs, for validating submitted role lists
	pub fn known_roles(&self) -> HashSet<&str> {
		self.roles.iter().map(|r| r.slug.as_ref()).collect()
	}

	/// Check whether any of the given roles grants the capability
	pub fn has_capability<S: AsRef<str>>(&self, roles: &[S], capability: &str) -> bool {
		roles.iter().any(|role| {
			self.roles
				.iter()
				.filter(|def| def.slug.as_ref() == role.as_ref())
				.any(|def| def.capabilities.iter().any(|c| c.as_ref() == capability))
		})
	}

	pub fn len(&self) -> usize {
		self.roles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.roles.is_empty()
	}
}


// vim: ts=4
