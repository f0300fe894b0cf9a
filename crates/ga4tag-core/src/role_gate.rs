//! Role-based suppression of tracking

use crate::prelude::*;

/// Check whether the visitor holds any of the excluded roles
///
/// Anonymous visitors are never excluded by role.
pub fn has_excluded_role<S: AsRef<str>>(visitor: &Visitor, excluded_roles: &[S]) -> bool {
	let roles = visitor.roles();
	excluded_roles.iter().any(|excluded| roles.iter().any(|r| r.as_ref() == excluded.as_ref()))
}


// vim: ts=4
