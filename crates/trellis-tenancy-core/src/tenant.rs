// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant node type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TenantId;

/// A node in the organizational hierarchy.
///
/// The parent edge is an exclusive ownership edge: a tenant is owned by at
/// most one parent, and root tenants have no parent. In well-formed data the
/// parent relation forms a forest; the resolution engine tolerates and safely
/// terminates on externally-introduced cycles rather than assuming the
/// invariant holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
	/// Unique identifier for this tenant.
	pub id: TenantId,

	/// Display title of the tenant.
	pub title: String,

	/// The owning parent tenant, if any.
	pub parent: Option<TenantId>,

	/// When the tenant was created.
	pub created_at: DateTime<Utc>,

	/// When the tenant was last updated.
	pub updated_at: DateTime<Utc>,
}

impl Tenant {
	/// Creates a new tenant with the given title and optional parent.
	///
	/// Generates a new tenant ID and sets timestamps to now.
	pub fn new(title: impl Into<String>, parent: Option<TenantId>) -> Self {
		let now = Utc::now();
		Self {
			id: TenantId::generate(),
			title: title.into(),
			parent,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns true if this tenant has no parent.
	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_creates_root_without_parent() {
		let tenant = Tenant::new("Acme", None);
		assert_eq!(tenant.title, "Acme");
		assert!(tenant.is_root());
	}

	#[test]
	fn new_records_parent_edge() {
		let root = Tenant::new("Acme", None);
		let child = Tenant::new("EMEA", Some(root.id));
		assert_eq!(child.parent, Some(root.id));
		assert!(!child.is_root());
	}

	#[test]
	fn new_sets_timestamps() {
		let before = Utc::now();
		let tenant = Tenant::new("Acme", None);
		let after = Utc::now();

		assert!(tenant.created_at >= before && tenant.created_at <= after);
		assert_eq!(tenant.created_at, tenant.updated_at);
	}

	#[test]
	fn new_generates_unique_ids() {
		assert_ne!(Tenant::new("A", None).id, Tenant::new("A", None).id);
	}

	#[test]
	fn serde_roundtrip() {
		let tenant = Tenant::new("EMEA", Some(TenantId::generate()));
		let json = serde_json::to_string(&tenant).unwrap();
		let back: Tenant = serde_json::from_str(&json).unwrap();
		assert_eq!(back.id, tenant.id);
		assert_eq!(back.parent, tenant.parent);
		assert_eq!(back.title, tenant.title);
	}
}
