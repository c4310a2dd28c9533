// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission grant type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Operation, PermissionId, TenantId, UserId};

/// A stored grant binding an operation and a tenant scope to a set of
/// delegate identities.
///
/// The grant is the unit of mutation: delegates are added to or removed from
/// an existing grant, or a new grant is created per (tenant, operation) pair.
/// At most one grant should exist per pair in normal operation — the storage
/// layer enforces this — but resolution never assumes it and treats "holds
/// the permission" as existential across all matching grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
	/// Unique identifier for this grant.
	pub id: PermissionId,

	/// The tenant node this grant is scoped to. A genuine foreign key, not
	/// inherited data; deleting the tenant orphans the grant.
	pub tenant: TenantId,

	/// The operation this grant covers.
	pub operation: Operation,

	/// The identities holding this grant.
	pub delegates: Vec<UserId>,

	/// When the grant was created.
	pub created_at: DateTime<Utc>,
}

impl Permission {
	/// Creates a new empty grant for the given tenant and operation.
	pub fn new(tenant: TenantId, operation: Operation) -> Self {
		Self {
			id: PermissionId::generate(),
			tenant,
			operation,
			delegates: Vec::new(),
			created_at: Utc::now(),
		}
	}

	/// Returns true if the given identity is listed as a delegate.
	pub fn has_delegate(&self, user: &UserId) -> bool {
		self.delegates.contains(user)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_creates_empty_grant() {
		let tenant = TenantId::generate();
		let grant = Permission::new(tenant, Operation::Read);
		assert_eq!(grant.tenant, tenant);
		assert_eq!(grant.operation, Operation::Read);
		assert!(grant.delegates.is_empty());
	}

	#[test]
	fn has_delegate_checks_membership() {
		let alice = UserId::generate();
		let bob = UserId::generate();
		let mut grant = Permission::new(TenantId::generate(), Operation::Update);
		grant.delegates.push(alice);

		assert!(grant.has_delegate(&alice));
		assert!(!grant.has_delegate(&bob));
	}

	#[test]
	fn serde_uses_operation_codes() {
		let grant = Permission::new(TenantId::generate(), Operation::Delete);
		let json = serde_json::to_string(&grant).unwrap();
		assert!(json.contains("\"operation\":\"D\""), "got: {json}");
	}
}
