// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The abstract data-access boundary the engine consumes.
//!
//! Both stores are shared, externally-owned, read-mostly resources. The
//! engine never acquires locks on them and never mutates them; tenant and
//! permission lifecycle belongs to the surrounding application
//! (`trellis-server-db` in this workspace).
//!
//! Every method is a potentially blocking I/O operation. Implementations
//! must surface unavailability as
//! [`TenancyError::Store`](trellis_tenancy_core::TenancyError::Store), never
//! as an empty result.

use async_trait::async_trait;
use trellis_tenancy_core::{Operation, Permission, Result, Tenant, TenantId, UserId};

/// Lookup access to the persistent tenant tree.
#[async_trait]
pub trait TenantStore: Send + Sync {
	/// Finds a tenant by id. `None` is a dead end, not an error.
	async fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>>;

	/// Finds the direct children of the given tenant.
	async fn find_children(&self, parent: &TenantId) -> Result<Vec<Tenant>>;
}

/// Lookup access to the persistent set of permission grants.
#[async_trait]
pub trait GrantStore: Send + Sync {
	/// Finds every grant matching the filter. An unset filter field matches
	/// all values.
	async fn find_grants(&self, filter: &GrantFilter) -> Result<Vec<Permission>>;
}

/// Filter for grant lookups. All fields optional; builder-style construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
	/// Match grants scoped to this tenant.
	pub tenant: Option<TenantId>,
	/// Match grants covering this operation.
	pub operation: Option<Operation>,
	/// Match grants whose delegate set contains this identity.
	pub delegate: Option<UserId>,
}

impl GrantFilter {
	/// Creates an empty filter matching every grant.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: match grants scoped to the given tenant.
	pub fn for_tenant(mut self, tenant: TenantId) -> Self {
		self.tenant = Some(tenant);
		self
	}

	/// Builder: match grants covering the given operation.
	pub fn for_operation(mut self, operation: Operation) -> Self {
		self.operation = Some(operation);
		self
	}

	/// Builder: match grants listing the given identity as a delegate.
	pub fn for_delegate(mut self, delegate: UserId) -> Self {
		self.delegate = Some(delegate);
		self
	}
}
