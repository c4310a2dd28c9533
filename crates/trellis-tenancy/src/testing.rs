// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory store implementations for tests.
//!
//! [`MemoryStore`] is a mutable fake of both store traits; tests build a
//! tenant tree and grant set directly, including ill-formed shapes (cycles,
//! dangling parents) that the real storage layer would reject.
//! [`FailingStore`] and [`PanicStore`] cover the failure-semantics and
//! bypass-short-circuit properties.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use trellis_tenancy_core::{
	Operation, Permission, PermissionId, Result, TenancyError, Tenant, TenantId, UserId,
};

use crate::store::{GrantFilter, GrantStore, TenantStore};

/// In-memory tenant tree and grant set.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	tenants: Arc<RwLock<HashMap<TenantId, Tenant>>>,
	grants: Arc<RwLock<Vec<Permission>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a new tenant and returns its id.
	pub fn tenant(&self, title: impl Into<String>, parent: Option<TenantId>) -> TenantId {
		let tenant = Tenant::new(title, parent);
		let id = tenant.id;
		self.tenants.write().unwrap().insert(id, tenant);
		id
	}

	/// Rewrites a tenant's parent edge. Used to mutate the tree into shapes
	/// the engine must tolerate, such as cycles.
	pub fn set_parent(&self, id: TenantId, parent: Option<TenantId>) {
		if let Some(tenant) = self.tenants.write().unwrap().get_mut(&id) {
			tenant.parent = parent;
		}
	}

	/// Removes a tenant row, leaving any edges pointing at it dangling.
	pub fn remove_tenant(&self, id: TenantId) {
		self.tenants.write().unwrap().remove(&id);
	}

	/// Inserts a grant with the given delegates and returns its id.
	pub fn grant(&self, tenant: TenantId, operation: Operation, delegates: &[UserId]) -> PermissionId {
		let mut permission = Permission::new(tenant, operation);
		permission.delegates.extend_from_slice(delegates);
		let id = permission.id;
		self.grants.write().unwrap().push(permission);
		id
	}

	/// Adds a delegate to an existing grant.
	pub fn add_delegate(&self, grant: PermissionId, user: UserId) {
		let mut grants = self.grants.write().unwrap();
		if let Some(permission) = grants.iter_mut().find(|g| g.id == grant) {
			permission.delegates.push(user);
		}
	}
}

#[async_trait]
impl TenantStore for MemoryStore {
	async fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>> {
		Ok(self.tenants.read().unwrap().get(id).cloned())
	}

	async fn find_children(&self, parent: &TenantId) -> Result<Vec<Tenant>> {
		Ok(self
			.tenants
			.read()
			.unwrap()
			.values()
			.filter(|t| t.parent.as_ref() == Some(parent))
			.cloned()
			.collect())
	}
}

#[async_trait]
impl GrantStore for MemoryStore {
	async fn find_grants(&self, filter: &GrantFilter) -> Result<Vec<Permission>> {
		Ok(self
			.grants
			.read()
			.unwrap()
			.iter()
			.filter(|g| filter.tenant.map_or(true, |t| g.tenant == t))
			.filter(|g| filter.operation.map_or(true, |o| g.operation == o))
			.filter(|g| filter.delegate.as_ref().map_or(true, |d| g.has_delegate(d)))
			.cloned()
			.collect())
	}
}

/// A store whose every call fails, for store-unavailable propagation tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl FailingStore {
	fn unavailable() -> TenancyError {
		TenancyError::store(std::io::Error::new(
			std::io::ErrorKind::ConnectionRefused,
			"store unreachable",
		))
	}
}

#[async_trait]
impl TenantStore for FailingStore {
	async fn find_tenant(&self, _id: &TenantId) -> Result<Option<Tenant>> {
		Err(Self::unavailable())
	}

	async fn find_children(&self, _parent: &TenantId) -> Result<Vec<Tenant>> {
		Err(Self::unavailable())
	}
}

#[async_trait]
impl GrantStore for FailingStore {
	async fn find_grants(&self, _filter: &GrantFilter) -> Result<Vec<Permission>> {
		Err(Self::unavailable())
	}
}

/// A store that panics when touched. Verifies that pre-store checks (the
/// override bypass, the unauthenticated guard) really short-circuit before
/// any store access.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicStore;

#[async_trait]
impl TenantStore for PanicStore {
	async fn find_tenant(&self, _id: &TenantId) -> Result<Option<Tenant>> {
		panic!("tenant store accessed");
	}

	async fn find_children(&self, _parent: &TenantId) -> Result<Vec<Tenant>> {
		panic!("tenant store accessed");
	}
}

#[async_trait]
impl GrantStore for PanicStore {
	async fn find_grants(&self, _filter: &GrantFilter) -> Result<Vec<Permission>> {
		panic!("grant store accessed");
	}
}
