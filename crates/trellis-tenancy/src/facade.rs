// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The public decision API consumed by every access-controlled operation in
//! the surrounding application.
//!
//! [`TenancyEngine`] wraps the resolver behind the two shapes the rest of the
//! system actually needs: a boolean authorization gate ([`TenancyEngine::authorize`])
//! and a scope filter over tenant identifiers ([`TenancyEngine::scope_filter`])
//! used to restrict list/read results to visible records.
//!
//! Two guards run before any store access, in order:
//!
//! 1. **Unauthenticated**: a context without an identity denies or returns
//!    empty immediately.
//! 2. **Override**: the designated global-admin identity — an injectable
//!    [`OverridePredicate`], not a hard-coded comparison — is granted
//!    unconditional allow, so a misconfigured or absent grant can never lock
//!    the admin out.
//!
//! Denial is a normal negative result, not an error; the caller turns it into
//! an access-denied response. Store failures propagate unchanged.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use trellis_tenancy_core::{Operation, Result, TenantId, UserId};

use crate::context::RequestContext;
use crate::resolver;
use crate::store::{GrantStore, TenantStore};
use crate::tree;

/// The outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	/// The operation may proceed.
	Allow,
	/// The operation is denied. A normal negative result, not an error.
	Deny,
}

impl Decision {
	/// Returns true for [`Decision::Allow`].
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}

	fn from_bool(allowed: bool) -> Self {
		if allowed {
			Decision::Allow
		} else {
			Decision::Deny
		}
	}
}

/// Injectable capability deciding the global-admin bypass.
///
/// Modeled as a predicate so it can be swapped or disabled in tests; the
/// production instance comes from [`TenancyConfig`](crate::config::TenancyConfig).
#[derive(Clone)]
pub struct OverridePredicate(Arc<dyn Fn(&UserId) -> bool + Send + Sync>);

impl OverridePredicate {
	/// No identity bypasses checks. The fail-closed default.
	pub fn none() -> Self {
		Self(Arc::new(|_| false))
	}

	/// Exactly the given identity bypasses checks.
	pub fn user(admin: UserId) -> Self {
		Self(Arc::new(move |id| *id == admin))
	}

	/// Arbitrary predicate, for tests and exotic deployments.
	pub fn from_fn(f: impl Fn(&UserId) -> bool + Send + Sync + 'static) -> Self {
		Self(Arc::new(f))
	}

	/// Returns true if the identity bypasses all grant checks.
	pub fn is_override(&self, identity: &UserId) -> bool {
		(self.0)(identity)
	}
}

impl fmt::Debug for OverridePredicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("OverridePredicate(..)")
	}
}

/// A materialized predicate over tenant identifiers, used by the query layer
/// to restrict list/read results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
	/// The override identity: no filtering at all.
	Unrestricted,
	/// Only the listed tenants are visible.
	Visible(HashSet<TenantId>),
}

impl ScopeFilter {
	/// Returns true if records scoped to the given tenant are visible.
	pub fn allows(&self, tenant: &TenantId) -> bool {
		match self {
			ScopeFilter::Unrestricted => true,
			ScopeFilter::Visible(ids) => ids.contains(tenant),
		}
	}

	/// Returns true for the override identity's filter, letting the query
	/// layer skip the restriction clause entirely.
	pub fn is_unrestricted(&self) -> bool {
		matches!(self, ScopeFilter::Unrestricted)
	}

	/// The visible tenant set, or `None` when unrestricted.
	pub fn visible(&self) -> Option<&HashSet<TenantId>> {
		match self {
			ScopeFilter::Unrestricted => None,
			ScopeFilter::Visible(ids) => Some(ids),
		}
	}
}

/// The permission-resolution engine.
///
/// Stateless: each call is an idempotent read computed fresh from current
/// store contents, so a grant change is visible to the very next check. The
/// engine never mutates either store.
#[derive(Clone)]
pub struct TenancyEngine {
	tenants: Arc<dyn TenantStore>,
	grants: Arc<dyn GrantStore>,
	overrides: OverridePredicate,
}

impl TenancyEngine {
	/// Creates an engine over the given stores and override capability.
	pub fn new(
		tenants: Arc<dyn TenantStore>,
		grants: Arc<dyn GrantStore>,
		overrides: OverridePredicate,
	) -> Self {
		Self {
			tenants,
			grants,
			overrides,
		}
	}

	/// Returns true if the calling identity bypasses all checks.
	pub fn is_override(&self, ctx: &RequestContext) -> bool {
		ctx.identity()
			.map(|id| self.overrides.is_override(id))
			.unwrap_or(false)
	}

	/// Can the caller perform `operation` against `tenant`?
	///
	/// A missing target tenant denies; grants scoped to it may be orphaned
	/// but the node no longer exists to act on.
	#[tracing::instrument(skip(self, ctx), fields(tenant = %tenant, operation = %operation))]
	pub async fn authorize(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
		operation: Operation,
	) -> Result<Decision> {
		let Some(identity) = ctx.identity() else {
			return Ok(Decision::Deny);
		};
		if self.overrides.is_override(identity) {
			tracing::debug!(identity = %identity, "override identity; allow");
			return Ok(Decision::Allow);
		}

		ctx.checkpoint()?;
		if self.tenants.find_tenant(&tenant).await?.is_none() {
			return Ok(Decision::Deny);
		}

		let allowed = resolver::has_grant(
			self.tenants.as_ref(),
			self.grants.as_ref(),
			ctx,
			identity,
			tenant,
			operation,
		)
		.await?;
		tracing::debug!(identity = %identity, allowed, "authorization decision");
		Ok(Decision::from_bool(allowed))
	}

	/// Gate for creating a tenant under `parent`.
	///
	/// Requires `C` on the parent; root tenants can only be created by the
	/// override identity.
	pub async fn authorize_tenant_create(
		&self,
		ctx: &RequestContext,
		parent: Option<TenantId>,
	) -> Result<Decision> {
		if ctx.identity().is_none() {
			return Ok(Decision::Deny);
		}
		if self.is_override(ctx) {
			return Ok(Decision::Allow);
		}
		match parent {
			Some(parent) => self.authorize(ctx, parent, Operation::Create).await,
			None => Ok(Decision::Deny),
		}
	}

	/// Gate for updating a tenant, optionally moving it under `new_parent`.
	///
	/// Requires `U` on the tenant's current parent and, when reparenting, on
	/// the new parent as well. Root tenants can only be updated by the
	/// override identity.
	pub async fn authorize_tenant_update(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
		new_parent: Option<TenantId>,
	) -> Result<Decision> {
		if ctx.identity().is_none() {
			return Ok(Decision::Deny);
		}
		if self.is_override(ctx) {
			return Ok(Decision::Allow);
		}

		ctx.checkpoint()?;
		let Some(current) = self.tenants.find_tenant(&tenant).await? else {
			return Ok(Decision::Deny);
		};
		let Some(parent) = current.parent else {
			return Ok(Decision::Deny);
		};

		let on_parent = self.authorize(ctx, parent, Operation::Update).await?;
		if !on_parent.is_allowed() {
			return Ok(Decision::Deny);
		}

		if let Some(new_parent) = new_parent {
			return self.authorize(ctx, new_parent, Operation::Update).await;
		}
		Ok(Decision::Allow)
	}

	/// Gate for deleting a tenant.
	///
	/// Requires `D` on the parent; root tenants can only be deleted by the
	/// override identity.
	pub async fn authorize_tenant_delete(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
	) -> Result<Decision> {
		if ctx.identity().is_none() {
			return Ok(Decision::Deny);
		}
		if self.is_override(ctx) {
			return Ok(Decision::Allow);
		}

		ctx.checkpoint()?;
		let Some(current) = self.tenants.find_tenant(&tenant).await? else {
			return Ok(Decision::Deny);
		};
		match current.parent {
			Some(parent) => self.authorize(ctx, parent, Operation::Delete).await,
			None => Ok(Decision::Deny),
		}
	}

	/// The caller's visibility set: every tenant it holds `R` on directly,
	/// plus all their descendants. Empty for unauthenticated callers.
	///
	/// The override identity gets its literal grants here, not the full
	/// universe; callers wanting the bypass use [`Self::scope_filter`].
	pub async fn tenants_visible_to(&self, ctx: &RequestContext) -> Result<HashSet<TenantId>> {
		let Some(identity) = ctx.identity() else {
			return Ok(HashSet::new());
		};
		resolver::tenants_visible_to(self.tenants.as_ref(), self.grants.as_ref(), ctx, identity)
			.await
	}

	/// Every identity holding `R` on `tenant` or on any of its ancestors.
	/// Empty for unauthenticated callers.
	pub async fn users_visible_to(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
	) -> Result<HashSet<UserId>> {
		if ctx.identity().is_none() {
			return Ok(HashSet::new());
		}
		resolver::users_visible_to(self.tenants.as_ref(), self.grants.as_ref(), ctx, tenant).await
	}

	/// Builds the scope filter the query layer applies to list/read results.
	///
	/// Unrestricted for the override identity — decided before any store
	/// access — and an empty visible set for unauthenticated callers.
	pub async fn scope_filter(&self, ctx: &RequestContext) -> Result<ScopeFilter> {
		if ctx.identity().is_none() {
			return Ok(ScopeFilter::Visible(HashSet::new()));
		}
		if self.is_override(ctx) {
			return Ok(ScopeFilter::Unrestricted);
		}
		Ok(ScopeFilter::Visible(self.tenants_visible_to(ctx).await?))
	}

	/// Reusable primitive: the root-first ancestor chain of a tenant. Empty
	/// for unauthenticated callers.
	pub async fn ancestor_chain(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
	) -> Result<Vec<TenantId>> {
		if ctx.identity().is_none() {
			return Ok(Vec::new());
		}
		tree::ancestor_chain(self.tenants.as_ref(), ctx, tenant).await
	}

	/// Reusable primitive: the descendant set of a tenant, itself excluded.
	/// Empty for unauthenticated callers.
	pub async fn descendant_set(
		&self,
		ctx: &RequestContext,
		tenant: TenantId,
	) -> Result<HashSet<TenantId>> {
		if ctx.identity().is_none() {
			return Ok(HashSet::new());
		}
		tree::descendant_set(self.tenants.as_ref(), ctx, tenant).await
	}
}

impl fmt::Debug for TenancyEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TenancyEngine")
			.field("overrides", &self.overrides)
			.finish_non_exhaustive()
	}
}
