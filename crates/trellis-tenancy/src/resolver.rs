// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grant resolution.
//!
//! Combines tree traversal with grant lookups. Grants are purely additive —
//! there is no explicit deny — so every check is existential: any matching
//! grant on the tenant or an ancestor wins. Resolution is read-only and fails
//! the whole call when a store is unreachable; a partial visibility answer is
//! a security defect, not a degraded-but-safe result.

use std::collections::HashSet;

use trellis_tenancy_core::{Operation, Result, TenantId, UserId};

use crate::context::RequestContext;
use crate::store::{GrantFilter, GrantStore, TenantStore};
use crate::tree::{ancestor_chain, descendant_set};

/// True iff some grant for `operation`, scoped to `tenant` or any of its
/// ancestors, lists `identity` as a delegate.
///
/// Checks the tenant itself before walking ancestors (closest scope first)
/// and returns on the first match.
#[tracing::instrument(skip(tenants, grants, ctx), fields(identity = %identity, tenant = %tenant, operation = %operation))]
pub async fn has_grant(
	tenants: &dyn TenantStore,
	grants: &dyn GrantStore,
	ctx: &RequestContext,
	identity: &UserId,
	tenant: TenantId,
	operation: Operation,
) -> Result<bool> {
	if scope_grants(grants, ctx, identity, tenant, operation).await? {
		return Ok(true);
	}

	let mut chain = ancestor_chain(tenants, ctx, tenant).await?;
	chain.reverse(); // nearest ancestor first
	for scope in chain {
		if scope_grants(grants, ctx, identity, scope, operation).await? {
			return Ok(true);
		}
	}

	Ok(false)
}

/// Existential check over every grant on one scope.
async fn scope_grants(
	grants: &dyn GrantStore,
	ctx: &RequestContext,
	identity: &UserId,
	scope: TenantId,
	operation: Operation,
) -> Result<bool> {
	ctx.checkpoint()?;
	let matches = grants
		.find_grants(&GrantFilter::new().for_tenant(scope).for_operation(operation))
		.await?;
	Ok(matches.iter().any(|g| g.has_delegate(identity)))
}

/// The visibility set of an identity: every tenant it holds `R` on directly,
/// plus all descendants of each such tenant.
///
/// Directly-granted tenants are collected by a delegate-indexed lookup, not
/// by scanning every tenant.
#[tracing::instrument(skip(tenants, grants, ctx), fields(identity = %identity))]
pub async fn tenants_visible_to(
	tenants: &dyn TenantStore,
	grants: &dyn GrantStore,
	ctx: &RequestContext,
	identity: &UserId,
) -> Result<HashSet<TenantId>> {
	ctx.checkpoint()?;
	let direct = grants
		.find_grants(
			&GrantFilter::new()
				.for_delegate(*identity)
				.for_operation(Operation::Read),
		)
		.await?;

	let roots: HashSet<TenantId> = direct.into_iter().map(|g| g.tenant).collect();
	let mut visible = roots.clone();
	for tenant in roots {
		visible.extend(descendant_set(tenants, ctx, tenant).await?);
	}

	tracing::debug!(identity = %identity, tenants = visible.len(), "visibility set computed");
	Ok(visible)
}

/// The inverse query: every identity holding `R` on `tenant` or on any of its
/// ancestors. Answers "who can see this node".
#[tracing::instrument(skip(tenants, grants, ctx), fields(tenant = %tenant))]
pub async fn users_visible_to(
	tenants: &dyn TenantStore,
	grants: &dyn GrantStore,
	ctx: &RequestContext,
	tenant: TenantId,
) -> Result<HashSet<UserId>> {
	let mut scopes = vec![tenant];
	scopes.extend(ancestor_chain(tenants, ctx, tenant).await?);

	let mut users = HashSet::new();
	for scope in scopes {
		ctx.checkpoint()?;
		let matches = grants
			.find_grants(
				&GrantFilter::new()
					.for_tenant(scope)
					.for_operation(Operation::Read),
			)
			.await?;
		for grant in matches {
			users.extend(grant.delegates);
		}
	}

	Ok(users)
}
