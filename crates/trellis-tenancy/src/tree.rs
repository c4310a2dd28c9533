// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant tree traversal.
//!
//! The tree is externally owned and externally mutable, so neither walk
//! trusts the forest invariant: both are iterative with an explicit visited
//! set, and a revisited node bounds the traversal instead of looping. A
//! detected cycle is not an error — the cycle edge is treated as absent — but
//! it is flagged as a data-integrity anomaly via `tracing::warn!` for
//! out-of-band remediation.

use std::collections::HashSet;

use futures::future;
use trellis_tenancy_core::{Result, TenantId};

use crate::context::RequestContext;
use crate::store::TenantStore;

/// Computes the ancestor chain of a tenant: its parent, grandparent, and so
/// on up to the root, returned root-first and excluding the tenant itself.
///
/// Returns an empty chain when the tenant does not exist or has no parent. A
/// parent edge pointing at a missing tenant is a dead end and terminates the
/// walk; a revisited id terminates it as a cycle.
#[tracing::instrument(skip(store, ctx), fields(tenant = %tenant))]
pub async fn ancestor_chain(
	store: &dyn TenantStore,
	ctx: &RequestContext,
	tenant: TenantId,
) -> Result<Vec<TenantId>> {
	let mut seen: HashSet<TenantId> = HashSet::new();
	seen.insert(tenant);

	ctx.checkpoint()?;
	let Some(mut current) = store.find_tenant(&tenant).await? else {
		return Ok(Vec::new());
	};

	let mut chain = Vec::new();
	while let Some(parent_id) = current.parent {
		if !seen.insert(parent_id) {
			tracing::warn!(
				tenant = %tenant,
				revisited = %parent_id,
				"cycle in tenant parent chain; truncating walk"
			);
			break;
		}

		ctx.checkpoint()?;
		match store.find_tenant(&parent_id).await? {
			Some(parent) => {
				chain.push(parent_id);
				current = parent;
			}
			// Dangling parent reference: dead end.
			None => break,
		}
	}

	chain.reverse();
	Ok(chain)
}

/// Computes the set of all tenants transitively reachable via child links
/// from the given tenant, excluding the tenant itself.
///
/// Expands one frontier level at a time; sibling child lookups within a level
/// are fanned out concurrently and their results merged into the single
/// visited set before the next level expands, so each node is visited at most
/// once even over diamonds or cycles.
#[tracing::instrument(skip(store, ctx), fields(tenant = %tenant))]
pub async fn descendant_set(
	store: &dyn TenantStore,
	ctx: &RequestContext,
	tenant: TenantId,
) -> Result<HashSet<TenantId>> {
	let mut visited: HashSet<TenantId> = HashSet::new();
	visited.insert(tenant);

	let mut frontier = vec![tenant];
	while !frontier.is_empty() {
		ctx.checkpoint()?;
		let levels =
			future::try_join_all(frontier.iter().map(|id| store.find_children(id))).await?;

		frontier = Vec::new();
		for child in levels.into_iter().flatten() {
			if visited.insert(child.id) {
				frontier.push(child.id);
			}
		}
	}

	visited.remove(&tenant);
	Ok(visited)
}
