// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Development/demo seeding for the tenancy schema.
//!
//! Builds a titled tenant hierarchy, then assigns every role on every node to
//! users in round-robin order, attaching delegates to the grants provisioned
//! at tenant creation.

use std::collections::HashMap;

use trellis_tenancy_core::{Operation, Tenant, TenantId, UserId};

use crate::error::DbError;
use crate::permission::PermissionRepository;
use crate::tenant::TenantRepository;

/// Seed roles, each a bundle of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRole {
	/// Read only.
	ViewOnly,
	/// Read and update.
	Editor,
	/// Create, read, and update.
	Creator,
	/// All four operations.
	Admin,
}

impl SeedRole {
	/// Every role, in the order they are dealt out per tenant.
	pub fn all() -> &'static [SeedRole] {
		&[
			SeedRole::Admin,
			SeedRole::Creator,
			SeedRole::Editor,
			SeedRole::ViewOnly,
		]
	}

	/// The operations this role bundles.
	pub fn operations(&self) -> &'static [Operation] {
		match self {
			SeedRole::ViewOnly => &[Operation::Read],
			SeedRole::Editor => &[Operation::Read, Operation::Update],
			SeedRole::Creator => &[Operation::Create, Operation::Read, Operation::Update],
			SeedRole::Admin => &[
				Operation::Create,
				Operation::Read,
				Operation::Update,
				Operation::Delete,
			],
		}
	}
}

/// A node in a tenant hierarchy to be seeded.
#[derive(Debug, Clone)]
pub struct TenantSeed {
	pub title: String,
	pub children: Vec<TenantSeed>,
}

impl TenantSeed {
	/// A childless node.
	pub fn leaf(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			children: Vec::new(),
		}
	}

	/// A node with children.
	pub fn branch(title: impl Into<String>, children: Vec<TenantSeed>) -> Self {
		Self {
			title: title.into(),
			children,
		}
	}
}

/// Creates the given hierarchy, parents before children, and returns every
/// created tenant id in creation order.
#[tracing::instrument(skip(repo, roots))]
pub async fn seed_tenants(
	repo: &TenantRepository,
	roots: &[TenantSeed],
) -> Result<Vec<TenantId>, DbError> {
	tracing::info!("seeding tenants");

	let mut created = Vec::new();
	let mut worklist: Vec<(Option<TenantId>, &TenantSeed)> =
		roots.iter().rev().map(|r| (None, r)).collect();

	while let Some((parent, node)) = worklist.pop() {
		let tenant = Tenant::new(&node.title, parent);
		repo.create_tenant(&tenant).await?;
		created.push(tenant.id);
		for child in node.children.iter().rev() {
			worklist.push((Some(tenant.id), child));
		}
	}

	tracing::info!(count = created.len(), "tenants seeded");
	Ok(created)
}

/// Assigns each role on each tenant to users in round-robin order.
///
/// Walks every root's subtree depth-first; for each (tenant, role) pair the
/// next user becomes a delegate on the tenant's grants for that role's
/// operations. Grants missing for a pair (pre-provisioning data) are created
/// on the fly.
#[tracing::instrument(skip(tenants, permissions, users))]
pub async fn seed_permissions(
	tenants: &TenantRepository,
	permissions: &PermissionRepository,
	users: &[UserId],
) -> Result<(), DbError> {
	if users.is_empty() {
		tracing::info!("no users to seed permissions for");
		return Ok(());
	}
	tracing::info!("seeding permissions");

	let all = tenants.list_tenants().await?;
	let mut children: HashMap<Option<TenantId>, Vec<TenantId>> = HashMap::new();
	for tenant in &all {
		children.entry(tenant.parent).or_default().push(tenant.id);
	}

	// Depth-first from the roots, matching creation order.
	let mut order = Vec::new();
	let mut stack: Vec<TenantId> = children
		.get(&None)
		.cloned()
		.unwrap_or_default()
		.into_iter()
		.rev()
		.collect();
	while let Some(tenant) = stack.pop() {
		order.push(tenant);
		if let Some(kids) = children.get(&Some(tenant)) {
			stack.extend(kids.iter().rev().copied());
		}
	}

	let mut user_index = 0usize;
	for tenant in order {
		for role in SeedRole::all() {
			let user = users[user_index % users.len()];
			user_index += 1;

			for operation in role.operations() {
				let grant = match permissions.get_grant_for(&tenant, *operation).await? {
					Some(grant) => grant,
					None => permissions.create_grant(&tenant, *operation).await?,
				};
				permissions.add_delegate(&grant.id, &user).await?;
			}
		}
	}

	tracing::info!("permissions seeded");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_tenancy_test_pool;
	use trellis_tenancy::GrantFilter;

	fn demo_tree() -> Vec<TenantSeed> {
		vec![TenantSeed::branch(
			"Root",
			vec![
				TenantSeed::branch("RegionA", vec![TenantSeed::leaf("OfficeA1")]),
				TenantSeed::leaf("RegionB"),
			],
		)]
	}

	#[tokio::test]
	async fn seeds_hierarchy_parents_first() {
		let pool = create_tenancy_test_pool().await;
		let repo = TenantRepository::new(pool);

		let created = seed_tenants(&repo, &demo_tree()).await.unwrap();
		assert_eq!(created.len(), 4);

		let root = repo.get_tenant(&created[0]).await.unwrap().unwrap();
		assert_eq!(root.title, "Root");
		assert!(root.is_root());

		let region = repo.get_tenant(&created[1]).await.unwrap().unwrap();
		assert_eq!(region.title, "RegionA");
		assert_eq!(region.parent, Some(root.id));

		let office = repo.get_tenant(&created[2]).await.unwrap().unwrap();
		assert_eq!(office.parent, Some(region.id));
	}

	#[tokio::test]
	async fn roles_map_to_operation_bundles() {
		assert_eq!(SeedRole::ViewOnly.operations(), &[Operation::Read]);
		assert_eq!(SeedRole::Admin.operations().len(), 4);
		assert_eq!(SeedRole::all().len(), 4);
	}

	#[tokio::test]
	async fn assigns_delegates_round_robin() {
		let pool = create_tenancy_test_pool().await;
		let tenants = TenantRepository::new(pool.clone());
		let permissions = PermissionRepository::new(pool);

		let created = seed_tenants(&tenants, &demo_tree()).await.unwrap();
		let users: Vec<UserId> = (0..3).map(|_| UserId::generate()).collect();
		seed_permissions(&tenants, &permissions, &users).await.unwrap();

		// First dealt role is Admin on the root, going to the first user.
		let root_delete = permissions
			.get_grant_for(&created[0], Operation::Delete)
			.await
			.unwrap()
			.unwrap();
		assert!(root_delete.has_delegate(&users[0]));

		// Every tenant ends up with read delegates.
		for tenant in &created {
			let reads = permissions
				.grants_matching(
					&GrantFilter::new()
						.for_tenant(*tenant)
						.for_operation(Operation::Read),
				)
				.await
				.unwrap();
			assert_eq!(reads.len(), 1);
			assert!(!reads[0].delegates.is_empty());
		}
	}

	#[tokio::test]
	async fn empty_user_list_is_a_no_op() {
		let pool = create_tenancy_test_pool().await;
		let tenants = TenantRepository::new(pool.clone());
		let permissions = PermissionRepository::new(pool);

		seed_tenants(&tenants, &demo_tree()).await.unwrap();
		seed_permissions(&tenants, &permissions, &[]).await.unwrap();
	}
}
