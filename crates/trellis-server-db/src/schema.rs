// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Table definitions for the tenancy schema.
//!
//! Three tables: `tenants` (the tree, parent edge as a nullable column),
//! `permissions` (one row per grant), and `permission_delegates` (the
//! many-to-many delegate set). `UNIQUE(tenant_id, operation)` enforces the
//! one-grant-per-pair rule at the write side; resolution never relies on it.
//!
//! The `parent_id` and `tenant_id` references are deliberately not enforced
//! as foreign keys: deleting a tenant orphans grants scoped to it and leaves
//! child edges dangling, and the resolution engine treats both as dead ends.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

pub async fn create_tenants_table(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS tenants (
			id TEXT PRIMARY KEY,
			title TEXT NOT NULL UNIQUE,
			parent_id TEXT,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_tenants_parent ON tenants(parent_id)")
		.execute(pool)
		.await?;

	Ok(())
}

pub async fn create_permissions_table(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS permissions (
			id TEXT PRIMARY KEY,
			tenant_id TEXT NOT NULL,
			operation TEXT NOT NULL,
			created_at TEXT NOT NULL,
			UNIQUE(tenant_id, operation)
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_permissions_tenant ON permissions(tenant_id)")
		.execute(pool)
		.await?;

	Ok(())
}

pub async fn create_permission_delegates_table(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS permission_delegates (
			permission_id TEXT NOT NULL,
			user_id TEXT NOT NULL,
			created_at TEXT NOT NULL,
			UNIQUE(permission_id, user_id)
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_permission_delegates_user ON permission_delegates(user_id)",
	)
	.execute(pool)
	.await?;

	Ok(())
}

/// Creates every tenancy table. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DbError> {
	create_tenants_table(pool).await?;
	create_permissions_table(pool).await?;
	create_permission_delegates_table(pool).await?;
	tracing::debug!("tenancy schema initialized");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn init_schema_is_idempotent() {
		let pool = SqlitePool::connect(":memory:").await.unwrap();
		init_schema(&pool).await.unwrap();
		init_schema(&pool).await.unwrap();
	}

	#[tokio::test]
	async fn grant_uniqueness_is_enforced() {
		let pool = SqlitePool::connect(":memory:").await.unwrap();
		init_schema(&pool).await.unwrap();

		let insert = "INSERT INTO permissions (id, tenant_id, operation, created_at) VALUES (?, ?, ?, ?)";
		sqlx::query(insert)
			.bind("p1")
			.bind("t1")
			.bind("R")
			.bind("2025-01-01T00:00:00Z")
			.execute(&pool)
			.await
			.unwrap();

		let duplicate = sqlx::query(insert)
			.bind("p2")
			.bind("t1")
			.bind("R")
			.bind("2025-01-01T00:00:00Z")
			.execute(&pool)
			.await;
		assert!(duplicate.is_err());
	}
}
