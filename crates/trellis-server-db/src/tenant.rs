// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant repository for database operations.
//!
//! Owns the tenant lifecycle the resolution engine deliberately does not:
//! create, update (including reparenting), and delete. Creating a tenant
//! auto-provisions one empty grant per operation kind so delegate management
//! never has to create grant rows first.
//!
//! Deleting a tenant orphans grants scoped to it and leaves child tenants'
//! parent edges dangling; the engine treats both as dead ends.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use trellis_tenancy::TenantStore;
use trellis_tenancy_core::{
	Operation, PermissionId, Result as TenancyResult, TenancyError, Tenant, TenantId,
};

use crate::error::DbError;

/// Repository for tenant database operations.
///
/// All IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct TenantRepository {
	pool: SqlitePool,
}

impl TenantRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new tenant and auto-provision its four empty grants.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate title).
	#[tracing::instrument(skip(self, tenant), fields(tenant_id = %tenant.id, title = %tenant.title))]
	pub async fn create_tenant(&self, tenant: &Tenant) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO tenants (id, title, parent_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(tenant.id.to_string())
		.bind(&tenant.title)
		.bind(tenant.parent.map(|p| p.to_string()))
		.bind(tenant.created_at.to_rfc3339())
		.bind(tenant.updated_at.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		// One empty grant per operation kind, ready for delegates.
		let now = Utc::now().to_rfc3339();
		for operation in Operation::all() {
			sqlx::query(
				r#"
				INSERT INTO permissions (id, tenant_id, operation, created_at)
				VALUES (?, ?, ?, ?)
				"#,
			)
			.bind(PermissionId::generate().to_string())
			.bind(tenant.id.to_string())
			.bind(operation.code())
			.bind(&now)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		tracing::debug!(tenant_id = %tenant.id, "tenant created with provisioned grants");
		Ok(())
	}

	/// Get a tenant by ID.
	///
	/// # Returns
	/// `None` if no tenant exists with this ID.
	#[tracing::instrument(skip(self), fields(tenant_id = %id))]
	pub async fn get_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, title, parent_id, created_at, updated_at
			FROM tenants
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_tenant(&r)).transpose()
	}

	/// Get the direct children of a tenant.
	#[tracing::instrument(skip(self), fields(tenant_id = %id))]
	pub async fn get_children(&self, id: &TenantId) -> Result<Vec<Tenant>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, title, parent_id, created_at, updated_at
			FROM tenants
			WHERE parent_id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_tenant(r)).collect()
	}

	/// List every tenant, roots first by creation time.
	#[tracing::instrument(skip(self))]
	pub async fn list_tenants(&self) -> Result<Vec<Tenant>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, title, parent_id, created_at, updated_at
			FROM tenants
			ORDER BY parent_id IS NOT NULL, created_at
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_tenant(r)).collect()
	}

	/// Update a tenant's title and parent edge.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the tenant does not exist.
	#[tracing::instrument(skip(self, tenant), fields(tenant_id = %tenant.id))]
	pub async fn update_tenant(&self, tenant: &Tenant) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query(
			r#"
			UPDATE tenants
			SET title = ?, parent_id = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&tenant.title)
		.bind(tenant.parent.map(|p| p.to_string()))
		.bind(now)
		.bind(tenant.id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("tenant {}", tenant.id)));
		}

		tracing::debug!(tenant_id = %tenant.id, "tenant updated");
		Ok(())
	}

	/// Delete a tenant. Grants scoped to it are left orphaned and child
	/// parent edges dangling, by design.
	///
	/// # Returns
	/// `true` if a row was deleted.
	#[tracing::instrument(skip(self), fields(tenant_id = %id))]
	pub async fn delete_tenant(&self, id: &TenantId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::debug!(tenant_id = %id, "tenant deleted");
		}
		Ok(deleted)
	}

	fn row_to_tenant(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Tenant, DbError> {
		let id_str: String = row.get("id");
		let parent_str: Option<String> = row.get("parent_id");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		let id = Uuid::parse_str(&id_str)
			.map_err(|e| DbError::Internal(format!("Invalid tenant ID: {e}")))?;
		let parent = parent_str
			.map(|p| {
				Uuid::parse_str(&p)
					.map(TenantId::new)
					.map_err(|e| DbError::Internal(format!("Invalid parent ID: {e}")))
			})
			.transpose()?;

		Ok(Tenant {
			id: TenantId::new(id),
			title: row.get("title"),
			parent,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
			updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
				.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl TenantStore for TenantRepository {
	async fn find_tenant(&self, id: &TenantId) -> TenancyResult<Option<Tenant>> {
		self.get_tenant(id).await.map_err(TenancyError::store)
	}

	async fn find_children(&self, parent: &TenantId) -> TenancyResult<Vec<Tenant>> {
		self.get_children(parent).await.map_err(TenancyError::store)
	}
}
