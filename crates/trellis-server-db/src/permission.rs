// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission repository for database operations.
//!
//! Grants are the unit of mutation: one row per (tenant, operation) pair —
//! enforced by a unique constraint — with delegates managed through the
//! `permission_delegates` join table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use trellis_tenancy::{GrantFilter, GrantStore};
use trellis_tenancy_core::{
	Operation, Permission, PermissionId, Result as TenancyResult, TenancyError, TenantId, UserId,
};

use crate::error::DbError;

/// Repository for permission grant database operations.
#[derive(Clone)]
pub struct PermissionRepository {
	pool: SqlitePool,
}

impl PermissionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new empty grant for a (tenant, operation) pair.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a grant already exists for the pair.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant, operation = %operation))]
	pub async fn create_grant(
		&self,
		tenant: &TenantId,
		operation: Operation,
	) -> Result<Permission, DbError> {
		let grant = Permission::new(*tenant, operation);
		sqlx::query(
			r#"
			INSERT INTO permissions (id, tenant_id, operation, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(grant.id.to_string())
		.bind(grant.tenant.to_string())
		.bind(grant.operation.code())
		.bind(grant.created_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| match &e {
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				DbError::Conflict(format!("grant already exists for ({tenant}, {operation})"))
			}
			_ => DbError::Sqlx(e),
		})?;

		tracing::debug!(grant_id = %grant.id, "grant created");
		Ok(grant)
	}

	/// Get a grant by ID, delegates included.
	#[tracing::instrument(skip(self), fields(grant_id = %id))]
	pub async fn get_grant(&self, id: &PermissionId) -> Result<Option<Permission>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, tenant_id, operation, created_at
			FROM permissions
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(self.hydrate(&row).await?)),
			None => Ok(None),
		}
	}

	/// Get the grant for a (tenant, operation) pair, if one exists.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant, operation = %operation))]
	pub async fn get_grant_for(
		&self,
		tenant: &TenantId,
		operation: Operation,
	) -> Result<Option<Permission>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, tenant_id, operation, created_at
			FROM permissions
			WHERE tenant_id = ? AND operation = ?
			"#,
		)
		.bind(tenant.to_string())
		.bind(operation.code())
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(self.hydrate(&row).await?)),
			None => Ok(None),
		}
	}

	/// Find every grant matching the filter, delegates included.
	///
	/// Delegate filtering goes through the join table index rather than
	/// scanning grants.
	#[tracing::instrument(skip(self, filter))]
	pub async fn grants_matching(&self, filter: &GrantFilter) -> Result<Vec<Permission>, DbError> {
		let mut sql = String::from(
			"SELECT DISTINCT p.id, p.tenant_id, p.operation, p.created_at FROM permissions p",
		);
		if filter.delegate.is_some() {
			sql.push_str(" JOIN permission_delegates d ON d.permission_id = p.id");
		}

		let mut clauses = Vec::new();
		if filter.tenant.is_some() {
			clauses.push("p.tenant_id = ?");
		}
		if filter.operation.is_some() {
			clauses.push("p.operation = ?");
		}
		if filter.delegate.is_some() {
			clauses.push("d.user_id = ?");
		}
		if !clauses.is_empty() {
			sql.push_str(" WHERE ");
			sql.push_str(&clauses.join(" AND "));
		}

		let mut query = sqlx::query(&sql);
		if let Some(tenant) = &filter.tenant {
			query = query.bind(tenant.to_string());
		}
		if let Some(operation) = &filter.operation {
			query = query.bind(operation.code());
		}
		if let Some(delegate) = &filter.delegate {
			query = query.bind(delegate.to_string());
		}

		let rows = query.fetch_all(&self.pool).await?;
		let mut grants = Vec::with_capacity(rows.len());
		for row in &rows {
			grants.push(self.hydrate(row).await?);
		}
		Ok(grants)
	}

	/// Add a delegate to a grant. Adding an existing delegate is a no-op.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the grant does not exist.
	#[tracing::instrument(skip(self), fields(grant_id = %grant, user_id = %user))]
	pub async fn add_delegate(&self, grant: &PermissionId, user: &UserId) -> Result<(), DbError> {
		let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM permissions WHERE id = ?")
			.bind(grant.to_string())
			.fetch_optional(&self.pool)
			.await?;
		if exists.is_none() {
			return Err(DbError::NotFound(format!("grant {grant}")));
		}

		sqlx::query(
			r#"
			INSERT OR IGNORE INTO permission_delegates (permission_id, user_id, created_at)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(grant.to_string())
		.bind(user.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(grant_id = %grant, user_id = %user, "delegate added");
		Ok(())
	}

	/// Remove a delegate from a grant.
	///
	/// # Returns
	/// `true` if the delegate was present.
	#[tracing::instrument(skip(self), fields(grant_id = %grant, user_id = %user))]
	pub async fn remove_delegate(
		&self,
		grant: &PermissionId,
		user: &UserId,
	) -> Result<bool, DbError> {
		let result =
			sqlx::query("DELETE FROM permission_delegates WHERE permission_id = ? AND user_id = ?")
				.bind(grant.to_string())
				.bind(user.to_string())
				.execute(&self.pool)
				.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete a grant and its delegate rows.
	///
	/// # Returns
	/// `true` if a grant row was deleted.
	#[tracing::instrument(skip(self), fields(grant_id = %id))]
	pub async fn delete_grant(&self, id: &PermissionId) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;
		sqlx::query("DELETE FROM permission_delegates WHERE permission_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		let result = sqlx::query("DELETE FROM permissions WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		Ok(result.rows_affected() > 0)
	}

	async fn hydrate(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Permission, DbError> {
		let id_str: String = row.get("id");
		let tenant_str: String = row.get("tenant_id");
		let operation_str: String = row.get("operation");
		let created_at: String = row.get("created_at");

		let id = Uuid::parse_str(&id_str)
			.map_err(|e| DbError::Internal(format!("Invalid grant ID: {e}")))?;
		let tenant = Uuid::parse_str(&tenant_str)
			.map_err(|e| DbError::Internal(format!("Invalid tenant ID: {e}")))?;
		let operation = operation_str
			.parse::<Operation>()
			.map_err(|e| DbError::Internal(format!("Invalid operation: {e}")))?;

		let delegate_rows = sqlx::query(
			"SELECT user_id FROM permission_delegates WHERE permission_id = ? ORDER BY created_at",
		)
		.bind(&id_str)
		.fetch_all(&self.pool)
		.await?;
		let delegates = delegate_rows
			.iter()
			.map(|r| {
				let user_str: String = r.get("user_id");
				Uuid::parse_str(&user_str)
					.map(UserId::new)
					.map_err(|e| DbError::Internal(format!("Invalid delegate ID: {e}")))
			})
			.collect::<Result<Vec<UserId>, DbError>>()?;

		Ok(Permission {
			id: PermissionId::new(id),
			tenant: TenantId::new(tenant),
			operation,
			delegates,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl GrantStore for PermissionRepository {
	async fn find_grants(&self, filter: &GrantFilter) -> TenancyResult<Vec<Permission>> {
		self.grants_matching(filter)
			.await
			.map_err(TenancyError::store)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_tenancy_test_pool;

	async fn repo() -> PermissionRepository {
		PermissionRepository::new(create_tenancy_test_pool().await)
	}

	#[tokio::test]
	async fn create_and_get_roundtrip() {
		let repo = repo().await;
		let tenant = TenantId::generate();
		let grant = repo.create_grant(&tenant, Operation::Read).await.unwrap();

		let found = repo.get_grant(&grant.id).await.unwrap().unwrap();
		assert_eq!(found.tenant, tenant);
		assert_eq!(found.operation, Operation::Read);
		assert!(found.delegates.is_empty());
	}

	#[tokio::test]
	async fn duplicate_pair_is_a_conflict() {
		let repo = repo().await;
		let tenant = TenantId::generate();
		repo.create_grant(&tenant, Operation::Read).await.unwrap();

		assert!(matches!(
			repo.create_grant(&tenant, Operation::Read).await,
			Err(DbError::Conflict(_))
		));
		// A different operation on the same tenant is fine.
		repo.create_grant(&tenant, Operation::Update).await.unwrap();
	}

	#[tokio::test]
	async fn delegates_roundtrip() {
		let repo = repo().await;
		let grant = repo
			.create_grant(&TenantId::generate(), Operation::Read)
			.await
			.unwrap();
		let alice = UserId::generate();

		repo.add_delegate(&grant.id, &alice).await.unwrap();
		// Re-adding is a no-op, not an error.
		repo.add_delegate(&grant.id, &alice).await.unwrap();

		let found = repo.get_grant(&grant.id).await.unwrap().unwrap();
		assert_eq!(found.delegates, vec![alice]);

		assert!(repo.remove_delegate(&grant.id, &alice).await.unwrap());
		assert!(!repo.remove_delegate(&grant.id, &alice).await.unwrap());
	}

	#[tokio::test]
	async fn add_delegate_to_missing_grant_is_not_found() {
		let repo = repo().await;
		assert!(matches!(
			repo
				.add_delegate(&PermissionId::generate(), &UserId::generate())
				.await,
			Err(DbError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn filters_by_tenant_operation_and_delegate() {
		let repo = repo().await;
		let tenant_a = TenantId::generate();
		let tenant_b = TenantId::generate();
		let alice = UserId::generate();

		let read_a = repo.create_grant(&tenant_a, Operation::Read).await.unwrap();
		repo.create_grant(&tenant_a, Operation::Update).await.unwrap();
		repo.create_grant(&tenant_b, Operation::Read).await.unwrap();
		repo.add_delegate(&read_a.id, &alice).await.unwrap();

		let by_tenant = repo
			.grants_matching(&GrantFilter::new().for_tenant(tenant_a))
			.await
			.unwrap();
		assert_eq!(by_tenant.len(), 2);

		let by_operation = repo
			.grants_matching(&GrantFilter::new().for_operation(Operation::Read))
			.await
			.unwrap();
		assert_eq!(by_operation.len(), 2);

		let by_delegate = repo
			.grants_matching(&GrantFilter::new().for_delegate(alice))
			.await
			.unwrap();
		assert_eq!(by_delegate.len(), 1);
		assert_eq!(by_delegate[0].id, read_a.id);

		let combined = repo
			.grants_matching(
				&GrantFilter::new()
					.for_tenant(tenant_b)
					.for_operation(Operation::Read)
					.for_delegate(alice),
			)
			.await
			.unwrap();
		assert!(combined.is_empty());
	}

	#[tokio::test]
	async fn delete_grant_removes_delegate_rows() {
		let repo = repo().await;
		let grant = repo
			.create_grant(&TenantId::generate(), Operation::Delete)
			.await
			.unwrap();
		repo.add_delegate(&grant.id, &UserId::generate()).await.unwrap();

		assert!(repo.delete_grant(&grant.id).await.unwrap());
		assert!(!repo.delete_grant(&grant.id).await.unwrap());

		let rows: (i64,) =
			sqlx::query_as("SELECT COUNT(*) FROM permission_delegates WHERE permission_id = ?")
				.bind(grant.id.to_string())
				.fetch_one(&repo.pool)
				.await
				.unwrap();
		assert_eq!(rows.0, 0);
	}
}
