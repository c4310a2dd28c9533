// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::schema::init_schema;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

/// An in-memory pool with the full tenancy schema applied.
pub async fn create_tenancy_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	init_schema(&pool).await.unwrap();
	pool
}
