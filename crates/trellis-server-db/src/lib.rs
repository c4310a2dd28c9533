// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Trellis tenancy engine.
//!
//! Two repositories back the engine's store traits:
//!
//! - [`TenantRepository`] implements `TenantStore`; creating a tenant also
//!   auto-provisions one empty grant per operation inside the same
//!   transaction, so the write side of permission management is always an
//!   update to an existing row
//! - [`PermissionRepository`] implements `GrantStore`; per-pair uniqueness is
//!   enforced by a `UNIQUE(tenant_id, operation)` constraint rather than by
//!   application code
//!
//! Parent links carry no foreign-key constraint: deleting a tenant leaves its
//! children (and any grants scoped to it) in place as dead ends the read side
//! already tolerates.
//!
//! IDs are UUIDs stored as TEXT; timestamps are RFC3339 TEXT.

pub mod error;
pub mod permission;
pub mod pool;
pub mod schema;
pub mod seed;
pub mod tenant;
pub mod testing;

pub use error::{DbError, Result};
pub use permission::PermissionRepository;
pub use pool::create_pool;
pub use schema::init_schema;
pub use seed::{seed_permissions, seed_tenants, SeedRole, TenantSeed};
pub use tenant::TenantRepository;
