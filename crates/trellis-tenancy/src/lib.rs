// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchical permission-resolution engine for Trellis.
//!
//! Tenants form a tree; operation-level grants scoped to a tenant node
//! implicitly propagate to that node's descendants. This crate answers two
//! questions under concurrent load:
//!
//! 1. Can this identity perform operation X against tenant T?
//! 2. Which tenants are visible to this identity?
//!
//! The second is used to scope every list/read query in the surrounding
//! application.
//!
//! # Architecture
//!
//! Data flows one direction, no component calls back "up":
//!
//! ```text
//! TenancyEngine (facade) -> resolver -> tree walker + GrantStore -> TenantStore
//! ```
//!
//! - [`store`]: the abstract data-access boundary ([`TenantStore`],
//!   [`GrantStore`]) the engine consumes; the engine only ever reads
//! - [`tree`]: ancestor/descendant traversal with structural cycle protection
//! - [`resolver`]: combines traversal with grant lookups
//! - [`facade`]: the [`TenancyEngine`] decision API the rest of the system
//!   consumes, including the injectable global-admin [`OverridePredicate`]
//! - [`context`]: explicit per-call identity and cancellation
//!   ([`RequestContext`]) — there is no ambient session object
//!
//! Every call is a stateless, idempotent read computed fresh from current
//! store contents. There is deliberately no cache layer, so a grant change is
//! visible to the very next authorization check.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trellis_tenancy::{OverridePredicate, RequestContext, TenancyEngine};
//! use trellis_tenancy_core::{Operation, TenantId, UserId};
//! # async fn example(
//! #     tenants: Arc<dyn trellis_tenancy::TenantStore>,
//! #     grants: Arc<dyn trellis_tenancy::GrantStore>,
//! #     tenant: TenantId,
//! # ) -> trellis_tenancy_core::Result<()> {
//! let engine = TenancyEngine::new(tenants, grants, OverridePredicate::none());
//! let ctx = RequestContext::new(UserId::generate());
//!
//! let decision = engine.authorize(&ctx, tenant, Operation::Update).await?;
//! if decision.is_allowed() {
//!     // proceed with the update
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod facade;
pub mod resolver;
pub mod store;
pub mod testing;
pub mod tree;

pub use config::TenancyConfig;
pub use context::RequestContext;
pub use facade::{Decision, OverridePredicate, ScopeFilter, TenancyEngine};
pub use store::{GrantFilter, GrantStore, TenantStore};
pub use tree::{ancestor_chain, descendant_set};

// Re-exported so consumers of the engine rarely need a direct dependency on
// the core crate.
pub use trellis_tenancy_core::{
	Operation, Permission, PermissionId, Result, Tenant, TenancyError, TenantId, UserId,
};
