// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Trellis tenancy system.
//!
//! This crate provides the shared domain types for hierarchical multi-tenant
//! authorization. It is consumed by the resolution engine (`trellis-tenancy`)
//! and the database layer (`trellis-server-db`) and performs no I/O itself.
//!
//! # Overview
//!
//! - **ID newtypes**: [`TenantId`], [`UserId`], [`PermissionId`] — type-safe
//!   UUID wrappers preventing accidental mixing
//! - [`Operation`]: the closed set of four operation kinds (`C`/`R`/`U`/`D`)
//! - [`Tenant`]: a node in the organizational hierarchy with an optional
//!   parent edge
//! - [`Permission`]: a grant binding an operation and a tenant scope to a set
//!   of delegate identities
//! - [`TenancyError`]: the failure taxonomy shared by every resolution entry
//!   point

pub mod error;
pub mod permission;
pub mod tenant;
pub mod types;

pub use error::{Result, TenancyError};
pub use permission::Permission;
pub use tenant::Tenant;
pub use types::{Operation, PermissionId, TenantId, UserId};
