// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Foundational type definitions for the tenancy system.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for the three entity
//!   kinds ([`TenantId`], [`UserId`], [`PermissionId`]), preventing accidental
//!   mixing of identifier spaces
//! - [`Operation`]: the closed enumeration of operation kinds a grant can be
//!   scoped to
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(TenantId, "Unique identifier for a tenant node.");
define_id_type!(UserId, "Unique identifier for an identity (user/operator).");
define_id_type!(PermissionId, "Unique identifier for a permission grant.");

// =============================================================================
// Operations
// =============================================================================

/// The closed set of operation kinds a grant can cover.
///
/// There are exactly four; any other token is rejected at the boundary via
/// [`FromStr`]. The single-letter wire form matches the stored grant rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
	/// Create records under a tenant scope.
	#[serde(rename = "C")]
	Create,
	/// Read records under a tenant scope.
	#[serde(rename = "R")]
	Read,
	/// Update records under a tenant scope.
	#[serde(rename = "U")]
	Update,
	/// Delete records under a tenant scope.
	#[serde(rename = "D")]
	Delete,
}

impl Operation {
	/// Returns all four operation kinds.
	pub fn all() -> &'static [Operation] {
		&[
			Operation::Create,
			Operation::Read,
			Operation::Update,
			Operation::Delete,
		]
	}

	/// The single-letter code stored in grant rows.
	pub fn code(&self) -> &'static str {
		match self {
			Operation::Create => "C",
			Operation::Read => "R",
			Operation::Update => "U",
			Operation::Delete => "D",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Error returned when parsing an unknown operation token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
	type Err = UnknownOperation;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"C" => Ok(Operation::Create),
			"R" => Ok(Operation::Read),
			"U" => Ok(Operation::Update),
			"D" => Ok(Operation::Delete),
			other => Err(UnknownOperation(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn tenant_id_roundtrips() {
			let uuid = Uuid::new_v4();
			let id = TenantId::new(uuid);
			assert_eq!(id.into_inner(), uuid);
			assert_eq!(Uuid::from(id), uuid);
		}

		#[test]
		fn tenant_id_generates_unique() {
			assert_ne!(TenantId::generate(), TenantId::generate());
		}

		#[test]
		fn user_id_serializes_as_uuid() {
			let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
			let id = UserId::new(uuid);
			let json = serde_json::to_string(&id).unwrap();
			assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
		}

		#[test]
		fn ids_do_not_mix() {
			// Compile-time property; the display forms still agree with the UUID.
			let uuid = Uuid::new_v4();
			assert_eq!(TenantId::new(uuid).to_string(), uuid.to_string());
			assert_eq!(PermissionId::new(uuid).to_string(), uuid.to_string());
		}

		proptest! {
				#[test]
				fn tenant_id_roundtrip_any_uuid(
						a: u128
				) {
						let uuid = Uuid::from_u128(a);
						let id = TenantId::new(uuid);
						prop_assert_eq!(id.into_inner(), uuid);
						prop_assert_eq!(Uuid::from(id), uuid);
				}

				#[test]
				fn user_id_serde_roundtrip(
						a: u128
				) {
						let uuid = Uuid::from_u128(a);
						let id = UserId::new(uuid);
						let json = serde_json::to_string(&id).unwrap();
						let deserialized: UserId = serde_json::from_str(&json).unwrap();
						prop_assert_eq!(id, deserialized);
				}
		}
	}

	mod operation {
		use super::*;

		#[test]
		fn all_returns_four_kinds() {
			assert_eq!(Operation::all().len(), 4);
		}

		#[test]
		fn displays_single_letter_codes() {
			assert_eq!(Operation::Create.to_string(), "C");
			assert_eq!(Operation::Read.to_string(), "R");
			assert_eq!(Operation::Update.to_string(), "U");
			assert_eq!(Operation::Delete.to_string(), "D");
		}

		#[test]
		fn parses_known_codes() {
			assert_eq!("C".parse::<Operation>().unwrap(), Operation::Create);
			assert_eq!("R".parse::<Operation>().unwrap(), Operation::Read);
			assert_eq!("U".parse::<Operation>().unwrap(), Operation::Update);
			assert_eq!("D".parse::<Operation>().unwrap(), Operation::Delete);
		}

		#[test]
		fn rejects_unknown_tokens() {
			assert!("X".parse::<Operation>().is_err());
			assert!("read".parse::<Operation>().is_err());
			assert!("".parse::<Operation>().is_err());
			assert!("CR".parse::<Operation>().is_err());
		}

		#[test]
		fn serializes_as_code() {
			let json = serde_json::to_string(&Operation::Read).unwrap();
			assert_eq!(json, "\"R\"");
		}

		#[test]
		fn deserialization_rejects_unknown() {
			assert!(serde_json::from_str::<Operation>("\"Z\"").is_err());
		}

		proptest! {
				#[test]
				fn parse_rejects_everything_but_the_four_codes(
						s in "\\PC*"
				) {
						let parsed = s.parse::<Operation>();
						match s.as_str() {
								"C" | "R" | "U" | "D" => prop_assert!(parsed.is_ok()),
								_ => prop_assert!(parsed.is_err()),
						}
				}

				#[test]
				fn display_parse_roundtrip(
						idx in 0usize..4
				) {
						let op = Operation::all()[idx];
						prop_assert_eq!(op.to_string().parse::<Operation>().unwrap(), op);
				}
		}
	}
}
