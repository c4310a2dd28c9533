// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine configuration.
//!
//! The only tunable is the override identity: the single global admin,
//! designated out-of-band by deployment configuration. Absent or
//! misconfigured, nobody bypasses checks — the engine fails closed.

use serde::{Deserialize, Serialize};
use trellis_tenancy_core::UserId;

use crate::facade::OverridePredicate;

/// Deserializable engine configuration.
///
/// ```toml
/// admin = "550e8400-e29b-41d4-a716-446655440000"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenancyConfig {
	/// The override/global-admin identity, if one is designated.
	#[serde(default)]
	pub admin: Option<UserId>,
}

impl TenancyConfig {
	/// Parses configuration from TOML.
	pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(raw)
	}

	/// Builds the override capability for [`TenancyEngine`](crate::TenancyEngine).
	pub fn override_predicate(&self) -> OverridePredicate {
		match self.admin {
			Some(admin) => OverridePredicate::user(admin),
			None => OverridePredicate::none(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_admin_identity() {
		let config =
			TenancyConfig::from_toml("admin = \"550e8400-e29b-41d4-a716-446655440000\"").unwrap();
		let admin = config.admin.expect("admin set");
		assert!(config.override_predicate().is_override(&admin));
	}

	#[test]
	fn empty_config_fails_closed() {
		let config = TenancyConfig::from_toml("").unwrap();
		assert_eq!(config, TenancyConfig::default());
		assert!(!config
			.override_predicate()
			.is_override(&UserId::generate()));
	}

	#[test]
	fn rejects_malformed_identity() {
		assert!(TenancyConfig::from_toml("admin = \"not-a-uuid\"").is_err());
	}
}
