// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for tenancy resolution.
//!
//! Not-found is deliberately absent: a missing tenant or grant is a dead end
//! for traversal (empty result), never an error. A failing or timed-out store
//! call, by contrast, fails the whole resolution — a partial visibility answer
//! would be observably different from "I don't know" and callers must be able
//! to tell the two apart.

use thiserror::Error;

/// Errors that can occur while resolving permissions.
#[derive(Debug, Error)]
pub enum TenancyError {
	/// The tenant or permission store was unreachable or failed mid-call.
	/// Never downgraded to a deny or an empty result.
	#[error("store unavailable: {0}")]
	Store(#[source] Box<dyn std::error::Error + Send + Sync>),

	/// The caller cancelled the resolution before it completed.
	#[error("resolution cancelled")]
	Cancelled,
}

impl TenancyError {
	/// Wraps an underlying store failure.
	pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		TenancyError::Store(Box::new(err))
	}
}

/// Convenience alias used throughout the tenancy crates.
pub type Result<T> = std::result::Result<T, TenancyError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn store_error_preserves_source() {
		let err = TenancyError::store(std::io::Error::new(
			std::io::ErrorKind::ConnectionRefused,
			"db down",
		));
		assert!(err.to_string().contains("store unavailable"));
		assert!(std::error::Error::source(&err).is_some());
	}

	#[test]
	fn cancelled_has_stable_message() {
		assert_eq!(TenancyError::Cancelled.to_string(), "resolution cancelled");
	}
}
