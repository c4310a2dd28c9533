// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Explicit per-call request context.
//!
//! The engine has no ambient session object: every entry point takes the
//! caller identity and a cancellation token as explicit parameters, carried
//! together in a [`RequestContext`]. The invoking layer builds one per
//! incoming request and threads its cancellation into every store round trip.

use tokio_util::sync::CancellationToken;
use trellis_tenancy_core::{Result, TenancyError, UserId};

/// Caller identity plus cancellation, passed explicitly to every engine call.
#[derive(Debug, Clone)]
pub struct RequestContext {
	identity: Option<UserId>,
	cancel: CancellationToken,
}

impl RequestContext {
	/// Creates a context for an authenticated caller.
	pub fn new(identity: UserId) -> Self {
		Self {
			identity: Some(identity),
			cancel: CancellationToken::new(),
		}
	}

	/// Creates a context with no authenticated identity. Every operation
	/// denies or returns empty for such a context, before any store access.
	pub fn anonymous() -> Self {
		Self {
			identity: None,
			cancel: CancellationToken::new(),
		}
	}

	/// Builder: attach the caller's cancellation token so an abandoned
	/// request stops in-flight resolution work.
	pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	/// The caller identity, if authenticated.
	pub fn identity(&self) -> Option<&UserId> {
		self.identity.as_ref()
	}

	/// The cancellation token governing this call.
	pub fn cancel_token(&self) -> &CancellationToken {
		&self.cancel
	}

	/// Fails with [`TenancyError::Cancelled`] once the caller has cancelled.
	/// Checked before every store round trip so cancellation propagates
	/// instead of a partial result being returned as if it were complete.
	pub(crate) fn checkpoint(&self) -> Result<()> {
		if self.cancel.is_cancelled() {
			return Err(TenancyError::Cancelled);
		}
		Ok(())
	}
}
