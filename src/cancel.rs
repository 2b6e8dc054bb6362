// Copyright 2019
//     by  Centrality Investments Ltd.
//     and Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for long-running walks.
///
/// The mapper checks the token once per drained queue item during
/// serialization and once per box during each deserialization phase.
/// Cancellation is a status, not an error: serialization returns the
/// bundle built so far, deserialization returns no root.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	flag: Arc<AtomicBool>,
}

impl CancelToken {
	/// Creates a token in the not-cancelled state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests cancellation. May be called from another thread.
	pub fn cancel(&self) {
		self.flag.store(true, Ordering::Relaxed);
	}

	/// Whether cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.flag.load(Ordering::Relaxed)
	}
}
