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

//! Append-only interning of values to small dense ids.
//!
//! Every table a bundle carries (strings, type GUIDs, transformer
//! GUIDs, array metadata) is an [`Interner`] flushed into a parallel
//! list in insertion order. Ids start at 1 and are never reused or reassigned;
//! id 0 is reserved throughout the crate for "absent".

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::Error;

/// Insertion-ordered mapping between values and 1-based ids.
#[derive(Debug, Clone, Default)]
pub struct Interner<T> {
	map: HashMap<T, u32>,
	values: Vec<T>,
}

impl<T> Interner<T>
where
	T: Clone + Eq + Hash,
{
	/// Creates an empty interner.
	pub fn new() -> Self {
		Self {
			map: HashMap::new(),
			values: Vec::new(),
		}
	}

	/// Rebuilds an interner from a previously flushed table.
	///
	/// Ids correspond to the 1-based positions of `values`.
	pub fn from_values(values: Vec<T>) -> Self {
		let map = values
			.iter()
			.enumerate()
			.map(|(i, v)| (v.clone(), i as u32 + 1))
			.collect();
		Self { map, values }
	}

	/// Returns the id of `value`, appending it first if it is new.
	pub fn intern(&mut self, value: T) -> u32 {
		if let Some(&id) = self.map.get(&value) {
			return id;
		}
		self.values.push(value.clone());
		let id = self.values.len() as u32;
		self.map.insert(value, id);
		id
	}

	/// Returns the id of `value` if it has been interned.
	pub fn get(&self, value: &T) -> Option<u32> {
		self.map.get(value).copied()
	}

	/// Resolves an id. Total over `[1, len]`; 0 and out-of-range ids are
	/// errors.
	pub fn resolve(&self, id: u32, table: &'static str) -> Result<&T, Error> {
		self.try_resolve(id).ok_or(Error::IdOutOfRange {
			table,
			id,
			len: self.values.len(),
		})
	}

	/// Resolves an id, returning `None` for 0 and out-of-range ids.
	pub fn try_resolve(&self, id: u32) -> Option<&T> {
		if id == 0 {
			return None;
		}
		self.values.get(id as usize - 1)
	}

	/// The interned values in insertion order.
	pub fn values(&self) -> &[T] {
		&self.values
	}

	/// Number of interned values.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether nothing has been interned yet.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}
