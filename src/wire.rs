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

//! The envelope schema.
//!
//! A [`Bundle`] is the outer record written to and read from bytes: all
//! interning tables flushed as parallel lists (position = id − 1), the
//! box list, and the root box id. Ids of 0 denote "absent" everywhere and
//! round-trip as such.
//!
//! The serde derives give every record a JSON projection for inspection
//! and tests; the compact binary form lives in [`crate::codec`].

use derive_more::From;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outer record collecting everything one serialization produced.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Bundle {
	/// Transformer GUIDs, position = id − 1.
	pub transformer_guids: Vec<Uuid>,
	/// Type GUIDs, position = id − 1.
	pub type_guids: Vec<Uuid>,
	/// Interned strings, position = id − 1.
	pub strings: Vec<String>,
	/// Member layouts of storable user types.
	pub storable_type_metadata: Vec<StorableTypeLayout>,
	/// Recursive type descriptors.
	pub type_metadata: Vec<TypeMetadata>,
	/// Shapes shared by array payloads.
	pub array_metadata: Vec<ArrayMetadata>,
	/// One box per reachable object, position = id − 1.
	pub boxes: Vec<WireBox>,
	/// Non-zero index into `boxes`.
	pub root_box_id: u32,
}

/// A recursive type descriptor.
///
/// For a plain type only `type_id` and `transformer_id` are meaningful.
/// A constructed generic stores the unconstructed definition as
/// `type_id` and its arguments in declaration order; an array stores the
/// distinguished array pseudo-type and exactly one element argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
	pub type_id: u32,
	pub generic_argument_metadata_ids: Vec<u32>,
	/// 0 until the type's own transformer is known; backfilled when an
	/// instance is encountered.
	pub transformer_id: u32,
}

/// The wire form of a storable user type's member layout.
///
/// The GUID is stored through the string table in canonical hyphenated
/// lowercase form. `member_name_string_ids` holds only the type's own
/// members; ancestors contribute theirs through `parent_layout_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorableTypeLayout {
	pub type_guid_string_id: u32,
	pub parent_layout_id: u32,
	pub member_name_string_ids: Vec<u32>,
}

/// Shape of an array value: rank, per-dimension lengths and lower
/// bounds. An empty `lower_bounds` means all dimensions start at 0.
/// Interned on the full tuple so coincident shapes share one record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayMetadata {
	pub rank: u32,
	pub lengths: Vec<u32>,
	pub lower_bounds: Vec<u32>,
}

impl ArrayMetadata {
	/// The number of elements the shape describes.
	pub fn element_count(&self) -> u64 {
		self.lengths.iter().map(|&l| l as u64).product()
	}
}

/// The wire record for one reachable object.
///
/// The box id is implicit: boxes are stored in id order. A missing
/// payload occurs only in bundles cut short by cancellation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireBox {
	pub type_metadata_id: u32,
	pub payload: Option<BoxPayload>,
}

/// Exactly one payload per filled box.
#[derive(Clone, Debug, PartialEq, From, Serialize, Deserialize)]
pub enum BoxPayload {
	Scalar(ScalarPayload),
	Repeated(RepeatedPayload),
	Record(RecordPayload),
}

/// A single scalar value. Encoders pick the most compact applicable
/// slot: non-negative integers go unsigned, negative ones zigzag; the
/// plain signed slot is decoded for compatibility but never produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScalarPayload {
	Unsigned(u64),
	Signed(i64),
	ZigZag(i64),
	Float(f32),
	Double(f64),
	Bytes(Vec<u8>),
}

/// The values of an array or container box, plus the optional shape and
/// comparer references ordered containers carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepeatedPayload {
	pub values: RepeatedValues,
	/// 0 when the container has no array shape.
	pub array_metadata_id: u32,
	/// 0 when the container carries no comparer.
	pub comparer_box_id: u32,
	/// 0 when the container carries no comparer.
	pub comparer_type_metadata_id: u32,
}

impl RepeatedPayload {
	/// A payload with values only, no shape and no comparer.
	pub fn plain(values: RepeatedValues) -> Self {
		Self {
			values,
			array_metadata_id: 0,
			comparer_box_id: 0,
			comparer_type_metadata_id: 0,
		}
	}

	/// A payload whose values follow an interned array shape.
	pub fn shaped(values: RepeatedValues, array_metadata_id: u32) -> Self {
		Self {
			values,
			array_metadata_id,
			comparer_box_id: 0,
			comparer_type_metadata_id: 0,
		}
	}
}

/// Typed bulk slots for repeated values. Box ids and string ids are
/// indirections; the numeric slots hold element values inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RepeatedValues {
	Bools(Vec<bool>),
	Bytes(Vec<u8>),
	Ints(Vec<i32>),
	Longs(Vec<i64>),
	ULongs(Vec<u64>),
	Floats(Vec<f32>),
	Doubles(Vec<f64>),
	BoxIds(Vec<u32>),
	StringIds(Vec<u32>),
}

impl RepeatedValues {
	/// The number of elements in the slot.
	pub fn len(&self) -> usize {
		match self {
			Self::Bools(v) => v.len(),
			Self::Bytes(v) => v.len(),
			Self::Ints(v) => v.len(),
			Self::Longs(v) => v.len(),
			Self::ULongs(v) => v.len(),
			Self::Floats(v) => v.len(),
			Self::Doubles(v) => v.len(),
			Self::BoxIds(v) => v.len(),
			Self::StringIds(v) => v.len(),
		}
	}

	/// Whether the slot holds no elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Member values of a storable user record, parallel to the flattened
/// member-name list of the referenced layout chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
	pub storable_type_metadata_id: u32,
	pub value_box_ids: Vec<u32>,
}
