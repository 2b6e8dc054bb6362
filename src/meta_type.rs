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

//! Compile-time descriptions of runtime types.
//!
//! There is no runtime reflection to lean on, so every serializable type
//! declares how it decomposes: plain, a generic definition applied to
//! argument types, or an array over an element type. The mapper encodes
//! that decomposition into the bundle's type metadata and the registry
//! reverses it through structural [`Fingerprint`]s.

use std::any::{type_name, TypeId as AnyTypeId};
use std::hash::{Hash, Hasher};

use uuid::Uuid;

/// Implementors declare their decomposition for type-metadata encoding.
///
/// The default shape is [`Shape::Plain`], which is right for every type
/// that is neither a constructed generic nor an array.
pub trait HasShape: 'static {
	/// Returns the shape of `Self`.
	fn shape() -> Shape {
		Shape::Plain
	}
}

/// A handle to a runtime type: its identity, its name and its shape.
#[derive(Clone, Copy, Debug)]
pub struct MetaType {
	id: AnyTypeId,
	name: &'static str,
	shape: fn() -> Shape,
}

impl MetaType {
	/// Creates the handle for a compile-time type.
	pub fn new<T>() -> Self
	where
		T: HasShape,
	{
		Self {
			id: AnyTypeId::of::<T>(),
			name: type_name::<T>(),
			shape: T::shape,
		}
	}

	/// The runtime identity of the described type.
	pub fn any_id(&self) -> AnyTypeId {
		self.id
	}

	/// The Rust path name of the described type, for diagnostics only.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// The declared decomposition of the described type.
	pub fn shape(&self) -> Shape {
		(self.shape)()
	}
}

impl PartialEq for MetaType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for MetaType {}

impl Hash for MetaType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

/// The decomposition of a runtime type.
#[derive(Clone, Debug)]
pub enum Shape {
	/// A type without encodable internal structure.
	Plain,
	/// A constructed generic type: the unconstructed definition plus the
	/// argument types in declaration order.
	Generic {
		definition: MetaType,
		args: Vec<MetaType>,
	},
	/// An array type over an element type. Rank and bounds are properties
	/// of individual values, not of the type.
	Array { element: MetaType },
}

/// Structural identity of a type in terms of registered GUIDs.
///
/// Fingerprints are how wire-side type metadata resolves back to a
/// registered runtime type: the registry indexes every registration by
/// its fingerprint. A fingerprint mentioning an unregistered GUID simply
/// never matches, which is what makes unknown types non-fatal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Fingerprint {
	Plain(Uuid),
	Generic(Uuid, Vec<Fingerprint>),
	Array(Box<Fingerprint>),
}

/// The unconstructed list definition, standing in for every constructed
/// list type inside type metadata.
pub struct ListMarker;

/// The distinguished array pseudo-type. Array type metadata uses its GUID
/// as the base type id.
pub struct ArrayMarker;

/// Argument marker for containers that hold arbitrary boxed objects.
pub struct AnyValue;

impl HasShape for ListMarker {}
impl HasShape for ArrayMarker {}
impl HasShape for AnyValue {}

macro_rules! impl_plain_shape {
	( $( $ty:ty ),* $(,)? ) => {
		$(
			impl HasShape for $ty {}
		)*
	};
}

impl_plain_shape!(bool, char, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, String, Uuid);

impl<T> HasShape for Vec<T>
where
	T: HasShape,
{
	fn shape() -> Shape {
		Shape::Array {
			element: MetaType::new::<T>(),
		}
	}
}
