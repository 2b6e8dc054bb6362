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

//! Identity-preserving serialization of object graphs into compact,
//! self-describing binary bundles.
//!
//! A graph of typed objects, including cycles, shared references,
//! multi-dimensional arrays, container types, and user records with
//! named members, is walked breadth-first into a [`Bundle`]: one box per
//! reachable object, with strings, GUIDs, type metadata and array
//! shapes deduplicated into interned tables. Deserialization rebuilds
//! an isomorphic graph in two phases, so two references that were equal
//! going in are equal coming out, cycles included.
//!
//! Types are made serializable through the [`Registry`]: built-in
//! scalars and sequences are preinstalled, user records are declared
//! with a [`StorableBuilder`]. The [`Mapper`] drives one serialization
//! or one deserialization; [`to_bytes`] and [`from_bytes`] are the
//! shorthand against the process-wide registry.
//!
//! ```
//! use graph_bundle::{from_bytes, to_bytes, Obj};
//! use std::rc::Rc;
//!
//! let root: Obj = Rc::new(42i64);
//! let (bytes, _info) = to_bytes(root).unwrap();
//! let (root, _info) = from_bytes(&bytes).unwrap();
//! assert_eq!(root.unwrap().downcast_ref::<i64>(), Some(&42));
//! ```

pub mod cancel;
pub mod codec;
mod error;
pub mod interner;
pub mod mapper;
pub mod meta_type;
pub mod ndarray;
pub mod registry;
pub mod transform;
pub mod transformers;
pub mod wire;

pub use self::cancel::CancelToken;
pub use self::codec::{bundle_from_bytes, bundle_to_bytes, DecodeError};
pub use self::error::{BoxedError, Error};
pub use self::interner::Interner;
pub use self::mapper::{DeserializeInfo, Mapper, SerializeInfo};
pub use self::meta_type::{AnyValue, ArrayMarker, HasShape, ListMarker, MetaType, Shape};
pub use self::ndarray::{NdArray, ShapeError};
pub use self::registry::{static_registry, Registry, StorableBuilder, StorableInfo};
pub use self::transform::{runtime_type_of, Obj, Transformer};
pub use self::transformers::ObjList;
pub use self::wire::{
	ArrayMetadata, BoxPayload, Bundle, RecordPayload, RepeatedPayload, RepeatedValues,
	ScalarPayload, StorableTypeLayout, TypeMetadata, WireBox,
};

/// Serializes a graph against the process-wide registry.
pub fn to_bytes(root: Obj) -> Result<(Vec<u8>, SerializeInfo), Error> {
	let mut mapper = Mapper::new(static_registry());
	let (bundle, info) = mapper.to_bundle(root)?;
	Ok((bundle_to_bytes(&bundle), info))
}

/// Deserializes a graph against the process-wide registry.
pub fn from_bytes(bytes: &[u8]) -> Result<(Option<Obj>, DeserializeInfo), Error> {
	let bundle = bundle_from_bytes(bytes)?;
	let mut mapper = Mapper::new(static_registry());
	mapper.from_bundle(&bundle)
}
