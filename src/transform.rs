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

use std::any::{Any, TypeId as AnyTypeId};
use std::rc::Rc;

use uuid::Uuid;

use crate::error::Error;
use crate::mapper::Mapper;
use crate::wire::{BoxPayload, WireBox};

/// A shared handle to an object in the graph being mapped.
///
/// Identity is the `Rc` allocation; a null reference is `None` at the
/// `Option<Obj>` level.
pub type Obj = Rc<dyn Any>;

/// The concrete runtime type behind an object handle.
pub fn runtime_type_of(object: &Obj) -> AnyTypeId {
	(**object).type_id()
}

/// Per-type strategy that produces and consumes boxes for objects of
/// that type.
///
/// Serialization splits into [`create_box`](Self::create_box) (type
/// metadata only, no child walking) and [`fill_box`](Self::fill_box)
/// (payload, children enqueued via [`Mapper::box_id_for`]).
/// Deserialization splits into [`to_object`](Self::to_object) (a shell
/// with identity and intrinsic values) and
/// [`fill_from_box`](Self::fill_from_box) (references resolved via
/// [`Mapper::object_for`]). A type that cannot participate in cycles may
/// do all reconstruction work in `to_object` and keep the default no-op
/// `fill_from_box`.
pub trait Transformer: Send + Sync {
	/// Stable identity of this transformer, registered once.
	fn guid(&self) -> Uuid;

	/// Returns a partial box: type metadata id set, payload empty.
	fn create_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error>;

	/// Produces the payload for `object`, enqueueing children by id.
	fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error>;

	/// Builds the shell for a box, or `None` if the runtime type cannot
	/// be resolved.
	fn to_object(&self, wire_box: &WireBox, mapper: &mut Mapper) -> Result<Option<Obj>, Error>;

	/// Populates the shell's references from the box.
	fn fill_from_box(
		&self,
		object: &Obj,
		wire_box: &WireBox,
		mapper: &mut Mapper,
	) -> Result<(), Error> {
		let _ = (object, wire_box, mapper);
		Ok(())
	}
}
