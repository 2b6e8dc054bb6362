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

use std::cell::{Ref, RefCell};

use uuid::Uuid;

use crate::error::Error;
use crate::mapper::Mapper;
use crate::meta_type::{AnyValue, HasShape, ListMarker, MetaType, Shape};
use crate::transform::{Obj, Transformer};
use crate::wire::{BoxPayload, RepeatedPayload, RepeatedValues, WireBox};

/// A list of boxed objects of any serializable type.
///
/// Elements are stored as box ids, so a list can hold user records,
/// other lists, scalars, the null reference, or itself. Interior
/// mutability is what lets the deserializer fill a list after every
/// shell exists, which is how list cycles survive.
#[derive(Default)]
pub struct ObjList {
	items: RefCell<Vec<Option<Obj>>>,
}

impl ObjList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a list from its items.
	pub fn from_items(items: Vec<Option<Obj>>) -> Self {
		Self {
			items: RefCell::new(items),
		}
	}

	/// Appends an item; `None` is the null reference.
	pub fn push(&self, item: Option<Obj>) {
		self.items.borrow_mut().push(item);
	}

	/// The item at `index`, or `None` past the end.
	pub fn get(&self, index: usize) -> Option<Option<Obj>> {
		self.items.borrow().get(index).cloned()
	}

	/// Borrows the items.
	pub fn items(&self) -> Ref<'_, Vec<Option<Obj>>> {
		self.items.borrow()
	}

	/// Number of items.
	pub fn len(&self) -> usize {
		self.items.borrow().len()
	}

	/// Whether the list holds no items.
	pub fn is_empty(&self) -> bool {
		self.items.borrow().is_empty()
	}
}

impl HasShape for ObjList {
	fn shape() -> Shape {
		Shape::Generic {
			definition: MetaType::new::<ListMarker>(),
			args: vec![MetaType::new::<AnyValue>()],
		}
	}
}

/// Serializes [`ObjList`] as a box-id sequence.
pub struct ListTransformer;

impl Transformer for ListTransformer {
	fn guid(&self) -> Uuid {
		super::XFORM_LIST
	}

	fn create_box(&self, _object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
		mapper.partial_box(MetaType::new::<ObjList>(), super::XFORM_LIST)
	}

	fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
		let list = object
			.downcast_ref::<ObjList>()
			.ok_or(Error::TypeMismatch("ObjList"))?;
		let items = list.items().clone();
		let mut ids = Vec::with_capacity(items.len());
		for item in items {
			ids.push(mapper.box_id_for(item)?);
		}
		Ok(BoxPayload::Repeated(RepeatedPayload::plain(
			RepeatedValues::BoxIds(ids),
		)))
	}

	fn to_object(&self, _wire_box: &WireBox, _mapper: &mut Mapper) -> Result<Option<Obj>, Error> {
		Ok(Some(std::rc::Rc::new(ObjList::new()) as Obj))
	}

	fn fill_from_box(
		&self,
		object: &Obj,
		wire_box: &WireBox,
		mapper: &mut Mapper,
	) -> Result<(), Error> {
		let list = object
			.downcast_ref::<ObjList>()
			.ok_or(Error::TypeMismatch("ObjList"))?;
		let Some(BoxPayload::Repeated(repeated)) = &wire_box.payload else {
			return Err(Error::UnexpectedPayload("ObjList"));
		};
		let RepeatedValues::BoxIds(ids) = &repeated.values else {
			return Err(Error::UnexpectedPayload("ObjList"));
		};
		for &id in ids {
			let item = mapper.object_for(id)?;
			list.push(item);
		}
		Ok(())
	}
}
