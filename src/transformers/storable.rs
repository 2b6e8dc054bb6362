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

//! The transformer for storable user records.
//!
//! One transformer serves every registered storable type; the registry's
//! descriptors carry the per-type knowledge. Serialization walks the
//! flattened member list and stores one box id per member, parallel to
//! the layout chain's member names. Deserialization constructs the shell
//! through the registered constructor and sets members by
//! `(declaring GUID, name)` lookup, so renamed-away members are skipped
//! rather than fatal.

use uuid::Uuid;

use crate::error::Error;
use crate::mapper::Mapper;
use crate::transform::{runtime_type_of, Obj, Transformer};
use crate::wire::{BoxPayload, RecordPayload, WireBox};

pub struct StorableTransformer;

impl Transformer for StorableTransformer {
	fn guid(&self) -> Uuid {
		super::XFORM_STORABLE
	}

	fn create_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
		let any_id = runtime_type_of(object);
		let meta = mapper
			.meta_of(any_id)
			.ok_or_else(|| Error::UnserializableType(format!("{any_id:?}")))?;
		mapper.partial_box(meta, super::XFORM_STORABLE)
	}

	fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
		let info = mapper
			.storable_info(runtime_type_of(object))
			.ok_or_else(|| Error::UnserializableType(format!("{:?}", runtime_type_of(object))))?;
		let storable_type_metadata_id = mapper.layout_id_for(info.guid)?;
		let mut value_box_ids = Vec::with_capacity(info.members.len());
		for member in &info.members {
			let child = (member.get)(&**object);
			value_box_ids.push(mapper.box_id_for(child)?);
		}
		Ok(BoxPayload::Record(RecordPayload {
			storable_type_metadata_id,
			value_box_ids,
		}))
	}

	fn to_object(&self, wire_box: &WireBox, mapper: &mut Mapper) -> Result<Option<Obj>, Error> {
		let Some(meta) = mapper.type_for(wire_box.type_metadata_id)? else {
			return Ok(None);
		};
		let Some(info) = mapper.storable_info(meta.any_id()) else {
			return Ok(None);
		};
		let object = (info.constructor)().map_err(|source| Error::ConstructorFailed {
			type_name: info.type_name.to_string(),
			source,
		})?;
		Ok(Some(object))
	}

	fn fill_from_box(
		&self,
		object: &Obj,
		wire_box: &WireBox,
		mapper: &mut Mapper,
	) -> Result<(), Error> {
		let Some(BoxPayload::Record(record)) = &wire_box.payload else {
			return Err(Error::UnexpectedPayload("storable record"));
		};
		let info = mapper
			.storable_info(runtime_type_of(object))
			.ok_or_else(|| Error::UnserializableType(format!("{:?}", runtime_type_of(object))))?;
		let names = mapper.flattened_member_names(record.storable_type_metadata_id)?;
		if names.len() != record.value_box_ids.len() {
			log::warn!(
				"`{}`: layout names {} members but the record stores {}",
				info.type_name,
				names.len(),
				record.value_box_ids.len(),
			);
		}
		for ((declaring_guid, name), &value_id) in names.iter().zip(&record.value_box_ids) {
			let Some(member) = info.member_for(*declaring_guid, name) else {
				log::trace!("`{}` has no member `{name}`, skipping", info.type_name);
				continue;
			};
			let set = member.set.clone();
			let child = mapper.object_for(value_id)?;
			set(&**object, child);
		}
		Ok(())
	}
}
