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

//! Array transformers.
//!
//! A whole primitive sequence becomes one box: the element values live
//! inline in a typed repeated slot and the shape is an interned array
//! metadata record, so equal shapes are stored once per bundle. String
//! sequences store string-table ids instead of inline values, which
//! makes repeated strings intern away. None of these types can hold
//! references, so reconstruction happens entirely in `to_object`.

use std::rc::Rc;

use uuid::Uuid;

use crate::error::Error;
use crate::mapper::Mapper;
use crate::meta_type::MetaType;
use crate::ndarray::NdArray;
use crate::transform::{Obj, Transformer};
use crate::wire::{ArrayMetadata, BoxPayload, RepeatedPayload, RepeatedValues, WireBox};

fn rank1(len: usize) -> ArrayMetadata {
	ArrayMetadata {
		rank: 1,
		lengths: vec![len as u32],
		lower_bounds: Vec::new(),
	}
}

macro_rules! vec_transformer {
	($name:ident, $elem:ty, $guid:path, $variant:ident) => {
		pub struct $name;

		impl Transformer for $name {
			fn guid(&self) -> Uuid {
				$guid
			}

			fn create_box(&self, _object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
				mapper.partial_box(MetaType::new::<Vec<$elem>>(), $guid)
			}

			fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
				let values = object
					.downcast_ref::<Vec<$elem>>()
					.ok_or(Error::TypeMismatch(stringify!(Vec<$elem>)))?;
				let metadata_id = mapper.array_metadata_id_for(rank1(values.len()));
				Ok(BoxPayload::Repeated(RepeatedPayload::shaped(
					RepeatedValues::$variant(values.clone()),
					metadata_id,
				)))
			}

			fn to_object(
				&self,
				wire_box: &WireBox,
				_mapper: &mut Mapper,
			) -> Result<Option<Obj>, Error> {
				let Some(BoxPayload::Repeated(repeated)) = &wire_box.payload else {
					return Err(Error::UnexpectedPayload(stringify!(Vec<$elem>)));
				};
				let RepeatedValues::$variant(values) = &repeated.values else {
					return Err(Error::UnexpectedPayload(stringify!(Vec<$elem>)));
				};
				Ok(Some(Rc::new(values.clone()) as Obj))
			}
		}
	};
}

vec_transformer!(BoolVecTransformer, bool, super::XFORM_VEC_BOOL, Bools);
vec_transformer!(ByteVecTransformer, u8, super::XFORM_VEC_U8, Bytes);
vec_transformer!(IntVecTransformer, i32, super::XFORM_VEC_I32, Ints);
vec_transformer!(LongVecTransformer, i64, super::XFORM_VEC_I64, Longs);
vec_transformer!(ULongVecTransformer, u64, super::XFORM_VEC_U64, ULongs);
vec_transformer!(FloatVecTransformer, f32, super::XFORM_VEC_F32, Floats);
vec_transformer!(DoubleVecTransformer, f64, super::XFORM_VEC_F64, Doubles);

/// String sequences go through the string table: the payload holds one
/// string id per element.
pub struct StringVecTransformer;

impl Transformer for StringVecTransformer {
	fn guid(&self) -> Uuid {
		super::XFORM_VEC_STRING
	}

	fn create_box(&self, _object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
		mapper.partial_box(MetaType::new::<Vec<String>>(), super::XFORM_VEC_STRING)
	}

	fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
		let values = object
			.downcast_ref::<Vec<String>>()
			.ok_or(Error::TypeMismatch("Vec<String>"))?;
		let ids = values
			.iter()
			.map(|value| mapper.intern_string(value))
			.collect::<Vec<_>>();
		let metadata_id = mapper.array_metadata_id_for(rank1(values.len()));
		Ok(BoxPayload::Repeated(RepeatedPayload::shaped(
			RepeatedValues::StringIds(ids),
			metadata_id,
		)))
	}

	fn to_object(&self, wire_box: &WireBox, mapper: &mut Mapper) -> Result<Option<Obj>, Error> {
		let Some(BoxPayload::Repeated(repeated)) = &wire_box.payload else {
			return Err(Error::UnexpectedPayload("Vec<String>"));
		};
		let RepeatedValues::StringIds(ids) = &repeated.values else {
			return Err(Error::UnexpectedPayload("Vec<String>"));
		};
		let values = ids
			.iter()
			.map(|&id| mapper.string_for(id).map(str::to_owned))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Some(Rc::new(values) as Obj))
	}
}

macro_rules! nd_transformer {
	($name:ident, $elem:ty, $guid:path, $variant:ident) => {
		pub struct $name;

		impl Transformer for $name {
			fn guid(&self) -> Uuid {
				$guid
			}

			fn create_box(&self, _object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
				mapper.partial_box(MetaType::new::<NdArray<$elem>>(), $guid)
			}

			fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
				let array = object
					.downcast_ref::<NdArray<$elem>>()
					.ok_or(Error::TypeMismatch(stringify!(NdArray<$elem>)))?;
				let metadata_id = mapper.array_metadata_id_for(ArrayMetadata {
					rank: array.rank() as u32,
					lengths: array.lengths().to_vec(),
					lower_bounds: array.lower_bounds().to_vec(),
				});
				Ok(BoxPayload::Repeated(RepeatedPayload::shaped(
					RepeatedValues::$variant(array.data().to_vec()),
					metadata_id,
				)))
			}

			fn to_object(
				&self,
				wire_box: &WireBox,
				mapper: &mut Mapper,
			) -> Result<Option<Obj>, Error> {
				let Some(BoxPayload::Repeated(repeated)) = &wire_box.payload else {
					return Err(Error::UnexpectedPayload(stringify!(NdArray<$elem>)));
				};
				let RepeatedValues::$variant(values) = &repeated.values else {
					return Err(Error::UnexpectedPayload(stringify!(NdArray<$elem>)));
				};
				let metadata = mapper
					.array_metadata_for(repeated.array_metadata_id)?
					.clone();
				let array = NdArray::from_shape(
					metadata.lengths,
					metadata.lower_bounds,
					values.clone(),
				)?;
				Ok(Some(Rc::new(array) as Obj))
			}
		}
	};
}

nd_transformer!(IntArrayTransformer, i32, super::XFORM_ND_I32, Ints);
nd_transformer!(LongArrayTransformer, i64, super::XFORM_ND_I64, Longs);
nd_transformer!(DoubleArrayTransformer, f64, super::XFORM_ND_F64, Doubles);
