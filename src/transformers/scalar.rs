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

//! Scalar transformers.
//!
//! Scalars cannot participate in cycles, so each transformer does all of
//! its reconstruction in `to_object` and keeps the default no-op
//! `fill_from_box`. Integers pick the most compact slot: unsigned for
//! non-negative values, zigzag otherwise. Strings store a string-table
//! id; GUIDs use the bytes slot.

use std::rc::Rc;

use uuid::Uuid;

use crate::codec::DecodeError;
use crate::error::Error;
use crate::mapper::Mapper;
use crate::meta_type::MetaType;
use crate::transform::{Obj, Transformer};
use crate::wire::{BoxPayload, ScalarPayload, WireBox};

fn unsigned_value(scalar: &ScalarPayload, ty: &'static str) -> Result<u64, Error> {
	match scalar {
		ScalarPayload::Unsigned(v) => Ok(*v),
		ScalarPayload::Signed(v) | ScalarPayload::ZigZag(v) if *v >= 0 => Ok(*v as u64),
		_ => Err(DecodeError::ScalarRange(ty).into()),
	}
}

fn signed_value(scalar: &ScalarPayload, ty: &'static str) -> Result<i64, Error> {
	match scalar {
		ScalarPayload::Unsigned(v) => {
			i64::try_from(*v).map_err(|_| DecodeError::ScalarRange(ty).into())
		}
		ScalarPayload::Signed(v) | ScalarPayload::ZigZag(v) => Ok(*v),
		_ => Err(DecodeError::ScalarRange(ty).into()),
	}
}

macro_rules! scalar_transformer {
	($name:ident, $ty:ty, $guid:path, encode: $encode:expr, decode: $decode:expr $(,)?) => {
		pub struct $name;

		impl Transformer for $name {
			fn guid(&self) -> Uuid {
				$guid
			}

			fn create_box(&self, _object: &Obj, mapper: &mut Mapper) -> Result<WireBox, Error> {
				mapper.partial_box(MetaType::new::<$ty>(), $guid)
			}

			fn fill_box(&self, object: &Obj, mapper: &mut Mapper) -> Result<BoxPayload, Error> {
				let value = object
					.downcast_ref::<$ty>()
					.ok_or(Error::TypeMismatch(stringify!($ty)))?;
				let encode: fn(&$ty, &mut Mapper) -> ScalarPayload = $encode;
				Ok(BoxPayload::Scalar(encode(value, mapper)))
			}

			fn to_object(
				&self,
				wire_box: &WireBox,
				mapper: &mut Mapper,
			) -> Result<Option<Obj>, Error> {
				let Some(BoxPayload::Scalar(scalar)) = &wire_box.payload else {
					return Err(Error::UnexpectedPayload(stringify!($ty)));
				};
				let decode: fn(&ScalarPayload, &mut Mapper) -> Result<$ty, Error> = $decode;
				Ok(Some(Rc::new(decode(scalar, mapper)?) as Obj))
			}
		}
	};
}

macro_rules! unsigned_transformer {
	($name:ident, $ty:ty, $guid:path) => {
		scalar_transformer!(
			$name,
			$ty,
			$guid,
			encode: |value, _| ScalarPayload::Unsigned(u64::from(*value)),
			decode: |scalar, _| {
				let value = unsigned_value(scalar, stringify!($ty))?;
				<$ty>::try_from(value)
					.map_err(|_| DecodeError::ScalarRange(stringify!($ty)).into())
			},
		);
	};
}

macro_rules! signed_transformer {
	($name:ident, $ty:ty, $guid:path) => {
		scalar_transformer!(
			$name,
			$ty,
			$guid,
			encode: |value, _| {
				let value = i64::from(*value);
				if value >= 0 {
					ScalarPayload::Unsigned(value as u64)
				} else {
					ScalarPayload::ZigZag(value)
				}
			},
			decode: |scalar, _| {
				let value = signed_value(scalar, stringify!($ty))?;
				<$ty>::try_from(value)
					.map_err(|_| DecodeError::ScalarRange(stringify!($ty)).into())
			},
		);
	};
}

scalar_transformer!(
	BoolTransformer,
	bool,
	super::XFORM_BOOL,
	encode: |value, _| ScalarPayload::Unsigned(u64::from(*value)),
	decode: |scalar, _| match unsigned_value(scalar, "bool")? {
		0 => Ok(false),
		1 => Ok(true),
		_ => Err(DecodeError::ScalarRange("bool").into()),
	},
);

unsigned_transformer!(U8Transformer, u8, super::XFORM_U8);
unsigned_transformer!(U16Transformer, u16, super::XFORM_U16);
unsigned_transformer!(U32Transformer, u32, super::XFORM_U32);
unsigned_transformer!(U64Transformer, u64, super::XFORM_U64);

signed_transformer!(I8Transformer, i8, super::XFORM_I8);
signed_transformer!(I16Transformer, i16, super::XFORM_I16);
signed_transformer!(I32Transformer, i32, super::XFORM_I32);
signed_transformer!(I64Transformer, i64, super::XFORM_I64);

scalar_transformer!(
	F32Transformer,
	f32,
	super::XFORM_F32,
	encode: |value, _| ScalarPayload::Float(*value),
	decode: |scalar, _| match scalar {
		ScalarPayload::Float(v) => Ok(*v),
		_ => Err(DecodeError::ScalarRange("f32").into()),
	},
);

scalar_transformer!(
	F64Transformer,
	f64,
	super::XFORM_F64,
	encode: |value, _| ScalarPayload::Double(*value),
	decode: |scalar, _| match scalar {
		ScalarPayload::Double(v) => Ok(*v),
		_ => Err(DecodeError::ScalarRange("f64").into()),
	},
);

scalar_transformer!(
	CharTransformer,
	char,
	super::XFORM_CHAR,
	encode: |value, _| ScalarPayload::Unsigned(u64::from(u32::from(*value))),
	decode: |scalar, _| {
		let value = unsigned_value(scalar, "char")?;
		u32::try_from(value)
			.ok()
			.and_then(char::from_u32)
			.ok_or_else(|| DecodeError::ScalarRange("char").into())
	},
);

scalar_transformer!(
	StringTransformer,
	String,
	super::XFORM_STRING,
	encode: |value, mapper| ScalarPayload::Unsigned(u64::from(mapper.intern_string(value))),
	decode: |scalar, mapper| {
		let id = u32::try_from(unsigned_value(scalar, "string id")?)
			.map_err(|_| Error::from(DecodeError::ScalarRange("string id")))?;
		Ok(mapper.string_for(id)?.to_owned())
	},
);

scalar_transformer!(
	GuidTransformer,
	Uuid,
	super::XFORM_GUID,
	encode: |value, _| ScalarPayload::Bytes(value.as_bytes().to_vec()),
	decode: |scalar, _| match scalar {
		ScalarPayload::Bytes(bytes) => {
			let bytes: [u8; 16] = bytes
				.as_slice()
				.try_into()
				.map_err(|_| Error::from(DecodeError::ScalarRange("guid")))?;
			Ok(Uuid::from_bytes(bytes))
		}
		_ => Err(DecodeError::ScalarRange("guid").into()),
	},
);
