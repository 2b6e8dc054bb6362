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

//! The built-in transformer suite: scalars, primitive sequences,
//! multi-dimensional arrays, object lists and storable user records.
//!
//! Every built-in type and transformer carries a fixed GUID derived from
//! one namespace constant, so bundles are stable across processes.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Error;
use crate::meta_type::{AnyValue, ArrayMarker, ListMarker, MetaType};
use crate::ndarray::NdArray;
use crate::registry::Registry;

pub mod array;
pub mod list;
pub mod scalar;
pub mod storable;

pub use self::list::ObjList;

const BUILTIN_NAMESPACE: u128 = 0x4742444c_b0c5_4d21_8364_771498000000;

const fn builtin_guid(tag: u32) -> Uuid {
	Uuid::from_u128(BUILTIN_NAMESPACE | tag as u128)
}

pub(crate) const TYPE_BOOL: Uuid = builtin_guid(0x01);
pub(crate) const TYPE_U8: Uuid = builtin_guid(0x02);
pub(crate) const TYPE_I8: Uuid = builtin_guid(0x03);
pub(crate) const TYPE_U16: Uuid = builtin_guid(0x04);
pub(crate) const TYPE_I16: Uuid = builtin_guid(0x05);
pub(crate) const TYPE_U32: Uuid = builtin_guid(0x06);
pub(crate) const TYPE_I32: Uuid = builtin_guid(0x07);
pub(crate) const TYPE_U64: Uuid = builtin_guid(0x08);
pub(crate) const TYPE_I64: Uuid = builtin_guid(0x09);
pub(crate) const TYPE_F32: Uuid = builtin_guid(0x0a);
pub(crate) const TYPE_F64: Uuid = builtin_guid(0x0b);
pub(crate) const TYPE_CHAR: Uuid = builtin_guid(0x0c);
pub(crate) const TYPE_STRING: Uuid = builtin_guid(0x0d);
pub(crate) const TYPE_GUID: Uuid = builtin_guid(0x0e);

pub(crate) const TYPE_ARRAY: Uuid = builtin_guid(0x20);
pub(crate) const TYPE_LIST: Uuid = builtin_guid(0x21);
pub(crate) const TYPE_ANY: Uuid = builtin_guid(0x22);

pub(crate) const TYPE_VEC_BOOL: Uuid = builtin_guid(0x41);
pub(crate) const TYPE_VEC_U8: Uuid = builtin_guid(0x42);
pub(crate) const TYPE_VEC_I32: Uuid = builtin_guid(0x43);
pub(crate) const TYPE_VEC_I64: Uuid = builtin_guid(0x44);
pub(crate) const TYPE_VEC_U64: Uuid = builtin_guid(0x45);
pub(crate) const TYPE_VEC_F32: Uuid = builtin_guid(0x46);
pub(crate) const TYPE_VEC_F64: Uuid = builtin_guid(0x47);
pub(crate) const TYPE_VEC_STRING: Uuid = builtin_guid(0x48);
pub(crate) const TYPE_ND_I32: Uuid = builtin_guid(0x49);
pub(crate) const TYPE_ND_I64: Uuid = builtin_guid(0x4a);
pub(crate) const TYPE_ND_F64: Uuid = builtin_guid(0x4b);
pub(crate) const TYPE_OBJ_LIST: Uuid = builtin_guid(0x4c);

pub(crate) const XFORM_BOOL: Uuid = builtin_guid(0x1001);
pub(crate) const XFORM_U8: Uuid = builtin_guid(0x1002);
pub(crate) const XFORM_I8: Uuid = builtin_guid(0x1003);
pub(crate) const XFORM_U16: Uuid = builtin_guid(0x1004);
pub(crate) const XFORM_I16: Uuid = builtin_guid(0x1005);
pub(crate) const XFORM_U32: Uuid = builtin_guid(0x1006);
pub(crate) const XFORM_I32: Uuid = builtin_guid(0x1007);
pub(crate) const XFORM_U64: Uuid = builtin_guid(0x1008);
pub(crate) const XFORM_I64: Uuid = builtin_guid(0x1009);
pub(crate) const XFORM_F32: Uuid = builtin_guid(0x100a);
pub(crate) const XFORM_F64: Uuid = builtin_guid(0x100b);
pub(crate) const XFORM_CHAR: Uuid = builtin_guid(0x100c);
pub(crate) const XFORM_STRING: Uuid = builtin_guid(0x100d);
pub(crate) const XFORM_GUID: Uuid = builtin_guid(0x100e);

pub(crate) const XFORM_VEC_BOOL: Uuid = builtin_guid(0x1041);
pub(crate) const XFORM_VEC_U8: Uuid = builtin_guid(0x1042);
pub(crate) const XFORM_VEC_I32: Uuid = builtin_guid(0x1043);
pub(crate) const XFORM_VEC_I64: Uuid = builtin_guid(0x1044);
pub(crate) const XFORM_VEC_U64: Uuid = builtin_guid(0x1045);
pub(crate) const XFORM_VEC_F32: Uuid = builtin_guid(0x1046);
pub(crate) const XFORM_VEC_F64: Uuid = builtin_guid(0x1047);
pub(crate) const XFORM_VEC_STRING: Uuid = builtin_guid(0x1048);
pub(crate) const XFORM_ND_I32: Uuid = builtin_guid(0x1049);
pub(crate) const XFORM_ND_I64: Uuid = builtin_guid(0x104a);
pub(crate) const XFORM_ND_F64: Uuid = builtin_guid(0x104b);
pub(crate) const XFORM_LIST: Uuid = builtin_guid(0x104c);
pub(crate) const XFORM_STORABLE: Uuid = builtin_guid(0x104d);

/// Registers the built-in suite. Component types come first so that
/// constructed types can compute their fingerprints.
pub(crate) fn install(registry: &mut Registry) -> Result<(), Error> {
	use self::array::*;
	use self::list::ListTransformer;
	use self::scalar::*;
	use self::storable::StorableTransformer;

	registry.register_transformer(Arc::new(StorableTransformer))?;

	registry.register_type(MetaType::new::<ArrayMarker>(), TYPE_ARRAY, None)?;
	registry.register_type(MetaType::new::<ListMarker>(), TYPE_LIST, None)?;
	registry.register_type(MetaType::new::<AnyValue>(), TYPE_ANY, None)?;

	registry.register_type(MetaType::new::<bool>(), TYPE_BOOL, Some(Arc::new(BoolTransformer)))?;
	registry.register_type(MetaType::new::<u8>(), TYPE_U8, Some(Arc::new(U8Transformer)))?;
	registry.register_type(MetaType::new::<i8>(), TYPE_I8, Some(Arc::new(I8Transformer)))?;
	registry.register_type(MetaType::new::<u16>(), TYPE_U16, Some(Arc::new(U16Transformer)))?;
	registry.register_type(MetaType::new::<i16>(), TYPE_I16, Some(Arc::new(I16Transformer)))?;
	registry.register_type(MetaType::new::<u32>(), TYPE_U32, Some(Arc::new(U32Transformer)))?;
	registry.register_type(MetaType::new::<i32>(), TYPE_I32, Some(Arc::new(I32Transformer)))?;
	registry.register_type(MetaType::new::<u64>(), TYPE_U64, Some(Arc::new(U64Transformer)))?;
	registry.register_type(MetaType::new::<i64>(), TYPE_I64, Some(Arc::new(I64Transformer)))?;
	registry.register_type(MetaType::new::<f32>(), TYPE_F32, Some(Arc::new(F32Transformer)))?;
	registry.register_type(MetaType::new::<f64>(), TYPE_F64, Some(Arc::new(F64Transformer)))?;
	registry.register_type(MetaType::new::<char>(), TYPE_CHAR, Some(Arc::new(CharTransformer)))?;
	registry.register_type(
		MetaType::new::<String>(),
		TYPE_STRING,
		Some(Arc::new(StringTransformer)),
	)?;
	registry.register_type(MetaType::new::<Uuid>(), TYPE_GUID, Some(Arc::new(GuidTransformer)))?;

	registry.register_type(
		MetaType::new::<Vec<bool>>(),
		TYPE_VEC_BOOL,
		Some(Arc::new(BoolVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<u8>>(),
		TYPE_VEC_U8,
		Some(Arc::new(ByteVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<i32>>(),
		TYPE_VEC_I32,
		Some(Arc::new(IntVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<i64>>(),
		TYPE_VEC_I64,
		Some(Arc::new(LongVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<u64>>(),
		TYPE_VEC_U64,
		Some(Arc::new(ULongVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<f32>>(),
		TYPE_VEC_F32,
		Some(Arc::new(FloatVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<f64>>(),
		TYPE_VEC_F64,
		Some(Arc::new(DoubleVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<Vec<String>>(),
		TYPE_VEC_STRING,
		Some(Arc::new(StringVecTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<NdArray<i32>>(),
		TYPE_ND_I32,
		Some(Arc::new(IntArrayTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<NdArray<i64>>(),
		TYPE_ND_I64,
		Some(Arc::new(LongArrayTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<NdArray<f64>>(),
		TYPE_ND_F64,
		Some(Arc::new(DoubleArrayTransformer)),
	)?;
	registry.register_type(
		MetaType::new::<ObjList>(),
		TYPE_OBJ_LIST,
		Some(Arc::new(ListTransformer)),
	)?;

	Ok(())
}
