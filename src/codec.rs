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

//! The binary envelope codec.
//!
//! A mechanical layer: varints (LEB128) for id and count fields, zigzag
//! varints for signed scalars, IEEE-754 little-endian for floats, raw 16
//! bytes for GUIDs, length-prefixed UTF-8 for strings, and fixed-width
//! little-endian for bulk primitive array payloads. No mapping logic
//! lives here.

use crate::wire::{
	ArrayMetadata, BoxPayload, Bundle, RecordPayload, RepeatedPayload, RepeatedValues,
	ScalarPayload, StorableTypeLayout, TypeMetadata, WireBox,
};
use uuid::Uuid;

const MAGIC: [u8; 4] = *b"GBDL";
const VERSION: u8 = 1;

/// Structural errors raised while reading or validating an envelope.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	#[error("unexpected end of input at byte {0}")]
	UnexpectedEof(usize),
	#[error("bad magic number {0:02x?}")]
	BadMagic([u8; 4]),
	#[error("unsupported format version {0}")]
	UnsupportedVersion(u8),
	#[error("varint longer than 10 bytes at byte {0}")]
	VarintOverflow(usize),
	#[error("value {value} does not fit a 32-bit field at byte {at}")]
	U32Overflow { value: u64, at: usize },
	#[error("invalid {field} tag {value}")]
	InvalidTag { field: &'static str, value: u8 },
	#[error("invalid utf-8 in string table entry")]
	InvalidUtf8,
	#[error("{0} trailing bytes after the envelope")]
	TrailingBytes(usize),
	#[error("root box id {root} out of range ({boxes} boxes)")]
	RootOutOfRange { root: u32, boxes: usize },
	#[error("{table} id {id} out of range ({len} entries)")]
	IdOutOfRange {
		table: &'static str,
		id: u32,
		len: usize,
	},
	#[error("array metadata {0} has inconsistent rank")]
	RankMismatch(u32),
	#[error("type metadata {0} participates in a cycle")]
	MetadataCycle(u32),
	#[error("storable layout {0} participates in a cycle")]
	LayoutCycle(u32),
	#[error("string {0} does not hold a guid")]
	InvalidGuid(u32),
	#[error("scalar value does not fit `{0}`")]
	ScalarRange(&'static str),
}

struct ByteWriter {
	buf: Vec<u8>,
}

impl ByteWriter {
	fn new() -> Self {
		Self { buf: Vec::new() }
	}

	fn put_u8(&mut self, v: u8) {
		self.buf.push(v);
	}

	fn put_bytes(&mut self, v: &[u8]) {
		self.buf.extend_from_slice(v);
	}

	fn put_varint(&mut self, mut v: u64) {
		loop {
			let byte = (v & 0x7f) as u8;
			v >>= 7;
			if v == 0 {
				self.buf.push(byte);
				return;
			}
			self.buf.push(byte | 0x80);
		}
	}

	fn put_zigzag(&mut self, v: i64) {
		self.put_varint(((v << 1) ^ (v >> 63)) as u64);
	}

	fn put_len(&mut self, len: usize) {
		self.put_varint(len as u64);
	}

	fn put_guid(&mut self, guid: &Uuid) {
		self.put_bytes(guid.as_bytes());
	}

	fn put_string(&mut self, s: &str) {
		self.put_len(s.len());
		self.put_bytes(s.as_bytes());
	}
}

struct ByteReader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> ByteReader<'a> {
	fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
		if self.remaining() < n {
			return Err(DecodeError::UnexpectedEof(self.pos));
		}
		let slice = &self.buf[self.pos..self.pos + n];
		self.pos += n;
		Ok(slice)
	}

	fn u8(&mut self) -> Result<u8, DecodeError> {
		Ok(self.take(1)?[0])
	}

	fn varint(&mut self) -> Result<u64, DecodeError> {
		let start = self.pos;
		let mut value = 0u64;
		let mut shift = 0u32;
		loop {
			let byte = self.u8()?;
			if shift == 63 && byte > 1 {
				return Err(DecodeError::VarintOverflow(start));
			}
			value |= u64::from(byte & 0x7f) << shift;
			if byte & 0x80 == 0 {
				return Ok(value);
			}
			shift += 7;
			if shift > 63 {
				return Err(DecodeError::VarintOverflow(start));
			}
		}
	}

	fn varint32(&mut self) -> Result<u32, DecodeError> {
		let at = self.pos;
		let value = self.varint()?;
		u32::try_from(value).map_err(|_| DecodeError::U32Overflow { value, at })
	}

	fn zigzag(&mut self) -> Result<i64, DecodeError> {
		let raw = self.varint()?;
		Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
	}

	/// Reads an element count, bounded by the bytes left at
	/// `min_elem_size` per element.
	fn len(&mut self, min_elem_size: usize) -> Result<usize, DecodeError> {
		let at = self.pos;
		let count = self.varint()?;
		let count = usize::try_from(count).map_err(|_| DecodeError::U32Overflow {
			value: count,
			at,
		})?;
		if count.saturating_mul(min_elem_size.max(1)) > self.remaining() {
			return Err(DecodeError::UnexpectedEof(self.pos));
		}
		Ok(count)
	}

	fn guid(&mut self) -> Result<Uuid, DecodeError> {
		let bytes: [u8; 16] = self.take(16)?.try_into().expect("slice length checked");
		Ok(Uuid::from_bytes(bytes))
	}

	fn string(&mut self) -> Result<String, DecodeError> {
		let len = self.len(1)?;
		let bytes = self.take(len)?;
		String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
	}
}

/// Writes a bundle into its compact binary form.
pub fn bundle_to_bytes(bundle: &Bundle) -> Vec<u8> {
	let mut w = ByteWriter::new();
	w.put_bytes(&MAGIC);
	w.put_u8(VERSION);

	w.put_len(bundle.transformer_guids.len());
	for guid in &bundle.transformer_guids {
		w.put_guid(guid);
	}
	w.put_len(bundle.type_guids.len());
	for guid in &bundle.type_guids {
		w.put_guid(guid);
	}

	w.put_len(bundle.storable_type_metadata.len());
	for layout in &bundle.storable_type_metadata {
		w.put_varint(layout.type_guid_string_id.into());
		w.put_varint(layout.parent_layout_id.into());
		w.put_len(layout.member_name_string_ids.len());
		for &id in &layout.member_name_string_ids {
			w.put_varint(id.into());
		}
	}

	w.put_len(bundle.array_metadata.len());
	for meta in &bundle.array_metadata {
		w.put_varint(meta.rank.into());
		for &len in &meta.lengths {
			w.put_varint(len.into());
		}
		w.put_len(meta.lower_bounds.len());
		for &lb in &meta.lower_bounds {
			w.put_varint(lb.into());
		}
	}

	w.put_len(bundle.type_metadata.len());
	for meta in &bundle.type_metadata {
		w.put_varint(meta.type_id.into());
		w.put_varint(meta.transformer_id.into());
		w.put_len(meta.generic_argument_metadata_ids.len());
		for &id in &meta.generic_argument_metadata_ids {
			w.put_varint(id.into());
		}
	}

	w.put_len(bundle.boxes.len());
	for wire_box in &bundle.boxes {
		write_box(&mut w, wire_box);
	}

	w.put_len(bundle.strings.len());
	for s in &bundle.strings {
		w.put_string(s);
	}

	w.put_varint(bundle.root_box_id.into());
	w.buf
}

fn write_box(w: &mut ByteWriter, wire_box: &WireBox) {
	w.put_varint(wire_box.type_metadata_id.into());
	match &wire_box.payload {
		None => w.put_u8(0),
		Some(BoxPayload::Scalar(scalar)) => {
			w.put_u8(1);
			write_scalar(w, scalar);
		}
		Some(BoxPayload::Repeated(repeated)) => {
			w.put_u8(2);
			write_repeated(w, repeated);
		}
		Some(BoxPayload::Record(record)) => {
			w.put_u8(3);
			w.put_varint(record.storable_type_metadata_id.into());
			w.put_len(record.value_box_ids.len());
			for &id in &record.value_box_ids {
				w.put_varint(id.into());
			}
		}
	}
}

fn write_scalar(w: &mut ByteWriter, scalar: &ScalarPayload) {
	match scalar {
		ScalarPayload::Unsigned(v) => {
			w.put_u8(1);
			w.put_varint(*v);
		}
		ScalarPayload::Signed(v) => {
			w.put_u8(2);
			w.put_varint(*v as u64);
		}
		ScalarPayload::ZigZag(v) => {
			w.put_u8(3);
			w.put_zigzag(*v);
		}
		ScalarPayload::Float(v) => {
			w.put_u8(4);
			w.put_bytes(&v.to_le_bytes());
		}
		ScalarPayload::Double(v) => {
			w.put_u8(5);
			w.put_bytes(&v.to_le_bytes());
		}
		ScalarPayload::Bytes(v) => {
			w.put_u8(6);
			w.put_len(v.len());
			w.put_bytes(v);
		}
	}
}

fn write_repeated(w: &mut ByteWriter, repeated: &RepeatedPayload) {
	match &repeated.values {
		RepeatedValues::Bools(v) => {
			w.put_u8(1);
			w.put_len(v.len());
			for &b in v {
				w.put_u8(b as u8);
			}
		}
		RepeatedValues::Bytes(v) => {
			w.put_u8(2);
			w.put_len(v.len());
			w.put_bytes(v);
		}
		RepeatedValues::Ints(v) => {
			w.put_u8(3);
			w.put_len(v.len());
			for &x in v {
				w.put_bytes(&x.to_le_bytes());
			}
		}
		RepeatedValues::Longs(v) => {
			w.put_u8(4);
			w.put_len(v.len());
			for &x in v {
				w.put_bytes(&x.to_le_bytes());
			}
		}
		RepeatedValues::ULongs(v) => {
			w.put_u8(5);
			w.put_len(v.len());
			for &x in v {
				w.put_bytes(&x.to_le_bytes());
			}
		}
		RepeatedValues::Floats(v) => {
			w.put_u8(6);
			w.put_len(v.len());
			for &x in v {
				w.put_bytes(&x.to_le_bytes());
			}
		}
		RepeatedValues::Doubles(v) => {
			w.put_u8(7);
			w.put_len(v.len());
			for &x in v {
				w.put_bytes(&x.to_le_bytes());
			}
		}
		RepeatedValues::BoxIds(v) => {
			w.put_u8(8);
			w.put_len(v.len());
			for &id in v {
				w.put_varint(id.into());
			}
		}
		RepeatedValues::StringIds(v) => {
			w.put_u8(9);
			w.put_len(v.len());
			for &id in v {
				w.put_varint(id.into());
			}
		}
	}
	w.put_varint(repeated.array_metadata_id.into());
	w.put_varint(repeated.comparer_box_id.into());
	w.put_varint(repeated.comparer_type_metadata_id.into());
}

/// Parses and structurally validates a bundle.
pub fn bundle_from_bytes(bytes: &[u8]) -> Result<Bundle, DecodeError> {
	let mut r = ByteReader::new(bytes);

	let magic: [u8; 4] = r.take(4)?.try_into().expect("slice length checked");
	if magic != MAGIC {
		return Err(DecodeError::BadMagic(magic));
	}
	let version = r.u8()?;
	if version != VERSION {
		return Err(DecodeError::UnsupportedVersion(version));
	}

	let mut bundle = Bundle::default();

	let count = r.len(16)?;
	bundle.transformer_guids = (0..count).map(|_| r.guid()).collect::<Result<_, _>>()?;
	let count = r.len(16)?;
	bundle.type_guids = (0..count).map(|_| r.guid()).collect::<Result<_, _>>()?;

	let count = r.len(3)?;
	bundle.storable_type_metadata = (0..count)
		.map(|_| {
			let type_guid_string_id = r.varint32()?;
			let parent_layout_id = r.varint32()?;
			let names = r.len(1)?;
			let member_name_string_ids =
				(0..names).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			Ok(StorableTypeLayout {
				type_guid_string_id,
				parent_layout_id,
				member_name_string_ids,
			})
		})
		.collect::<Result<_, DecodeError>>()?;

	let count = r.len(2)?;
	bundle.array_metadata = (0..count)
		.map(|_| {
			let rank = r.varint32()?;
			if rank as usize > r.remaining() {
				return Err(DecodeError::UnexpectedEof(r.pos));
			}
			let lengths = (0..rank).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			let bounds = r.len(1)?;
			let lower_bounds = (0..bounds).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			Ok(ArrayMetadata {
				rank,
				lengths,
				lower_bounds,
			})
		})
		.collect::<Result<_, DecodeError>>()?;

	let count = r.len(3)?;
	bundle.type_metadata = (0..count)
		.map(|_| {
			let type_id = r.varint32()?;
			let transformer_id = r.varint32()?;
			let args = r.len(1)?;
			let generic_argument_metadata_ids =
				(0..args).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			Ok(TypeMetadata {
				type_id,
				generic_argument_metadata_ids,
				transformer_id,
			})
		})
		.collect::<Result<_, DecodeError>>()?;

	let count = r.len(2)?;
	bundle.boxes = (0..count)
		.map(|_| read_box(&mut r))
		.collect::<Result<_, _>>()?;

	let count = r.len(1)?;
	bundle.strings = (0..count).map(|_| r.string()).collect::<Result<_, _>>()?;

	bundle.root_box_id = r.varint32()?;

	if r.remaining() != 0 {
		return Err(DecodeError::TrailingBytes(r.remaining()));
	}
	validate_bundle(&bundle)?;
	Ok(bundle)
}

fn read_box(r: &mut ByteReader<'_>) -> Result<WireBox, DecodeError> {
	let type_metadata_id = r.varint32()?;
	let tag = r.u8()?;
	let payload = match tag {
		0 => None,
		1 => Some(BoxPayload::Scalar(read_scalar(r)?)),
		2 => Some(BoxPayload::Repeated(read_repeated(r)?)),
		3 => {
			let storable_type_metadata_id = r.varint32()?;
			let count = r.len(1)?;
			let value_box_ids = (0..count).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			Some(BoxPayload::Record(RecordPayload {
				storable_type_metadata_id,
				value_box_ids,
			}))
		}
		value => {
			return Err(DecodeError::InvalidTag {
				field: "payload",
				value,
			})
		}
	};
	Ok(WireBox {
		type_metadata_id,
		payload,
	})
}

fn read_scalar(r: &mut ByteReader<'_>) -> Result<ScalarPayload, DecodeError> {
	let slot = r.u8()?;
	Ok(match slot {
		1 => ScalarPayload::Unsigned(r.varint()?),
		2 => ScalarPayload::Signed(r.varint()? as i64),
		3 => ScalarPayload::ZigZag(r.zigzag()?),
		4 => ScalarPayload::Float(f32::from_le_bytes(
			r.take(4)?.try_into().expect("slice length checked"),
		)),
		5 => ScalarPayload::Double(f64::from_le_bytes(
			r.take(8)?.try_into().expect("slice length checked"),
		)),
		6 => {
			let len = r.len(1)?;
			ScalarPayload::Bytes(r.take(len)?.to_vec())
		}
		value => {
			return Err(DecodeError::InvalidTag {
				field: "scalar slot",
				value,
			})
		}
	})
}

fn read_repeated(r: &mut ByteReader<'_>) -> Result<RepeatedPayload, DecodeError> {
	let slot = r.u8()?;
	let values = match slot {
		1 => {
			let len = r.len(1)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(match r.u8()? {
					0 => false,
					1 => true,
					value => {
						return Err(DecodeError::InvalidTag {
							field: "bool element",
							value,
						})
					}
				});
			}
			RepeatedValues::Bools(v)
		}
		2 => {
			let len = r.len(1)?;
			RepeatedValues::Bytes(r.take(len)?.to_vec())
		}
		3 => {
			let len = r.len(4)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(i32::from_le_bytes(
					r.take(4)?.try_into().expect("slice length checked"),
				));
			}
			RepeatedValues::Ints(v)
		}
		4 => {
			let len = r.len(8)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(i64::from_le_bytes(
					r.take(8)?.try_into().expect("slice length checked"),
				));
			}
			RepeatedValues::Longs(v)
		}
		5 => {
			let len = r.len(8)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(u64::from_le_bytes(
					r.take(8)?.try_into().expect("slice length checked"),
				));
			}
			RepeatedValues::ULongs(v)
		}
		6 => {
			let len = r.len(4)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(f32::from_le_bytes(
					r.take(4)?.try_into().expect("slice length checked"),
				));
			}
			RepeatedValues::Floats(v)
		}
		7 => {
			let len = r.len(8)?;
			let mut v = Vec::with_capacity(len);
			for _ in 0..len {
				v.push(f64::from_le_bytes(
					r.take(8)?.try_into().expect("slice length checked"),
				));
			}
			RepeatedValues::Doubles(v)
		}
		8 => {
			let len = r.len(1)?;
			let v = (0..len).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			RepeatedValues::BoxIds(v)
		}
		9 => {
			let len = r.len(1)?;
			let v = (0..len).map(|_| r.varint32()).collect::<Result<_, _>>()?;
			RepeatedValues::StringIds(v)
		}
		value => {
			return Err(DecodeError::InvalidTag {
				field: "repeated slot",
				value,
			})
		}
	};
	Ok(RepeatedPayload {
		values,
		array_metadata_id: r.varint32()?,
		comparer_box_id: r.varint32()?,
		comparer_type_metadata_id: r.varint32()?,
	})
}

/// Checks every cross-table reference of a bundle.
///
/// Run by [`bundle_from_bytes`] and again by the mapper, since bundles
/// can also be built in memory by callers.
pub fn validate_bundle(bundle: &Bundle) -> Result<(), DecodeError> {
	let boxes = bundle.boxes.len();
	let strings = bundle.strings.len();
	let metadatas = bundle.type_metadata.len();
	let layouts = bundle.storable_type_metadata.len();

	let check = |table: &'static str, id: u32, len: usize, required: bool| {
		if (required && id == 0) || id as usize > len {
			Err(DecodeError::IdOutOfRange { table, id, len })
		} else {
			Ok(())
		}
	};

	if bundle.root_box_id == 0 || bundle.root_box_id as usize > boxes {
		return Err(DecodeError::RootOutOfRange {
			root: bundle.root_box_id,
			boxes,
		});
	}

	for layout in &bundle.storable_type_metadata {
		check("string", layout.type_guid_string_id, strings, true)?;
		check("layout", layout.parent_layout_id, layouts, false)?;
		for &id in &layout.member_name_string_ids {
			check("string", id, strings, true)?;
		}
	}

	for (i, meta) in bundle.array_metadata.iter().enumerate() {
		if meta.lengths.len() != meta.rank as usize
			|| !(meta.lower_bounds.is_empty() || meta.lower_bounds.len() == meta.rank as usize)
		{
			return Err(DecodeError::RankMismatch(i as u32 + 1));
		}
	}

	for meta in &bundle.type_metadata {
		check("type guid", meta.type_id, bundle.type_guids.len(), true)?;
		check(
			"transformer guid",
			meta.transformer_id,
			bundle.transformer_guids.len(),
			false,
		)?;
		for &id in &meta.generic_argument_metadata_ids {
			check("type metadata", id, metadatas, true)?;
		}
	}
	check_metadata_acyclic(&bundle.type_metadata)?;

	for wire_box in &bundle.boxes {
		check("type metadata", wire_box.type_metadata_id, metadatas, true)?;
		match &wire_box.payload {
			None | Some(BoxPayload::Scalar(_)) => {}
			Some(BoxPayload::Repeated(repeated)) => {
				check(
					"array metadata",
					repeated.array_metadata_id,
					bundle.array_metadata.len(),
					false,
				)?;
				check("box", repeated.comparer_box_id, boxes, false)?;
				check(
					"type metadata",
					repeated.comparer_type_metadata_id,
					metadatas,
					false,
				)?;
				if let RepeatedValues::BoxIds(ids) = &repeated.values {
					for &id in ids {
						check("box", id, boxes, false)?;
					}
				}
				if let RepeatedValues::StringIds(ids) = &repeated.values {
					for &id in ids {
						check("string", id, strings, true)?;
					}
				}
			}
			Some(BoxPayload::Record(record)) => {
				check("layout", record.storable_type_metadata_id, layouts, true)?;
				for &id in &record.value_box_ids {
					check("box", id, boxes, false)?;
				}
			}
		}
	}
	Ok(())
}

/// Type metadatas must form a DAG through their generic arguments.
fn check_metadata_acyclic(metadatas: &[TypeMetadata]) -> Result<(), DecodeError> {
	// 0 = unvisited, 1 = on the current path, 2 = done
	let mut state = vec![0u8; metadatas.len()];
	for start in 0..metadatas.len() {
		if state[start] != 0 {
			continue;
		}
		// (index, next argument position)
		let mut stack = vec![(start, 0usize)];
		state[start] = 1;
		while let Some(top) = stack.len().checked_sub(1) {
			let (node, arg) = stack[top];
			let args = &metadatas[node].generic_argument_metadata_ids;
			if arg == args.len() {
				state[node] = 2;
				stack.pop();
				continue;
			}
			stack[top].1 += 1;
			let next = args[arg] as usize - 1;
			match state[next] {
				0 => {
					state[next] = 1;
					stack.push((next, 0));
				}
				1 => return Err(DecodeError::MetadataCycle(next as u32 + 1)),
				_ => {}
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn varint_roundtrip(v: u64) {
		let mut w = ByteWriter::new();
		w.put_varint(v);
		let mut r = ByteReader::new(&w.buf);
		assert_eq!(r.varint().unwrap(), v);
		assert_eq!(r.remaining(), 0);
	}

	#[test]
	fn varint_edges() {
		for v in [0, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
			varint_roundtrip(v);
		}
	}

	#[test]
	fn varint_overflow_detected() {
		let bytes = [0xff; 11];
		let mut r = ByteReader::new(&bytes);
		assert!(matches!(r.varint(), Err(DecodeError::VarintOverflow(_))));
	}

	#[test]
	fn zigzag_symmetry() {
		for v in [0i64, -1, 1, -2, i64::MIN, i64::MAX] {
			let mut w = ByteWriter::new();
			w.put_zigzag(v);
			let mut r = ByteReader::new(&w.buf);
			assert_eq!(r.zigzag().unwrap(), v);
		}
	}

	#[test]
	fn small_zigzag_stays_small() {
		let mut w = ByteWriter::new();
		w.put_zigzag(-1);
		assert_eq!(w.buf.len(), 1);
	}

	#[test]
	fn truncated_input_is_an_eof() {
		let bundle = Bundle {
			type_guids: vec![Uuid::from_u128(7)],
			type_metadata: vec![TypeMetadata {
				type_id: 1,
				generic_argument_metadata_ids: vec![],
				transformer_id: 0,
			}],
			boxes: vec![WireBox {
				type_metadata_id: 1,
				payload: Some(BoxPayload::Scalar(ScalarPayload::Unsigned(9))),
			}],
			root_box_id: 1,
			..Bundle::default()
		};
		let bytes = bundle_to_bytes(&bundle);
		for cut in 1..bytes.len() {
			assert!(bundle_from_bytes(&bytes[..cut]).is_err());
		}
	}

	#[test]
	fn metadata_cycle_is_rejected() {
		let metadatas = vec![
			TypeMetadata {
				type_id: 1,
				generic_argument_metadata_ids: vec![2],
				transformer_id: 0,
			},
			TypeMetadata {
				type_id: 1,
				generic_argument_metadata_ids: vec![1],
				transformer_id: 0,
			},
		];
		assert!(matches!(
			check_metadata_acyclic(&metadatas),
			Err(DecodeError::MetadataCycle(_))
		));
	}
}
