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

//! The mapping engine.
//!
//! Serialization is a breadth-first discovery walk: the box table hands
//! out dense ids in first-encounter order and enqueues every newly
//! discovered object; the driver drains the queue, letting each object's
//! transformer fill its box and discover children. Deserialization runs
//! in two phases over box ids in reverse: phase A gives every object an
//! identity (a shell), phase B wires references between shells. Cycles
//! need nothing beyond this split.
//!
//! A [`Mapper`] carries the state of exactly one serialization or one
//! deserialization and is not reused across sessions or shared across
//! threads.

use std::any::TypeId as AnyTypeId;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::codec::{self, DecodeError};
use crate::error::Error;
use crate::interner::Interner;
use crate::meta_type::{ArrayMarker, Fingerprint, MetaType, Shape};
use crate::registry::{Registry, StorableInfo};
use crate::transform::{runtime_type_of, Obj, Transformer};
use crate::wire::{ArrayMetadata, Bundle, StorableTypeLayout, TypeMetadata, WireBox};

/// Outcome record of one serialization.
#[derive(Debug, Clone)]
pub struct SerializeInfo {
	pub duration: Duration,
	pub object_count: usize,
	/// Names of the runtime types that contributed type metadata, in
	/// first-encounter order. Diagnostic only.
	pub serialized_types: Vec<String>,
	/// Whether the walk was cut short; the bundle is then incomplete.
	pub cancelled: bool,
}

/// Outcome record of one deserialization.
#[derive(Debug, Clone)]
pub struct DeserializeInfo {
	pub duration: Duration,
	pub object_count: usize,
	/// Type GUIDs present in the bundle but absent from the registry.
	/// Their objects resolve to nothing; everything else is unaffected.
	pub unknown_type_guids: Vec<Uuid>,
	pub cancelled: bool,
}

/// Key of the object-to-box-id table.
///
/// Reference identity first; immutable scalars fall back to value
/// equality, paired with their runtime type, so equal scalars of the
/// same type share one box.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
enum BoxKey {
	Identity(usize, AnyTypeId),
	Scalar(AnyTypeId, ScalarKey),
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
enum ScalarKey {
	Bool(bool),
	Unsigned(u64),
	Signed(i64),
	Bits32(u32),
	Bits64(u64),
	Char(char),
	Str(String),
	Guid(Uuid),
}

fn box_key(object: &Obj) -> BoxKey {
	let any_id = runtime_type_of(object);
	macro_rules! scalar_key {
		( $( $ty:ty => $make:expr ),* $(,)? ) => {
			$(
				if let Some(value) = object.downcast_ref::<$ty>() {
					let make: fn(&$ty) -> ScalarKey = $make;
					return BoxKey::Scalar(any_id, make(value));
				}
			)*
		};
	}
	scalar_key! {
		bool => |v: &bool| ScalarKey::Bool(*v),
		u8 => |v: &u8| ScalarKey::Unsigned(u64::from(*v)),
		u16 => |v: &u16| ScalarKey::Unsigned(u64::from(*v)),
		u32 => |v: &u32| ScalarKey::Unsigned(u64::from(*v)),
		u64 => |v: &u64| ScalarKey::Unsigned(*v),
		i8 => |v: &i8| ScalarKey::Signed(i64::from(*v)),
		i16 => |v: &i16| ScalarKey::Signed(i64::from(*v)),
		i32 => |v: &i32| ScalarKey::Signed(i64::from(*v)),
		i64 => |v: &i64| ScalarKey::Signed(*v),
		f32 => |v: &f32| ScalarKey::Bits32(v.to_bits()),
		f64 => |v: &f64| ScalarKey::Bits64(v.to_bits()),
		char => |v: &char| ScalarKey::Char(*v),
		String => |v: &String| ScalarKey::Str(v.clone()),
		Uuid => |v: &Uuid| ScalarKey::Guid(*v),
	}
	BoxKey::Identity(Rc::as_ptr(object) as *const u8 as usize, any_id)
}

/// Drives one serialization or one deserialization against a registry.
pub struct Mapper {
	registry: Arc<RwLock<Registry>>,
	cancel: CancelToken,

	strings: Interner<String>,
	type_guids: Interner<Uuid>,
	transformer_guids: Interner<Uuid>,
	array_metadata: Interner<ArrayMetadata>,
	type_metadata: Vec<TypeMetadata>,
	metadata_ids: HashMap<AnyTypeId, u32>,
	metadata_names: Vec<&'static str>,
	layouts: Vec<StorableTypeLayout>,
	layout_ids: HashMap<Uuid, u32>,

	boxes: Vec<WireBox>,
	box_ids: HashMap<BoxKey, u32>,
	queue: VecDeque<(Obj, u32)>,

	wire_boxes: Vec<Rc<WireBox>>,
	decode_transformers: Vec<Arc<dyn Transformer>>,
	resolved_types: HashMap<u32, Option<MetaType>>,
	objects: HashMap<u32, Option<Obj>>,
	materialized: Vec<u32>,
	unknown_type_guids: Vec<Uuid>,
}

impl Mapper {
	/// Creates a mapper over a registry.
	pub fn new(registry: Arc<RwLock<Registry>>) -> Self {
		Self::with_cancel(registry, CancelToken::new())
	}

	/// Creates a mapper that observes the given cancellation token.
	pub fn with_cancel(registry: Arc<RwLock<Registry>>, cancel: CancelToken) -> Self {
		Self {
			registry,
			cancel,
			strings: Interner::new(),
			type_guids: Interner::new(),
			transformer_guids: Interner::new(),
			array_metadata: Interner::new(),
			type_metadata: Vec::new(),
			metadata_ids: HashMap::new(),
			metadata_names: Vec::new(),
			layouts: Vec::new(),
			layout_ids: HashMap::new(),
			boxes: Vec::new(),
			box_ids: HashMap::new(),
			queue: VecDeque::new(),
			wire_boxes: Vec::new(),
			decode_transformers: Vec::new(),
			resolved_types: HashMap::new(),
			objects: HashMap::new(),
			materialized: Vec::new(),
			unknown_type_guids: Vec::new(),
		}
	}

	fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
		self.registry.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
		self.registry.write().unwrap_or_else(PoisonError::into_inner)
	}

	// ------------------------------------------------------------------
	// Serialization
	// ------------------------------------------------------------------

	/// Walks the graph reachable from `root` into a bundle.
	///
	/// Box ids equal breadth-first discovery order, with the root at 1.
	/// Cancellation mid-walk returns the bundle as built so far with
	/// [`SerializeInfo::cancelled`] set; it does not raise.
	pub fn to_bundle(&mut self, root: Obj) -> Result<(Bundle, SerializeInfo), Error> {
		let started = Instant::now();
		self.write_registry().update_registered_types()?;

		let root_box_id = self.box_id_for(Some(root))?;
		let mut cancelled = false;
		while let Some((object, id)) = self.queue.pop_front() {
			if self.cancel.is_cancelled() {
				cancelled = true;
				break;
			}
			let transformer = self.encode_transformer_for(id)?;
			let payload = transformer.fill_box(&object, self)?;
			self.boxes[id as usize - 1].payload = Some(payload);
		}

		let bundle = Bundle {
			transformer_guids: self.transformer_guids.values().to_vec(),
			type_guids: self.type_guids.values().to_vec(),
			strings: self.strings.values().to_vec(),
			storable_type_metadata: self.layouts.clone(),
			type_metadata: self.type_metadata.clone(),
			array_metadata: self.array_metadata.values().to_vec(),
			boxes: self.boxes.clone(),
			root_box_id,
		};
		let info = SerializeInfo {
			duration: started.elapsed(),
			object_count: self.boxes.len(),
			serialized_types: self.metadata_names.iter().map(|n| n.to_string()).collect(),
			cancelled,
		};
		log::debug!(
			"serialized {} objects, {} types in {:?}{}",
			info.object_count,
			self.type_metadata.len(),
			info.duration,
			if cancelled { " (cancelled)" } else { "" },
		);
		Ok((bundle, info))
	}

	/// Returns the box id of an object, assigning one on first
	/// encounter. The null reference is id 0.
	///
	/// A first encounter asks the object's transformer for a partial box
	/// and enqueues the object for the fill pass, which is what makes
	/// the walk breadth-first.
	pub fn box_id_for(&mut self, object: Option<Obj>) -> Result<u32, Error> {
		let Some(object) = object else {
			return Ok(0);
		};
		let key = box_key(&object);
		if let Some(&id) = self.box_ids.get(&key) {
			return Ok(id);
		}
		let any_id = runtime_type_of(&object);
		let transformer = {
			let registry = self.read_registry();
			let info = registry.type_info(any_id);
			let name = info
				.map(|info| info.meta.name().to_string())
				.unwrap_or_else(|| format!("{any_id:?}"));
			match info.and_then(|info| info.transformer.clone()) {
				Some(transformer) => transformer,
				None => return Err(Error::UnserializableType(name)),
			}
		};
		let wire_box = transformer.create_box(&object, self)?;
		self.boxes.push(wire_box);
		let id = self.boxes.len() as u32;
		self.box_ids.insert(key, id);
		self.queue.push_back((object, id));
		Ok(id)
	}

	/// Returns a partial box for a type: metadata id set, payload empty.
	pub fn partial_box(&mut self, meta: MetaType, transformer_guid: Uuid) -> Result<WireBox, Error> {
		Ok(WireBox {
			type_metadata_id: self.metadata_id_for(meta, Some(transformer_guid))?,
			payload: None,
		})
	}

	/// Interns the recursive type metadata for a runtime type.
	///
	/// Cached per runtime type. A record created for a generic argument
	/// carries transformer id 0 until an instance of the type is
	/// encountered, at which point the id is backfilled; 0 permanently
	/// means "absent" and no transformer can own it.
	pub fn metadata_id_for(
		&mut self,
		meta: MetaType,
		transformer_guid: Option<Uuid>,
	) -> Result<u32, Error> {
		if let Some(&id) = self.metadata_ids.get(&meta.any_id()) {
			if let Some(guid) = transformer_guid {
				let interned = self.transformer_guids.intern(guid);
				let slot = &mut self.type_metadata[id as usize - 1];
				if slot.transformer_id == 0 {
					slot.transformer_id = interned;
				}
			}
			return Ok(id);
		}
		let (type_id, generic_argument_metadata_ids) = match meta.shape() {
			Shape::Plain => (self.type_guid_id_for(&meta)?, Vec::new()),
			Shape::Generic { definition, args } => {
				let base = self.type_guid_id_for(&definition)?;
				let mut ids = Vec::with_capacity(args.len());
				for arg in args {
					ids.push(self.metadata_id_for(arg, None)?);
				}
				(base, ids)
			}
			Shape::Array { element } => {
				let base = self.type_guid_id_for(&MetaType::new::<ArrayMarker>())?;
				(base, vec![self.metadata_id_for(element, None)?])
			}
		};
		let transformer_id = match transformer_guid {
			Some(guid) => self.transformer_guids.intern(guid),
			None => 0,
		};
		self.type_metadata.push(TypeMetadata {
			type_id,
			generic_argument_metadata_ids,
			transformer_id,
		});
		self.metadata_names.push(meta.name());
		let id = self.type_metadata.len() as u32;
		self.metadata_ids.insert(meta.any_id(), id);
		Ok(id)
	}

	fn type_guid_id_for(&mut self, meta: &MetaType) -> Result<u32, Error> {
		let guid = {
			self.read_registry()
				.type_info(meta.any_id())
				.map(|info| info.guid)
		}
		.ok_or(Error::UnregisteredType(meta.name()))?;
		Ok(self.type_guids.intern(guid))
	}

	/// Interns an array shape; coincident shapes share one record.
	pub fn array_metadata_id_for(&mut self, metadata: ArrayMetadata) -> u32 {
		self.array_metadata.intern(metadata)
	}

	/// Resolves an interned array shape.
	pub fn array_metadata_for(&self, id: u32) -> Result<&ArrayMetadata, Error> {
		self.array_metadata.resolve(id, "array metadata")
	}

	/// Interns a string and returns its id.
	pub fn intern_string(&mut self, value: &str) -> u32 {
		self.strings.intern(value.to_owned())
	}

	/// Resolves an interned string.
	pub fn string_for(&self, id: u32) -> Result<&str, Error> {
		self.strings.resolve(id, "string").map(String::as_str)
	}

	/// Returns the layout id for a storable type, building the layout
	/// chain (parents first) on first encounter.
	pub fn layout_id_for(&mut self, guid: Uuid) -> Result<u32, Error> {
		if let Some(&id) = self.layout_ids.get(&guid) {
			return Ok(id);
		}
		let info = self
			.storable_info_by_guid(guid)
			.ok_or_else(|| Error::UnserializableType(guid.to_string()))?;
		let parent_layout_id = match info.parent {
			Some(parent) => self.layout_id_for(parent)?,
			None => 0,
		};
		let type_guid_string_id = self.intern_string(&guid.to_string());
		let member_name_string_ids = info
			.own_member_names
			.iter()
			.map(|name| self.strings.intern((*name).to_string()))
			.collect();
		self.layouts.push(StorableTypeLayout {
			type_guid_string_id,
			parent_layout_id,
			member_name_string_ids,
		});
		let id = self.layouts.len() as u32;
		self.layout_ids.insert(guid, id);
		Ok(id)
	}

	/// Resolves a layout id.
	pub fn layout(&self, id: u32) -> Result<&StorableTypeLayout, Error> {
		(id as usize)
			.checked_sub(1)
			.and_then(|index| self.layouts.get(index))
			.ok_or(Error::IdOutOfRange {
				table: "layout",
				id,
				len: self.layouts.len(),
			})
	}

	/// The box assigned to an id during serialization; total on assigned
	/// ids.
	pub fn wire_box(&self, id: u32) -> Result<&WireBox, Error> {
		(id as usize)
			.checked_sub(1)
			.and_then(|index| self.boxes.get(index))
			.ok_or(Error::IdOutOfRange {
				table: "box",
				id,
				len: self.boxes.len(),
			})
	}

	fn encode_transformer_for(&self, id: u32) -> Result<Arc<dyn Transformer>, Error> {
		let wire_box = self.wire_box(id)?;
		let metadata = (wire_box.type_metadata_id as usize)
			.checked_sub(1)
			.and_then(|index| self.type_metadata.get(index))
			.ok_or(Error::IdOutOfRange {
				table: "type metadata",
				id: wire_box.type_metadata_id,
				len: self.type_metadata.len(),
			})?;
		let guid = *self
			.transformer_guids
			.resolve(metadata.transformer_id, "transformer guid")?;
		self.read_registry()
			.transformer_for(guid)
			.ok_or(Error::UnknownTransformer(guid))
	}

	// ------------------------------------------------------------------
	// Deserialization
	// ------------------------------------------------------------------

	/// Reconstructs the graph a bundle describes and returns its root.
	///
	/// Unknown type GUIDs are tolerated: their objects resolve to
	/// nothing and the GUIDs are reported in the info record. Unknown
	/// transformer GUIDs abort. Cancellation returns no root.
	pub fn from_bundle(&mut self, bundle: &Bundle) -> Result<(Option<Obj>, DeserializeInfo), Error> {
		let started = Instant::now();
		self.write_registry().update_registered_types()?;
		codec::validate_bundle(bundle)?;

		self.strings = Interner::from_values(bundle.strings.clone());
		self.type_guids = Interner::from_values(bundle.type_guids.clone());
		self.transformer_guids = Interner::from_values(bundle.transformer_guids.clone());
		self.array_metadata = Interner::from_values(bundle.array_metadata.clone());
		self.type_metadata = bundle.type_metadata.clone();
		self.layouts = bundle.storable_type_metadata.clone();

		let (transformers, unknown) = {
			let registry = self.read_registry();
			let transformers = bundle
				.transformer_guids
				.iter()
				.map(|guid| {
					registry
						.transformer_for(*guid)
						.ok_or(Error::UnknownTransformer(*guid))
				})
				.collect::<Result<Vec<_>, _>>()?;
			let unknown = bundle
				.type_guids
				.iter()
				.filter(|guid| registry.try_type_for(**guid).is_none())
				.copied()
				.collect::<Vec<_>>();
			(transformers, unknown)
		};
		self.decode_transformers = transformers;
		self.unknown_type_guids = unknown;
		for guid in &self.unknown_type_guids {
			log::warn!("type guid {guid} is not registered; its objects resolve to nothing");
		}
		self.wire_boxes = bundle.boxes.iter().map(|b| Rc::new(b.clone())).collect();

		let total = self.wire_boxes.len() as u32;
		// Phase A: shells, in reverse id order so leaf-heavy graphs do
		// not deepen the stack through to_object cascades.
		for id in (1..=total).rev() {
			if self.cancel.is_cancelled() {
				return Ok((None, self.finish_info(started, true)));
			}
			self.object_for(id)?;
		}
		// Phase B: wire references between shells.
		for id in (1..=total).rev() {
			if self.cancel.is_cancelled() {
				return Ok((None, self.finish_info(started, true)));
			}
			let Some(object) = self.objects.get(&id).cloned().flatten() else {
				continue;
			};
			let wire_box = self.wire_boxes[id as usize - 1].clone();
			let transformer = self.decode_transformer_for(id)?;
			transformer.fill_from_box(&object, &wire_box, self)?;
		}

		let root = self.object_for(bundle.root_box_id)?;
		self.run_hooks()?;

		let info = self.finish_info(started, false);
		log::debug!(
			"deserialized {} objects in {:?}, {} unknown type guids",
			info.object_count,
			info.duration,
			info.unknown_type_guids.len(),
		);
		Ok((root, info))
	}

	fn finish_info(&self, started: Instant, cancelled: bool) -> DeserializeInfo {
		DeserializeInfo {
			duration: started.elapsed(),
			object_count: self.materialized.len(),
			unknown_type_guids: self.unknown_type_guids.clone(),
			cancelled,
		}
	}

	/// Lazily materializes the object for a box id; 0 is the null
	/// reference. Results are cached, and the first materialization
	/// order is recorded for the hook pass.
	pub fn object_for(&mut self, id: u32) -> Result<Option<Obj>, Error> {
		if id == 0 {
			return Ok(None);
		}
		if let Some(cached) = self.objects.get(&id) {
			return Ok(cached.clone());
		}
		let wire_box = self
			.wire_boxes
			.get(id as usize - 1)
			.ok_or(Error::IdOutOfRange {
				table: "box",
				id,
				len: self.wire_boxes.len(),
			})?
			.clone();
		let transformer = self.decode_transformer_for(id)?;
		let object = transformer.to_object(&wire_box, self)?;
		self.objects.insert(id, object.clone());
		self.materialized.push(id);
		Ok(object)
	}

	fn decode_transformer_for(&self, id: u32) -> Result<Arc<dyn Transformer>, Error> {
		let wire_box = self
			.wire_boxes
			.get(id as usize - 1)
			.ok_or(Error::IdOutOfRange {
				table: "box",
				id,
				len: self.wire_boxes.len(),
			})?;
		let metadata = (wire_box.type_metadata_id as usize)
			.checked_sub(1)
			.and_then(|index| self.type_metadata.get(index))
			.ok_or(Error::IdOutOfRange {
				table: "type metadata",
				id: wire_box.type_metadata_id,
				len: self.type_metadata.len(),
			})?;
		let index = (metadata.transformer_id as usize)
			.checked_sub(1)
			.ok_or(Error::IdOutOfRange {
				table: "transformer guid",
				id: metadata.transformer_id,
				len: self.decode_transformers.len(),
			})?;
		self.decode_transformers
			.get(index)
			.cloned()
			.ok_or(Error::IdOutOfRange {
				table: "transformer guid",
				id: metadata.transformer_id,
				len: self.decode_transformers.len(),
			})
	}

	/// Resolves a type metadata id to a registered runtime type.
	///
	/// Resolution failures propagate structurally: a generic whose
	/// argument is unknown is itself unknown, and callers receive `None`
	/// rather than an error.
	pub fn type_for(&mut self, metadata_id: u32) -> Result<Option<MetaType>, Error> {
		if metadata_id == 0 {
			return Ok(None);
		}
		if let Some(cached) = self.resolved_types.get(&metadata_id) {
			return Ok(*cached);
		}
		let fingerprint = self.fingerprint_for(metadata_id)?;
		let resolved = {
			self.read_registry()
				.type_for_fingerprint(&fingerprint)
				.map(|info| info.meta)
		};
		self.resolved_types.insert(metadata_id, resolved);
		Ok(resolved)
	}

	fn fingerprint_for(&self, metadata_id: u32) -> Result<Fingerprint, Error> {
		let metadata = self
			.type_metadata
			.get(metadata_id as usize - 1)
			.ok_or(Error::IdOutOfRange {
				table: "type metadata",
				id: metadata_id,
				len: self.type_metadata.len(),
			})?;
		let base = *self.type_guids.resolve(metadata.type_id, "type guid")?;
		let args = &metadata.generic_argument_metadata_ids;
		if args.is_empty() {
			return Ok(Fingerprint::Plain(base));
		}
		if base == crate::transformers::TYPE_ARRAY && args.len() == 1 {
			return Ok(Fingerprint::Array(Box::new(self.fingerprint_for(args[0])?)));
		}
		Ok(Fingerprint::Generic(
			base,
			args.iter()
				.map(|&arg| self.fingerprint_for(arg))
				.collect::<Result<_, _>>()?,
		))
	}

	/// Flattens a layout chain into `(declaring guid, member name)`
	/// pairs, ancestors first, parallel to a record's value box ids.
	pub fn flattened_member_names(&self, layout_id: u32) -> Result<Vec<(Uuid, String)>, Error> {
		let mut chain = Vec::new();
		let mut current = layout_id;
		while current != 0 {
			if chain.len() > self.layouts.len() {
				return Err(Error::Decode(DecodeError::LayoutCycle(layout_id)));
			}
			let layout = self.layout(current)?;
			chain.push(layout);
			current = layout.parent_layout_id;
		}
		chain.reverse();

		let mut names = Vec::new();
		for layout in chain {
			let guid_string = self.strings.resolve(layout.type_guid_string_id, "string")?;
			let guid = Uuid::parse_str(guid_string)
				.map_err(|_| DecodeError::InvalidGuid(layout.type_guid_string_id))?;
			for &name_id in &layout.member_name_string_ids {
				names.push((guid, self.strings.resolve(name_id, "string")?.clone()));
			}
		}
		Ok(names)
	}

	/// Hooks run over every constructed object in materialization order;
	/// each storable's hook chain is already root-to-derived. A hook
	/// error propagates out of deserialization.
	fn run_hooks(&mut self) -> Result<(), Error> {
		let mut work: Vec<(Obj, Arc<StorableInfo>)> = Vec::new();
		{
			let registry = self.read_registry();
			for &id in &self.materialized {
				let Some(object) = self.objects.get(&id).cloned().flatten() else {
					continue;
				};
				let storable = registry
					.type_info(runtime_type_of(&object))
					.and_then(|info| info.storable.clone());
				if let Some(info) = storable {
					work.push((object, info));
				}
			}
		}
		for (object, info) in work {
			for hook in &info.hooks {
				hook(&*object).map_err(|source| Error::HookFailed {
					type_name: info.type_name.to_string(),
					source,
				})?;
			}
		}
		Ok(())
	}

	// ------------------------------------------------------------------
	// Registry passthroughs for transformers
	// ------------------------------------------------------------------

	/// The registered meta type of a runtime type, if any.
	pub fn meta_of(&self, any_id: AnyTypeId) -> Option<MetaType> {
		self.read_registry().type_info(any_id).map(|info| info.meta)
	}

	/// The storable descriptor of a runtime type, if any.
	pub fn storable_info(&self, any_id: AnyTypeId) -> Option<Arc<StorableInfo>> {
		self.read_registry()
			.type_info(any_id)
			.and_then(|info| info.storable.clone())
	}

	fn storable_info_by_guid(&self, guid: Uuid) -> Option<Arc<StorableInfo>> {
		self.read_registry()
			.type_info_for_guid(guid)
			.and_then(|info| info.storable.clone())
	}
}
