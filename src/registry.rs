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

//! The registry resolves runtime types to their stable GUIDs, their
//! transformers, and (for storable user types) their constructors,
//! member descriptors and post-deserialization hooks.
//!
//! There is no reflection: every storable type is compiled at
//! registration time into an ordered list of (member name, get, set)
//! closures over `dyn Any`, and transformers work against those
//! descriptors. Inheritance is expressed by a parent projection that
//! rebinds the parent's descriptors onto the child's representation, so
//! the flattened member list and the root-to-derived hook chain fall out
//! of registration itself.
//!
//! GUIDs are globally unique tokens, so one process-wide registry is
//! provided behind [`static_registry`]; private registries work the same
//! way and are what tests use.

use std::any::{Any, TypeId as AnyTypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::{Arc, OnceLock, RwLock};

use uuid::Uuid;

use crate::error::{BoxedError, Error};
use crate::meta_type::{Fingerprint, HasShape, MetaType, Shape};
use crate::transform::{Obj, Transformer};

/// Reads a member value off an object; `None` is the null reference.
pub type Getter = Arc<dyn Fn(&dyn Any) -> Option<Obj> + Send + Sync>;
/// Writes a member value into an object.
pub type Setter = Arc<dyn Fn(&dyn Any, Option<Obj>) + Send + Sync>;
/// A post-deserialization hook.
pub type Hook = Arc<dyn Fn(&dyn Any) -> Result<(), BoxedError> + Send + Sync>;
/// A fallible zero-argument constructor producing a shell object.
pub type Constructor = Arc<dyn Fn() -> Result<Obj, BoxedError> + Send + Sync>;

type Projector = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;

/// One named member of a storable type.
#[derive(Clone)]
pub struct Member {
	/// GUID of the type that declared the member.
	pub declaring_guid: Uuid,
	pub name: &'static str,
	pub get: Getter,
	pub set: Setter,
}

/// Everything the mapper needs to rebuild instances of a storable type.
pub struct StorableInfo {
	pub guid: Uuid,
	pub type_name: &'static str,
	/// GUID of the closest storable ancestor, if any.
	pub parent: Option<Uuid>,
	pub constructor: Constructor,
	/// Flattened member list: ancestors' members first, then own, in
	/// declared order.
	pub members: Vec<Member>,
	/// Names this type declares itself; ancestors contribute theirs
	/// through the parent link.
	pub own_member_names: Vec<&'static str>,
	/// Hooks in root-to-derived order, each level in registration order.
	pub hooks: Vec<Hook>,
	lookup: HashMap<Uuid, HashMap<&'static str, usize>>,
}

impl StorableInfo {
	/// Resolves a member by its declaring GUID and name.
	///
	/// This is the hot lookup of record deserialization; the prebuilt
	/// index keeps it allocation-free.
	pub fn member_for(&self, declaring_guid: Uuid, name: &str) -> Option<&Member> {
		let index = *self.lookup.get(&declaring_guid)?.get(name)?;
		self.members.get(index)
	}
}

/// What the registry knows about one runtime type.
pub struct TypeInfo {
	pub meta: MetaType,
	pub guid: Uuid,
	/// Absent only for types that are not serializable themselves, such
	/// as generic-definition markers.
	pub transformer: Option<Arc<dyn Transformer>>,
	pub storable: Option<Arc<StorableInfo>>,
}

/// Declares a storable user type: GUID, constructor, members, hooks and
/// an optional parent projection.
pub struct StorableBuilder<T> {
	guid: Uuid,
	constructor: Constructor,
	parent: Option<(AnyTypeId, &'static str, Projector)>,
	members: Vec<Member>,
	hooks: Vec<Hook>,
	_marker: PhantomData<fn() -> T>,
}

impl<T> StorableBuilder<T>
where
	T: Any,
{
	/// Starts a declaration with a fallible zero-argument constructor.
	pub fn new<C>(guid: Uuid, constructor: C) -> Self
	where
		C: Fn() -> Result<T, BoxedError> + Send + Sync + 'static,
	{
		Self {
			guid,
			constructor: Arc::new(move || constructor().map(|value| Rc::new(value) as Obj)),
			parent: None,
			members: Vec::new(),
			hooks: Vec::new(),
			_marker: PhantomData,
		}
	}

	/// Declares the storable parent. `project` exposes the embedded
	/// parent representation inside `T`; the parent's members and hooks
	/// are rebound through it at registration time.
	pub fn parent<P>(mut self, project: fn(&T) -> &P) -> Self
	where
		P: Any,
	{
		self.parent = Some((
			AnyTypeId::of::<P>(),
			std::any::type_name::<P>(),
			Arc::new(move |any: &dyn Any| {
				any.downcast_ref::<T>().map(|value| project(value) as &dyn Any)
			}),
		));
		self
	}

	/// Declares a named member with its accessors, in wire order.
	pub fn member<G, S>(mut self, name: &'static str, get: G, set: S) -> Self
	where
		G: Fn(&T) -> Option<Obj> + Send + Sync + 'static,
		S: Fn(&T, Option<Obj>) + Send + Sync + 'static,
	{
		self.members.push(Member {
			declaring_guid: self.guid,
			name,
			get: Arc::new(move |any| any.downcast_ref::<T>().and_then(|value| get(value))),
			set: Arc::new(move |any, child| {
				if let Some(value) = any.downcast_ref::<T>() {
					set(value, child);
				}
			}),
		});
		self
	}

	/// Declares a post-deserialization hook for this level of the type.
	pub fn hook<H>(mut self, hook: H) -> Self
	where
		H: Fn(&T) -> Result<(), BoxedError> + Send + Sync + 'static,
	{
		self.hooks.push(Arc::new(move |any| match any.downcast_ref::<T>() {
			Some(value) => hook(value),
			None => Ok(()),
		}));
		self
	}
}

fn rebind_member(member: &Member, projector: &Projector) -> Member {
	let get = member.get.clone();
	let get_projector = projector.clone();
	let set = member.set.clone();
	let set_projector = projector.clone();
	Member {
		declaring_guid: member.declaring_guid,
		name: member.name,
		get: Arc::new(move |any| get_projector(any).and_then(|inner| get(inner))),
		set: Arc::new(move |any, child| {
			if let Some(inner) = set_projector(any) {
				set(inner, child);
			}
		}),
	}
}

fn rebind_hook(hook: &Hook, projector: &Projector) -> Hook {
	let hook = hook.clone();
	let projector = projector.clone();
	Arc::new(move |any| match projector(any) {
		Some(inner) => hook(inner),
		None => Ok(()),
	})
}

type Registration = Box<dyn FnOnce(&mut Registry) -> Result<(), Error> + Send + Sync>;

/// The registry of serializable types and their transformers.
pub struct Registry {
	types: HashMap<AnyTypeId, TypeInfo>,
	guids: HashMap<Uuid, AnyTypeId>,
	fingerprints: HashMap<Fingerprint, AnyTypeId>,
	transformers: HashMap<Uuid, Arc<dyn Transformer>>,
	pending: Vec<Registration>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	/// Creates a registry with the built-in transformer suite installed.
	pub fn new() -> Self {
		let mut registry = Self {
			types: HashMap::new(),
			guids: HashMap::new(),
			fingerprints: HashMap::new(),
			transformers: HashMap::new(),
			pending: Vec::new(),
		};
		crate::transformers::install(&mut registry).expect("built-in registrations are disjoint");
		registry
	}

	/// Registers a transformer by its own GUID.
	pub fn register_transformer(&mut self, transformer: Arc<dyn Transformer>) -> Result<(), Error> {
		let guid = transformer.guid();
		if self.transformers.contains_key(&guid) {
			return Err(Error::DuplicateGuid(guid));
		}
		self.transformers.insert(guid, transformer);
		Ok(())
	}

	/// Registers a runtime type under a stable GUID, optionally with the
	/// transformer that serializes its instances.
	///
	/// # Note
	///
	/// Component types (generic arguments, array elements, generic
	/// definitions) must be registered before the types constructed
	/// from them, otherwise the structural fingerprint cannot be built.
	pub fn register_type(
		&mut self,
		meta: MetaType,
		guid: Uuid,
		transformer: Option<Arc<dyn Transformer>>,
	) -> Result<(), Error> {
		if self.guids.contains_key(&guid) {
			return Err(Error::DuplicateGuid(guid));
		}
		if self.types.contains_key(&meta.any_id()) {
			return Err(Error::DuplicateType(meta.name()));
		}
		let fingerprint = match meta.shape() {
			Shape::Plain => Fingerprint::Plain(guid),
			shape => self.fingerprint_of_shape(&shape)?,
		};
		if let Some(transformer) = &transformer {
			let transformer_guid = transformer.guid();
			self.transformers
				.entry(transformer_guid)
				.or_insert_with(|| transformer.clone());
		}
		self.insert(meta, guid, transformer, None, fingerprint);
		Ok(())
	}

	/// Registers a storable user type from its builder.
	pub fn register_storable<T>(&mut self, builder: StorableBuilder<T>) -> Result<(), Error>
	where
		T: HasShape,
	{
		let meta = MetaType::new::<T>();
		if self.guids.contains_key(&builder.guid) {
			return Err(Error::DuplicateGuid(builder.guid));
		}
		if self.types.contains_key(&meta.any_id()) {
			return Err(Error::DuplicateType(meta.name()));
		}

		let (parent_guid, mut members, mut hooks) = match &builder.parent {
			Some((parent_id, parent_name, projector)) => {
				let parent = self
					.types
					.get(parent_id)
					.and_then(|info| info.storable.clone())
					.ok_or(Error::UnregisteredParent(*parent_name))?;
				let members = parent
					.members
					.iter()
					.map(|member| rebind_member(member, projector))
					.collect::<Vec<_>>();
				let hooks = parent
					.hooks
					.iter()
					.map(|hook| rebind_hook(hook, projector))
					.collect::<Vec<_>>();
				(Some(parent.guid), members, hooks)
			}
			None => (None, Vec::new(), Vec::new()),
		};
		let own_member_names = builder.members.iter().map(|m| m.name).collect();
		members.extend(builder.members.iter().cloned());
		hooks.extend(builder.hooks.iter().cloned());

		let mut lookup: HashMap<Uuid, HashMap<&'static str, usize>> = HashMap::new();
		for (index, member) in members.iter().enumerate() {
			lookup
				.entry(member.declaring_guid)
				.or_default()
				.insert(member.name, index);
		}

		let info = Arc::new(StorableInfo {
			guid: builder.guid,
			type_name: meta.name(),
			parent: parent_guid,
			constructor: builder.constructor.clone(),
			members,
			own_member_names,
			hooks,
			lookup,
		});
		let transformer = self
			.transformers
			.get(&crate::transformers::XFORM_STORABLE)
			.cloned()
			.ok_or(Error::UnknownTransformer(crate::transformers::XFORM_STORABLE))?;
		self.insert(
			meta,
			builder.guid,
			Some(transformer),
			Some(info),
			Fingerprint::Plain(builder.guid),
		);
		Ok(())
	}

	fn insert(
		&mut self,
		meta: MetaType,
		guid: Uuid,
		transformer: Option<Arc<dyn Transformer>>,
		storable: Option<Arc<StorableInfo>>,
		fingerprint: Fingerprint,
	) {
		let any_id = meta.any_id();
		self.types.insert(
			any_id,
			TypeInfo {
				meta,
				guid,
				transformer,
				storable,
			},
		);
		self.guids.insert(guid, any_id);
		// Distinct runtime types can share a structural fingerprint, e.g.
		// a rank-1 array value type next to a plain vector. First wins.
		if let Some(existing) = self.fingerprints.get(&fingerprint) {
			if *existing != any_id {
				log::debug!(
					"fingerprint of `{}` already taken; keeping the earlier registration",
					meta.name()
				);
			}
		} else {
			self.fingerprints.insert(fingerprint, any_id);
		}
	}

	fn fingerprint_of_shape(&self, shape: &Shape) -> Result<Fingerprint, Error> {
		match shape {
			Shape::Plain => Err(Error::UnregisteredType("plain shape without guid")),
			Shape::Generic { definition, args } => Ok(Fingerprint::Generic(
				self.guid_of(definition)?,
				args.iter()
					.map(|arg| self.fingerprint_of(arg))
					.collect::<Result<_, _>>()?,
			)),
			Shape::Array { element } => {
				Ok(Fingerprint::Array(Box::new(self.fingerprint_of(element)?)))
			}
		}
	}

	fn fingerprint_of(&self, meta: &MetaType) -> Result<Fingerprint, Error> {
		match meta.shape() {
			Shape::Plain => Ok(Fingerprint::Plain(self.guid_of(meta)?)),
			shape => self.fingerprint_of_shape(&shape),
		}
	}

	fn guid_of(&self, meta: &MetaType) -> Result<Uuid, Error> {
		self.types
			.get(&meta.any_id())
			.map(|info| info.guid)
			.ok_or(Error::UnregisteredType(meta.name()))
	}

	/// What the registry knows about a runtime type.
	pub fn type_info(&self, any_id: AnyTypeId) -> Option<&TypeInfo> {
		self.types.get(&any_id)
	}

	/// The runtime type registered under a GUID, if any.
	pub fn try_type_for(&self, guid: Uuid) -> Option<MetaType> {
		self.type_info_for_guid(guid).map(|info| info.meta)
	}

	/// Full information for the type registered under a GUID.
	pub fn type_info_for_guid(&self, guid: Uuid) -> Option<&TypeInfo> {
		self.guids.get(&guid).and_then(|id| self.types.get(id))
	}

	/// The transformer registered under a GUID, if any.
	pub fn transformer_for(&self, guid: Uuid) -> Option<Arc<dyn Transformer>> {
		self.transformers.get(&guid).cloned()
	}

	/// Whether a runtime type was registered as a storable user type.
	pub fn is_storable_user_type(&self, any_id: AnyTypeId) -> bool {
		self.types
			.get(&any_id)
			.is_some_and(|info| info.storable.is_some())
	}

	/// Resolves a structural fingerprint back to a registered type.
	pub fn type_for_fingerprint(&self, fingerprint: &Fingerprint) -> Option<&TypeInfo> {
		self.fingerprints
			.get(fingerprint)
			.and_then(|id| self.types.get(id))
	}

	/// Queues registration work for the next
	/// [`update_registered_types`](Self::update_registered_types).
	pub fn defer<F>(&mut self, registration: F)
	where
		F: FnOnce(&mut Registry) -> Result<(), Error> + Send + Sync + 'static,
	{
		self.pending.push(Box::new(registration));
	}

	/// Runs deferred registrations. The mapper calls this once at the
	/// start of every serialization and deserialization.
	pub fn update_registered_types(&mut self) -> Result<(), Error> {
		let pending = std::mem::take(&mut self.pending);
		for registration in pending {
			registration(self)?;
		}
		Ok(())
	}
}

/// The process-wide registry, initialized on first access.
pub fn static_registry() -> Arc<RwLock<Registry>> {
	static REGISTRY: OnceLock<Arc<RwLock<Registry>>> = OnceLock::new();
	REGISTRY
		.get_or_init(|| Arc::new(RwLock::new(Registry::new())))
		.clone()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;

	struct Probe {
		child: RefCell<Option<Obj>>,
	}

	impl HasShape for Probe {}

	fn probe_builder(guid: Uuid) -> StorableBuilder<Probe> {
		StorableBuilder::new(guid, || {
			Ok(Probe {
				child: RefCell::new(None),
			})
		})
		.member(
			"Child",
			|probe: &Probe| probe.child.borrow().clone(),
			|probe: &Probe, value| *probe.child.borrow_mut() = value,
		)
	}

	#[test]
	fn builtin_types_are_preregistered() {
		let registry = Registry::new();
		assert!(registry.type_info(AnyTypeId::of::<i32>()).is_some());
		assert!(registry.type_info(AnyTypeId::of::<String>()).is_some());
		assert!(registry.type_info(AnyTypeId::of::<Vec<i32>>()).is_some());
	}

	#[test]
	fn duplicate_guid_is_rejected() {
		let mut registry = Registry::new();
		let guid = Uuid::from_u128(0xfeed);
		registry.register_storable(probe_builder(guid)).unwrap();
		struct Other;
		impl HasShape for Other {}
		let result =
			registry.register_storable(StorableBuilder::<Other>::new(guid, || Ok(Other)));
		assert!(matches!(result, Err(Error::DuplicateGuid(g)) if g == guid));
	}

	#[test]
	fn storable_resolves_through_guid_and_fingerprint() {
		let mut registry = Registry::new();
		let guid = Uuid::from_u128(0xbeef);
		registry.register_storable(probe_builder(guid)).unwrap();
		let meta = registry.try_type_for(guid).expect("registered");
		assert_eq!(meta, MetaType::new::<Probe>());
		let info = registry
			.type_for_fingerprint(&Fingerprint::Plain(guid))
			.expect("fingerprint registered");
		assert!(info.storable.is_some());
		assert!(registry.is_storable_user_type(meta.any_id()));
	}

	#[test]
	fn deferred_registrations_run_on_update() {
		let mut registry = Registry::new();
		let guid = Uuid::from_u128(0xabad);
		registry.defer(move |registry| registry.register_storable(probe_builder(guid)));
		assert!(registry.try_type_for(guid).is_none());
		registry.update_registered_types().unwrap();
		assert!(registry.try_type_for(guid).is_some());
	}
}
