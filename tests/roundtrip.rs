//! Graph round trips: identity, sharing, cycles, discovery order,
//! inheritance and hooks.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

use common::{builtin_registry, node, obj, registry_with_node, share, Node, NODE_GUID};
use graph_bundle::{
	bundle_from_bytes, bundle_to_bytes, BoxPayload, CancelToken, Error, HasShape, Mapper, ObjList,
	Obj, Registry, RepeatedValues, StorableBuilder,
};
use uuid::Uuid;

#[test]
fn linked_list_is_four_chained_record_boxes() {
	let registry = registry_with_node();
	let n4 = node(None);
	let n3 = node(Some(share(&n4)));
	let n2 = node(Some(share(&n3)));
	let n1 = node(Some(share(&n2)));

	let (bundle, info) = Mapper::new(registry).to_bundle(share(&n1)).unwrap();
	assert_eq!(bundle.root_box_id, 1);
	assert_eq!(bundle.boxes.len(), 4);
	assert_eq!(info.object_count, 4);
	assert!(!info.cancelled);

	// One layout with the single member "Next".
	assert_eq!(bundle.storable_type_metadata.len(), 1);
	let layout = &bundle.storable_type_metadata[0];
	assert_eq!(layout.parent_layout_id, 0);
	assert_eq!(layout.member_name_string_ids.len(), 1);
	let name_id = layout.member_name_string_ids[0] as usize;
	assert_eq!(bundle.strings[name_id - 1], "Next");
	let guid_id = layout.type_guid_string_id as usize;
	assert_eq!(bundle.strings[guid_id - 1], NODE_GUID.to_string());

	for (index, expected_next) in [(0usize, 2u32), (1, 3), (2, 4), (3, 0)] {
		let Some(BoxPayload::Record(record)) = &bundle.boxes[index].payload else {
			panic!("box {index} is not a record");
		};
		assert_eq!(record.value_box_ids, vec![expected_next]);
	}
}

#[test]
fn four_cycle_survives_with_identity() {
	let registry = registry_with_node();
	let a = node(None);
	let b = node(Some(share(&a)));
	let c = node(Some(share(&b)));
	let d = node(Some(share(&c)));
	*a.next.borrow_mut() = Some(share(&d));
	// a -> d -> c -> b -> a

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(share(&a)).unwrap();
	assert_eq!(bundle.boxes.len(), 4);

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	let mut cursor = root.clone();
	for _ in 0..4 {
		cursor = common::next_of(&cursor);
	}
	assert!(Rc::ptr_eq(&cursor, &root));
}

#[test]
fn self_reference_round_trips() {
	let registry = registry_with_node();
	let lone = node(None);
	*lone.next.borrow_mut() = Some(share(&lone));

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(share(&lone)).unwrap();
	assert_eq!(bundle.boxes.len(), 1);

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	assert!(Rc::ptr_eq(&common::next_of(&root), &root));
}

#[test]
fn shared_references_stay_shared() {
	let registry = registry_with_node();
	let shared = node(None);
	let list = Rc::new(ObjList::from_items(vec![
		Some(share(&shared)),
		Some(share(&shared)),
	]));

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(share(&list)).unwrap();
	// The list plus exactly one node.
	assert_eq!(bundle.boxes.len(), 2);

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	let list = root.downcast_ref::<ObjList>().expect("a list");
	let first = list.get(0).flatten().expect("first item");
	let second = list.get(1).flatten().expect("second item");
	assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn equal_scalars_share_one_box() {
	let registry = builtin_registry();
	let list = Rc::new(ObjList::from_items(vec![
		Some(obj(1000i64)),
		Some(obj(1000i64)),
	]));

	let (bundle, _) = Mapper::new(registry).to_bundle(share(&list)).unwrap();
	assert_eq!(bundle.boxes.len(), 2);
	let Some(BoxPayload::Repeated(repeated)) = &bundle.boxes[0].payload else {
		panic!("list box is not repeated");
	};
	let RepeatedValues::BoxIds(ids) = &repeated.values else {
		panic!("list payload is not box ids");
	};
	assert_eq!(ids, &vec![2, 2]);
}

#[test]
fn repeated_strings_intern_once() {
	let registry = builtin_registry();
	let words: Vec<String> = std::iter::repeat("hello".to_string()).take(4).collect();

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(obj(words)).unwrap();
	assert_eq!(bundle.boxes.len(), 1);
	assert_eq!(
		bundle.strings.iter().filter(|s| *s == "hello").count(),
		1
	);
	let Some(BoxPayload::Repeated(repeated)) = &bundle.boxes[0].payload else {
		panic!("not repeated");
	};
	let RepeatedValues::StringIds(ids) = &repeated.values else {
		panic!("not string ids");
	};
	assert_eq!(ids.len(), 4);
	assert!(ids.iter().all(|&id| id == ids[0]));

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	let words = root.downcast_ref::<Vec<String>>().expect("a string vec");
	assert_eq!(words, &vec!["hello".to_string(); 4]);
}

#[test]
fn discovery_is_breadth_first() {
	let registry = builtin_registry();
	let d1 = obj(10i64);
	let d2 = obj(20i64);
	let c1 = Rc::new(ObjList::from_items(vec![Some(d1)]));
	let c2 = Rc::new(ObjList::from_items(vec![Some(d2)]));
	let root = Rc::new(ObjList::from_items(vec![
		Some(share(&c1)),
		Some(share(&c2)),
	]));

	let (bundle, _) = Mapper::new(registry).to_bundle(share(&root)).unwrap();
	assert_eq!(bundle.boxes.len(), 5);

	let ids_of = |index: usize| -> Vec<u32> {
		let Some(BoxPayload::Repeated(repeated)) = &bundle.boxes[index].payload else {
			panic!("box {index} is not repeated");
		};
		let RepeatedValues::BoxIds(ids) = &repeated.values else {
			panic!("box {index} payload is not box ids");
		};
		ids.clone()
	};
	// Root is 1, its children 2 and 3, grandchildren 4 and 5.
	assert_eq!(ids_of(0), vec![2, 3]);
	assert_eq!(ids_of(1), vec![4]);
	assert_eq!(ids_of(2), vec![5]);
}

#[test]
fn same_graph_serializes_byte_identically() {
	let registry = registry_with_node();
	let tail = node(None);
	let head = node(Some(share(&tail)));

	let (first, _) = Mapper::new(registry.clone()).to_bundle(share(&head)).unwrap();
	let (second, _) = Mapper::new(registry).to_bundle(share(&head)).unwrap();
	assert_eq!(bundle_to_bytes(&first), bundle_to_bytes(&second));
}

#[test]
fn interned_tables_hold_no_duplicates() {
	let registry = registry_with_node();
	let tail = node(None);
	let head = node(Some(share(&tail)));
	let list = Rc::new(ObjList::from_items(vec![
		Some(share(&head)),
		Some(obj("hello".to_string())),
		Some(obj(vec![1i32, 2, 3])),
		Some(obj(2.5f64)),
	]));

	let (bundle, _) = Mapper::new(registry).to_bundle(share(&list)).unwrap();

	let unique = |len: usize, iter: std::collections::HashSet<String>| assert_eq!(iter.len(), len);
	unique(
		bundle.strings.len(),
		bundle.strings.iter().cloned().collect(),
	);
	unique(
		bundle.type_guids.len(),
		bundle.type_guids.iter().map(|g| g.to_string()).collect(),
	);
	unique(
		bundle.transformer_guids.len(),
		bundle
			.transformer_guids
			.iter()
			.map(|g| g.to_string())
			.collect(),
	);
	for wire_box in &bundle.boxes {
		assert!(wire_box.type_metadata_id as usize >= 1);
		assert!(wire_box.type_metadata_id as usize <= bundle.type_metadata.len());
	}
	// The codec agrees the bundle is structurally sound.
	let decoded = bundle_from_bytes(&bundle_to_bytes(&bundle)).unwrap();
	assert_eq!(decoded, bundle);
}

#[test]
fn unknown_type_guids_are_tolerated() {
	let writing = registry_with_node();
	let lone = node(None);
	let list = Rc::new(ObjList::from_items(vec![
		Some(share(&lone)),
		Some(obj(42i64)),
	]));
	let (bundle, _) = Mapper::new(writing).to_bundle(share(&list)).unwrap();

	// The reading registry never learned about nodes.
	let (root, info) = Mapper::new(builtin_registry()).from_bundle(&bundle).unwrap();
	assert_eq!(info.unknown_type_guids, vec![NODE_GUID]);
	let root = root.expect("the list itself is known");
	let list = root.downcast_ref::<ObjList>().expect("a list");
	assert!(list.get(0).flatten().is_none());
	let second = list.get(1).flatten().expect("the scalar is known");
	assert_eq!(second.downcast_ref::<i64>(), Some(&42));
}

#[test]
fn cancelled_serialization_returns_partial_bundle() {
	let registry = registry_with_node();
	let token = CancelToken::new();
	token.cancel();
	let head = node(Some(share(&node(None))));

	let (bundle, info) = Mapper::with_cancel(registry, token)
		.to_bundle(share(&head))
		.unwrap();
	assert!(info.cancelled);
	assert_eq!(bundle.boxes.len(), 1);
	assert!(bundle.boxes[0].payload.is_none());
}

#[test]
fn cancelled_deserialization_returns_no_root() {
	let registry = registry_with_node();
	let (bundle, _) = Mapper::new(registry.clone())
		.to_bundle(share(&node(None)))
		.unwrap();

	let token = CancelToken::new();
	token.cancel();
	let (root, info) = Mapper::with_cancel(registry, token)
		.from_bundle(&bundle)
		.unwrap();
	assert!(root.is_none());
	assert!(info.cancelled);
}

struct Flaky;

impl HasShape for Flaky {}

#[test]
fn constructor_failure_is_fatal() {
	let guid = Uuid::from_u128(0xf1a5);
	let mut registry = Registry::new();
	registry
		.register_storable(StorableBuilder::<Flaky>::new(guid, || {
			Err("no shells today".into())
		}))
		.unwrap();
	let registry = Arc::new(RwLock::new(registry));

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(obj(Flaky)).unwrap();
	let result = Mapper::new(registry).from_bundle(&bundle);
	assert!(matches!(result, Err(Error::ConstructorFailed { .. })));
}

struct Doomed;

impl HasShape for Doomed {}

#[test]
fn hook_failure_propagates() {
	let guid = Uuid::from_u128(0xd00f);
	let mut registry = Registry::new();
	registry
		.register_storable(
			StorableBuilder::new(guid, || Ok(Doomed)).hook(|_: &Doomed| Err("hook boom".into())),
		)
		.unwrap();
	let registry = Arc::new(RwLock::new(registry));

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(obj(Doomed)).unwrap();
	let Err(error) = Mapper::new(registry).from_bundle(&bundle) else {
		panic!("the hook must fail deserialization");
	};
	match error {
		Error::HookFailed { source, .. } => assert_eq!(source.to_string(), "hook boom"),
		other => panic!("expected a hook failure, got {other}"),
	}
}

// An inheritance chain: Top embeds Mid embeds Base.

type HookLog = Arc<Mutex<Vec<&'static str>>>;

struct HookBase {
	log: HookLog,
	id: RefCell<Option<Obj>>,
}

struct HookMid {
	base: HookBase,
}

struct HookTop {
	mid: HookMid,
	name: RefCell<Option<Obj>>,
}

impl HasShape for HookBase {}
impl HasShape for HookMid {}
impl HasShape for HookTop {}

const BASE_GUID: Uuid = Uuid::from_u128(0xba5e);
const MID_GUID: Uuid = Uuid::from_u128(0x3d1d);
const TOP_GUID: Uuid = Uuid::from_u128(0x70b0);

fn fresh_base(log: &HookLog) -> HookBase {
	HookBase {
		log: log.clone(),
		id: RefCell::new(None),
	}
}

fn register_chain(registry: &mut Registry, log: &HookLog) {
	let base_log = log.clone();
	registry
		.register_storable(
			StorableBuilder::new(BASE_GUID, move || Ok(fresh_base(&base_log)))
				.member(
					"Id",
					|base: &HookBase| base.id.borrow().clone(),
					|base: &HookBase, value| *base.id.borrow_mut() = value,
				)
				.hook(|base: &HookBase| {
					base.log.lock().unwrap().push("base");
					Ok(())
				}),
		)
		.unwrap();
	let mid_log = log.clone();
	registry
		.register_storable(
			StorableBuilder::new(MID_GUID, move || {
				Ok(HookMid {
					base: fresh_base(&mid_log),
				})
			})
			.parent::<HookBase>(|mid: &HookMid| &mid.base)
			.hook(|mid: &HookMid| {
				mid.base.log.lock().unwrap().push("mid");
				Ok(())
			}),
		)
		.unwrap();
	let top_log = log.clone();
	registry
		.register_storable(
			StorableBuilder::new(TOP_GUID, move || {
				Ok(HookTop {
					mid: HookMid {
						base: fresh_base(&top_log),
					},
					name: RefCell::new(None),
				})
			})
			.parent::<HookMid>(|top: &HookTop| &top.mid)
			.member(
				"Name",
				|top: &HookTop| top.name.borrow().clone(),
				|top: &HookTop, value| *top.name.borrow_mut() = value,
			)
			.hook(|top: &HookTop| {
				top.mid.base.log.lock().unwrap().push("top");
				Ok(())
			}),
		)
		.unwrap();
}

#[test]
fn hooks_run_root_to_derived() {
	let log: HookLog = Arc::new(Mutex::new(Vec::new()));
	let mut registry = Registry::new();
	register_chain(&mut registry, &log);
	let registry = Arc::new(RwLock::new(registry));

	let instance = HookTop {
		mid: HookMid {
			base: fresh_base(&log),
		},
		name: RefCell::new(Some(obj("deep".to_string()))),
	};
	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(obj(instance)).unwrap();

	log.lock().unwrap().clear();
	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	assert!(root.is_some());
	assert_eq!(*log.lock().unwrap(), vec!["base", "mid", "top"]);
}

#[test]
fn inherited_members_flatten_ancestors_first() {
	let log: HookLog = Arc::new(Mutex::new(Vec::new()));
	let mut registry = Registry::new();
	register_chain(&mut registry, &log);
	let registry = Arc::new(RwLock::new(registry));

	let instance = HookTop {
		mid: HookMid {
			base: HookBase {
				log: log.clone(),
				id: RefCell::new(Some(obj(7i64))),
			},
		},
		name: RefCell::new(Some(obj("leaf".to_string()))),
	};
	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(obj(instance)).unwrap();

	// Three layouts chained top -> mid -> base; the record stores the
	// flattened member values, base's "Id" before top's "Name".
	assert_eq!(bundle.storable_type_metadata.len(), 3);
	let Some(BoxPayload::Record(record)) = &bundle.boxes[0].payload else {
		panic!("not a record");
	};
	assert_eq!(record.value_box_ids.len(), 2);

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	let top = root.downcast_ref::<HookTop>().expect("a top");
	let id = top.mid.base.id.borrow().clone().expect("id set");
	assert_eq!(id.downcast_ref::<i64>(), Some(&7));
	let name = top.name.borrow().clone().expect("name set");
	assert_eq!(name.downcast_ref::<String>(), Some(&"leaf".to_string()));
}

#[test]
fn mixed_graph_round_trips_structurally() {
	let registry = registry_with_node();
	let tail = node(None);
	let head = node(Some(share(&tail)));
	let floats = obj(vec![0.5f64, -1.25, 3.75]);
	let list = Rc::new(ObjList::from_items(vec![
		Some(share(&head)),
		Some(floats),
		Some(obj('z')),
		None,
		Some(obj(Uuid::from_u128(0xcafe))),
	]));

	let (bundle, _) = Mapper::new(registry.clone()).to_bundle(share(&list)).unwrap();
	let (root, info) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	assert!(info.unknown_type_guids.is_empty());
	let root = root.expect("root present");
	let list = root.downcast_ref::<ObjList>().expect("a list");
	assert_eq!(list.len(), 5);

	let head = list.get(0).flatten().expect("head node");
	let tail = common::next_of(&head);
	assert!(tail.downcast_ref::<Node>().expect("a node").next.borrow().is_none());

	let floats = list.get(1).flatten().expect("floats");
	assert_eq!(
		floats.downcast_ref::<Vec<f64>>(),
		Some(&vec![0.5f64, -1.25, 3.75])
	);
	let ch = list.get(2).flatten().expect("char");
	assert_eq!(ch.downcast_ref::<char>(), Some(&'z'));
	assert!(list.get(3).unwrap().is_none());
	let guid = list.get(4).flatten().expect("guid");
	assert_eq!(guid.downcast_ref::<Uuid>(), Some(&Uuid::from_u128(0xcafe)));
}
