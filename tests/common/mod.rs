//! Shared fixtures: a minimal storable node type and registry helpers.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, RwLock};

use graph_bundle::{HasShape, Obj, Registry, StorableBuilder};
use uuid::Uuid;

pub const NODE_GUID: Uuid = Uuid::from_u128(0x6e6f6465_0000_4000_8000_000000000001);

/// A singly linked node whose only member is its successor.
pub struct Node {
	pub next: RefCell<Option<Obj>>,
}

impl HasShape for Node {}

pub fn register_node(registry: &mut Registry) {
	registry
		.register_storable(
			StorableBuilder::new(NODE_GUID, || {
				Ok(Node {
					next: RefCell::new(None),
				})
			})
			.member(
				"Next",
				|node: &Node| node.next.borrow().clone(),
				|node: &Node, value| *node.next.borrow_mut() = value,
			),
		)
		.expect("node registration");
}

pub fn registry_with_node() -> Arc<RwLock<Registry>> {
	let mut registry = Registry::new();
	register_node(&mut registry);
	Arc::new(RwLock::new(registry))
}

pub fn builtin_registry() -> Arc<RwLock<Registry>> {
	Arc::new(RwLock::new(Registry::new()))
}

pub fn node(next: Option<Obj>) -> Rc<Node> {
	Rc::new(Node {
		next: RefCell::new(next),
	})
}

/// Moves a value behind a fresh object handle.
pub fn obj<T: 'static>(value: T) -> Obj {
	Rc::new(value)
}

/// Shares an existing allocation as an object handle.
pub fn share<T: 'static>(rc: &Rc<T>) -> Obj {
	rc.clone()
}

pub fn next_of(object: &Obj) -> Obj {
	object
		.downcast_ref::<Node>()
		.expect("a node")
		.next
		.borrow()
		.clone()
		.expect("a successor")
}
