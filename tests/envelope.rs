//! Envelope-level checks: payload shapes, sizes, codec round trips,
//! malformed inputs and the JSON projection.

mod common;

use std::rc::Rc;

use common::{builtin_registry, obj, share};
use graph_bundle::{
	bundle_from_bytes, bundle_to_bytes, ArrayMetadata, BoxPayload, Bundle, DecodeError, Mapper,
	NdArray, RecordPayload, RepeatedPayload, RepeatedValues, ScalarPayload, TypeMetadata, WireBox,
};
use uuid::Uuid;

/// Deterministic 64-bit linear congruential generator.
struct Lcg(u64);

impl Lcg {
	fn new(seed: u64) -> Self {
		Self(seed)
	}

	fn next_i32(&mut self) -> i32 {
		self.0 = self
			.0
			.wrapping_mul(6364136223846793005)
			.wrapping_add(1442695040888963407);
		(self.0 >> 33) as i32
	}
}

#[test]
fn large_int_array_is_one_compact_box() {
	let mut rng = Lcg::new(1234);
	let values: Vec<i32> = (0..8192).map(|_| rng.next_i32()).collect();

	let registry = builtin_registry();
	let (bundle, _) = Mapper::new(registry.clone())
		.to_bundle(obj(values.clone()))
		.unwrap();

	assert_eq!(bundle.boxes.len(), 1);
	let Some(BoxPayload::Repeated(repeated)) = &bundle.boxes[0].payload else {
		panic!("not a repeated payload");
	};
	let RepeatedValues::Ints(stored) = &repeated.values else {
		panic!("not an int payload");
	};
	assert_eq!(stored.len(), 8192);
	assert_eq!(bundle.array_metadata.len(), 1);
	assert_eq!(
		bundle.array_metadata[0],
		ArrayMetadata {
			rank: 1,
			lengths: vec![8192],
			lower_bounds: vec![],
		}
	);
	assert_eq!(repeated.array_metadata_id, 1);

	let bytes = bundle_to_bytes(&bundle);
	assert!(bytes.len() < 33 * 1024, "envelope is {} bytes", bytes.len());

	let (root, _) = Mapper::new(registry)
		.from_bundle(&bundle_from_bytes(&bytes).unwrap())
		.unwrap();
	let root = root.expect("root present");
	assert_eq!(root.downcast_ref::<Vec<i32>>(), Some(&values));
}

#[test]
fn rank_three_array_keeps_its_shape() {
	let data: Vec<i32> = (0..4096).collect();
	let array = NdArray::new(vec![16, 16, 16], data.clone()).unwrap();

	let registry = builtin_registry();
	let (bundle, _) = Mapper::new(registry.clone())
		.to_bundle(obj(array.clone()))
		.unwrap();

	assert_eq!(bundle.boxes.len(), 1);
	assert_eq!(bundle.array_metadata.len(), 1);
	let metadata = &bundle.array_metadata[0];
	assert_eq!(metadata.rank, 3);
	assert_eq!(metadata.lengths, vec![16, 16, 16]);
	assert!(metadata.lower_bounds.is_empty());
	let Some(BoxPayload::Repeated(repeated)) = &bundle.boxes[0].payload else {
		panic!("not a repeated payload");
	};
	assert_eq!(repeated.values.len(), 4096);

	let (root, _) = Mapper::new(registry).from_bundle(&bundle).unwrap();
	let root = root.expect("root present");
	assert_eq!(root.downcast_ref::<NdArray<i32>>(), Some(&array));
}

#[test]
fn coincident_shapes_share_one_metadata_record() {
	let registry = builtin_registry();
	let list = Rc::new(graph_bundle::ObjList::from_items(vec![
		Some(obj(vec![1i32, 2, 3])),
		Some(obj(vec![7i32, 8, 9])),
		Some(obj(vec![1.0f64, 2.0, 3.0])),
	]));

	let (bundle, _) = Mapper::new(registry).to_bundle(share(&list)).unwrap();
	// Three length-3 rank-1 arrays, one shape record.
	assert_eq!(bundle.array_metadata.len(), 1);
}

#[test]
fn scalar_encoders_pick_the_compact_slot() {
	let registry = builtin_registry();
	let scalar_payload = |root| {
		let (bundle, _) = Mapper::new(registry.clone()).to_bundle(root).unwrap();
		let Some(BoxPayload::Scalar(scalar)) = bundle.boxes[0].payload.clone() else {
			panic!("not a scalar payload");
		};
		scalar
	};

	assert_eq!(scalar_payload(obj(7u32)), ScalarPayload::Unsigned(7));
	assert_eq!(scalar_payload(obj(7i64)), ScalarPayload::Unsigned(7));
	assert_eq!(scalar_payload(obj(-5i64)), ScalarPayload::ZigZag(-5));
	assert_eq!(scalar_payload(obj(2.5f64)), ScalarPayload::Double(2.5));
	assert_eq!(scalar_payload(obj(true)), ScalarPayload::Unsigned(1));
}

fn minimal_bundle() -> Bundle {
	Bundle {
		transformer_guids: vec![Uuid::from_u128(0x11)],
		type_guids: vec![Uuid::from_u128(0x22)],
		type_metadata: vec![TypeMetadata {
			type_id: 1,
			generic_argument_metadata_ids: vec![],
			transformer_id: 1,
		}],
		boxes: vec![WireBox {
			type_metadata_id: 1,
			payload: Some(BoxPayload::Scalar(ScalarPayload::Unsigned(9))),
		}],
		root_box_id: 1,
		..Bundle::default()
	}
}

#[test]
fn comparer_references_round_trip() {
	let mut bundle = minimal_bundle();
	bundle.boxes.push(WireBox {
		type_metadata_id: 1,
		payload: Some(BoxPayload::Repeated(RepeatedPayload {
			values: RepeatedValues::BoxIds(vec![1, 0]),
			array_metadata_id: 1,
			comparer_box_id: 1,
			comparer_type_metadata_id: 1,
		})),
	});
	bundle.array_metadata.push(ArrayMetadata {
		rank: 1,
		lengths: vec![2],
		lower_bounds: vec![0],
	});

	let decoded = bundle_from_bytes(&bundle_to_bytes(&bundle)).unwrap();
	assert_eq!(decoded, bundle);
}

#[test]
fn record_payloads_round_trip() {
	let mut bundle = minimal_bundle();
	bundle.strings = vec!["00000000-0000-0000-0000-000000000022".into(), "Next".into()];
	bundle.storable_type_metadata = vec![graph_bundle::StorableTypeLayout {
		type_guid_string_id: 1,
		parent_layout_id: 0,
		member_name_string_ids: vec![2],
	}];
	bundle.boxes.push(WireBox {
		type_metadata_id: 1,
		payload: Some(BoxPayload::Record(RecordPayload {
			storable_type_metadata_id: 1,
			value_box_ids: vec![1],
		})),
	});

	let decoded = bundle_from_bytes(&bundle_to_bytes(&bundle)).unwrap();
	assert_eq!(decoded, bundle);
}

#[test]
fn bad_magic_is_rejected() {
	let mut bytes = bundle_to_bytes(&minimal_bundle());
	bytes[0] = b'X';
	assert!(matches!(
		bundle_from_bytes(&bytes),
		Err(DecodeError::BadMagic(_))
	));
}

#[test]
fn unsupported_version_is_rejected() {
	let mut bytes = bundle_to_bytes(&minimal_bundle());
	bytes[4] = 99;
	assert!(matches!(
		bundle_from_bytes(&bytes),
		Err(DecodeError::UnsupportedVersion(99))
	));
}

#[test]
fn trailing_bytes_are_rejected() {
	let mut bytes = bundle_to_bytes(&minimal_bundle());
	bytes.push(0);
	assert!(matches!(
		bundle_from_bytes(&bytes),
		Err(DecodeError::TrailingBytes(1))
	));
}

#[test]
fn zero_root_is_rejected() {
	let mut bundle = minimal_bundle();
	bundle.root_box_id = 0;
	assert!(matches!(
		bundle_from_bytes(&bundle_to_bytes(&bundle)),
		Err(DecodeError::RootOutOfRange { root: 0, boxes: 1 })
	));
}

#[test]
fn dangling_metadata_reference_is_rejected() {
	let mut bundle = minimal_bundle();
	bundle.boxes[0].type_metadata_id = 7;
	assert!(matches!(
		bundle_from_bytes(&bundle_to_bytes(&bundle)),
		Err(DecodeError::IdOutOfRange { id: 7, .. })
	));
}

#[test]
fn metadata_cycles_are_rejected() {
	let mut bundle = minimal_bundle();
	bundle.type_metadata[0].generic_argument_metadata_ids = vec![1];
	assert!(matches!(
		bundle_from_bytes(&bundle_to_bytes(&bundle)),
		Err(DecodeError::MetadataCycle(_))
	));
}

#[test]
fn json_projection_exposes_the_schema() {
	let registry = builtin_registry();
	let (bundle, _) = Mapper::new(registry).to_bundle(obj(7u64)).unwrap();
	let json = serde_json::to_value(&bundle).unwrap();

	assert_eq!(json["root_box_id"], 1);
	assert_eq!(json["boxes"][0]["type_metadata_id"], 1);
	assert_eq!(json["boxes"][0]["payload"]["Scalar"]["Unsigned"], 7);
	assert_eq!(json["type_metadata"][0]["type_id"], 1);
	assert_eq!(json["type_metadata"][0]["transformer_id"], 1);
	assert!(json["transformer_guids"][0].is_string());
	assert!(json["type_guids"][0].is_string());
}
