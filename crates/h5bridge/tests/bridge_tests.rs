//! End-to-end tests of the boundary surface against the in-memory
//! container.

use h5bridge::{AttrEntry, Bridge, Error, MarshaledValue, SelectionError};
use h5bridge_store::{
    ArraySpec, Container, ContainerBuilder, LinkKind, MemContainer, ObjectKind, TypeClass,
};

fn sample() -> Bridge<MemContainer> {
    let mut b = ContainerBuilder::new();
    b.add_group("run");
    b.add_dataset("run/counts", ArraySpec::i32(&[10, 20, 30]));
    b.add_dataset("run/labels", ArraySpec::fixed_str(8, &["ab", "xyz"]));
    b.add_dataset("run/notes", ArraySpec::vlen_str(&["first", "second"]));
    b.add_dataset("run/ramp", ArraySpec::i64(&[0, 1, 2, 3, 4]));
    b.add_named_type(
        "run/pixel",
        h5bridge_store::Datatype::Other {
            class_code: 6,
            size: 12,
        },
    );
    b.set_attr("run/counts", "units", ArraySpec::fixed_str(8, &["counts"]));
    b.set_attr("run/counts", "scale", ArraySpec::f64(&[2.5]));
    b.soft_link("run/alias", "run/counts");
    Bridge::new(b.finish())
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

#[test]
fn children_listed_in_name_order_with_kinds() {
    let bridge = sample();
    let names = bridge.list_children("run").unwrap();
    assert_eq!(names, vec!["alias", "counts", "labels", "notes", "pixel", "ramp"]);

    let kinds = bridge.list_child_kinds("run").unwrap();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::Dataset, // alias resolves to run/counts
            ObjectKind::Dataset,
            ObjectKind::Dataset,
            ObjectKind::Dataset,
            ObjectKind::NamedType,
            ObjectKind::Dataset,
        ]
    );

    assert_eq!(bridge.child_count("run").unwrap(), 6);
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn link_kinds_distinguish_soft_links() {
    let bridge = sample();
    let kinds = bridge.list_link_kinds("run").unwrap();
    assert_eq!(kinds[0], LinkKind::Soft);
    assert!(kinds[1..].iter().all(|&k| k == LinkKind::Hard));

    let info = bridge.link_info("run", "counts").unwrap();
    assert_eq!(info.kind, LinkKind::Hard);
    assert!(info.creation_order.is_some());
}

#[test]
fn listing_a_missing_group_fails() {
    let bridge = sample();
    assert!(bridge.list_children("nowhere").is_err());
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

#[test]
fn dataset_descriptor_matches_stored_type() {
    let bridge = sample();
    let d = bridge.describe("run/counts").unwrap();
    assert_eq!(d.shape, vec![3]);
    assert_eq!(d.total_size, 3);
    assert_eq!(d.type_class, TypeClass::Integer);
    assert_eq!(d.element_size, 4);
    assert_eq!(d.is_signed, Some(true));
    assert!(d.little_endian);
    assert!(!d.is_variable_length);
    assert_eq!(d.in_memory_size, 12);
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn describe_follows_soft_links() {
    let bridge = sample();
    assert_eq!(
        bridge.describe("run/alias").unwrap(),
        bridge.describe("run/counts").unwrap()
    );
}

#[test]
fn describing_a_group_as_dataset_reports_kinds() {
    let bridge = sample();
    match bridge.describe("run").unwrap_err() {
        Error::WrongKind {
            expected, actual, ..
        } => {
            assert_eq!(expected, ObjectKind::Dataset);
            assert_eq!(actual, ObjectKind::Group);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn describe_is_stable_across_calls() {
    let bridge = sample();
    let first = bridge.describe("run/notes").unwrap();
    let second = bridge.describe("run/notes").unwrap();
    assert_eq!(first, second);
    assert!(first.is_variable_length);
}

#[test]
fn descriptor_serializes_to_json() {
    let bridge = sample();
    let d = bridge.describe("run/counts").unwrap();
    let json: serde_json::Value = serde_json::to_value(&d).unwrap();
    assert_eq!(json["shape"], serde_json::json!([3]));
    assert_eq!(json["total_size"], 3);
    assert_eq!(json["element_size"], 4);
    assert_eq!(json["little_endian"], true);
}

// ---------------------------------------------------------------------------
// Data reads
// ---------------------------------------------------------------------------

#[test]
fn full_integer_read_returns_tagged_bytes() {
    let bridge = sample();
    match bridge.read_data("run/counts", None, None).unwrap() {
        MarshaledValue::Bytes {
            data,
            element_size,
            element_count,
        } => {
            assert_eq!(data.len(), 12);
            assert_eq!(element_size, 4);
            assert_eq!(element_count, 3);
            assert_eq!(&data[4..8], &20i32.to_le_bytes());
        }
        other => panic!("unexpected value: {other:?}"),
    }
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn scalar_integer_read_yields_one_element() {
    let mut b = ContainerBuilder::new();
    b.add_dataset("answer", ArraySpec::i64(&[42]).scalar());
    let bridge = Bridge::new(b.finish());

    let d = bridge.describe("answer").unwrap();
    assert!(d.shape.is_empty());
    assert_eq!(d.total_size, 1);

    match bridge.read_data("answer", None, None).unwrap() {
        MarshaledValue::Bytes {
            data,
            element_size,
            element_count,
        } => {
            assert_eq!(data, 42i64.to_le_bytes());
            assert_eq!(element_size, 8);
            assert_eq!(element_count, 1);
        }
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn fixed_strings_decode_to_their_content() {
    let bridge = sample();
    assert_eq!(
        bridge.read_data("run/labels", None, None).unwrap(),
        MarshaledValue::StringArray(vec!["ab".into(), "xyz".into()])
    );
}

#[test]
fn hyperslab_read_restricts_the_source() {
    let bridge = sample();
    match bridge
        .read_data("run/ramp", Some(&[1]), Some(&[2]))
        .unwrap()
    {
        MarshaledValue::Bytes {
            data,
            element_count,
            ..
        } => {
            assert_eq!(element_count, 2);
            assert_eq!(&data[0..8], &1i64.to_le_bytes());
            assert_eq!(&data[8..16], &2i64.to_le_bytes());
        }
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn out_of_range_selection_is_rejected_before_reading() {
    let bridge = sample();
    let err = bridge
        .read_data("run/ramp", Some(&[4]), Some(&[2]))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidSelection(SelectionError::OutOfRange { dim: 0, .. })
    ));
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn partial_selection_is_rejected() {
    let bridge = sample();
    let err = bridge
        .read_data("run/ramp", Some(&[1]), None)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidSelection(SelectionError::PartialRegion)
    ));
}

#[test]
fn vlen_strings_are_reclaimed_exactly_once() {
    let bridge = sample();
    let live_before = bridge.container().vlen_live_count();
    assert_eq!(
        bridge.read_data("run/notes", None, None).unwrap(),
        MarshaledValue::StringArray(vec!["first".into(), "second".into()])
    );
    assert_eq!(bridge.container().vlen_reclaim_calls(), 1);
    assert_eq!(bridge.container().vlen_live_count(), live_before - 2);
    assert_eq!(bridge.container().open_object_count(), 0);
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

#[test]
fn attribute_descriptor_and_value() {
    let bridge = sample();
    let d = bridge.describe_attribute("run/counts", "units").unwrap();
    assert_eq!(d.type_class, TypeClass::String);
    assert_eq!(d.element_size, 8);

    assert_eq!(
        bridge.read_attribute("run/counts", "units").unwrap(),
        MarshaledValue::StringArray(vec!["counts".into()])
    );
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn missing_attribute_leaves_no_open_handle() {
    let bridge = sample();
    let err = bridge
        .read_attribute("run/counts", "absent")
        .unwrap_err();
    match err {
        Error::AttributeNotFound { path, name } => {
            assert_eq!(path, "run/counts");
            assert_eq!(name, "absent");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(bridge.container().open_object_count(), 0);
}

#[test]
fn attribute_listing_describes_each_entry() {
    let bridge = sample();
    let attrs = bridge.list_attributes("run/counts").unwrap();
    let names: Vec<&str> = attrs.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["scale", "units"]);

    match &attrs["scale"] {
        AttrEntry::Described(d) => {
            assert_eq!(d.type_class, TypeClass::Float);
            assert_eq!(d.element_size, 8);
        }
        other => panic!("unexpected entry: {other:?}"),
    }
    assert_eq!(bridge.container().open_object_count(), 0);
}
