//! Typed access to fixed-layout metadata records.
//!
//! Every attribute type maps to a static slot layout so that a structure can
//! be declared before any record is written. Strings and arrays have a fixed
//! capacity and anything beyond it is dropped on write.

use std::sync::Arc;

use serlio_scene::{DataType, Handle, HostError, Structure, StructureRegistry, TEXT_SLOT_LENGTH};
use tracing::debug;

use crate::attributes::{AttributeType, AttributeValue};

pub const MAX_STRING_LENGTH: usize = TEXT_SLOT_LENGTH;
pub const MAX_ARRAY_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub key: String,
    pub value_type: AttributeType,
}

impl Descriptor {
    pub fn new(key: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            key: key.into(),
            value_type,
        }
    }
}

/// Physical slot type and slot count of a member holding `value_type`.
pub fn member_layout(value_type: AttributeType) -> (DataType, usize) {
    match value_type {
        AttributeType::Bool => (DataType::Boolean, 1),
        AttributeType::Float => (DataType::Double, 1),
        AttributeType::Int => (DataType::Int32, 1),
        AttributeType::String => (DataType::Text, 1),
        AttributeType::BoolArray => (DataType::Boolean, MAX_ARRAY_SIZE),
        AttributeType::FloatArray => (DataType::Double, MAX_ARRAY_SIZE),
        AttributeType::IntArray => (DataType::Int32, MAX_ARRAY_SIZE),
        AttributeType::StringArray => (DataType::Text, MAX_ARRAY_SIZE),
    }
}

/// Registers `name` with one member per descriptor, replacing any structure
/// previously registered under the same name.
pub fn register_structure(
    registry: &mut StructureRegistry,
    name: &str,
    descriptors: &[Descriptor],
) -> Result<Arc<Structure>, HostError> {
    if registry.deregister(name).is_some() {
        debug!("register_structure: replacing '{}'", name);
    }

    let mut structure = Structure::new(name);
    for descriptor in descriptors {
        let (data_type, length) = member_layout(descriptor.value_type);
        if !structure.add_member(data_type, length, &descriptor.key) {
            debug!(
                "register_structure: duplicate member '{}' in '{}'",
                descriptor.key, name
            );
        }
    }

    registry.register(structure)
}

fn setup_key(handle: &mut Handle, key: &str) -> bool {
    if handle.set_position_by_member_name(key) {
        return true;
    }
    debug!(
        "no member '{}' in structure '{}'",
        key,
        handle.structure().name()
    );
    false
}

fn expect_type(handle: &Handle, key: &str, expected: DataType) {
    assert_eq!(
        handle.data_type(),
        Some(expected),
        "member '{}' does not hold {:?}",
        key,
        expected
    );
}

macro_rules! slots_mut {
    ($handle:expr, $key:expr, $data_type:expr, $accessor:ident) => {{
        if !setup_key($handle, $key) {
            return;
        }
        expect_type($handle, $key, $data_type);
        match $handle.$accessor() {
            Some(slots) => slots,
            None => return,
        }
    }};
}

macro_rules! slots {
    ($handle:expr, $key:expr, $data_type:expr, $accessor:ident) => {{
        if !setup_key($handle, $key) {
            return None;
        }
        expect_type($handle, $key, $data_type);
        $handle.$accessor()?
    }};
}

pub fn put_bool(handle: &mut Handle, key: &str, value: bool) {
    let slots = slots_mut!(handle, key, DataType::Boolean, as_boolean_mut);
    slots[0] = value;
}

pub fn put_float(handle: &mut Handle, key: &str, value: f64) {
    let slots = slots_mut!(handle, key, DataType::Double, as_double_mut);
    slots[0] = value;
}

pub fn put_int(handle: &mut Handle, key: &str, value: i32) {
    let slots = slots_mut!(handle, key, DataType::Int32, as_int32_mut);
    slots[0] = value;
}

pub fn put_string(handle: &mut Handle, key: &str, value: &str) {
    let slots = slots_mut!(handle, key, DataType::Text, as_text_mut);
    if slots[0].set(value) {
        debug!("put_string: '{}' truncated to {} characters", key, slots[0].len());
    }
}

pub fn put_bool_array(handle: &mut Handle, key: &str, values: &[bool]) {
    let slots = slots_mut!(handle, key, DataType::Boolean, as_boolean_mut);
    copy_capped(slots, values);
}

pub fn put_float_array(handle: &mut Handle, key: &str, values: &[f64]) {
    let slots = slots_mut!(handle, key, DataType::Double, as_double_mut);
    copy_capped(slots, values);
}

pub fn put_int_array(handle: &mut Handle, key: &str, values: &[i32]) {
    let slots = slots_mut!(handle, key, DataType::Int32, as_int32_mut);
    copy_capped(slots, values);
}

pub fn put_string_array(handle: &mut Handle, key: &str, values: &[String]) {
    let slots = slots_mut!(handle, key, DataType::Text, as_text_mut);
    for (index, slot) in slots.iter_mut().enumerate() {
        match values.get(index) {
            Some(value) => {
                slot.set(value);
            }
            None => slot.clear(),
        }
    }
}

fn copy_capped<T: Copy>(slots: &mut [T], values: &[T]) {
    let count = values.len().min(slots.len());
    slots[..count].copy_from_slice(&values[..count]);
}

/// Writes `value` into the member `key`. Keys without a member are skipped.
pub fn put_value(handle: &mut Handle, key: &str, value: &AttributeValue) {
    match value {
        AttributeValue::Bool(value) => put_bool(handle, key, *value),
        AttributeValue::Float(value) => put_float(handle, key, *value),
        AttributeValue::Int(value) => put_int(handle, key, *value),
        AttributeValue::String(value) => put_string(handle, key, value),
        AttributeValue::BoolArray(values) => put_bool_array(handle, key, values),
        AttributeValue::FloatArray(values) => put_float_array(handle, key, values),
        AttributeValue::IntArray(values) => put_int_array(handle, key, values),
        AttributeValue::StringArray(values) => put_string_array(handle, key, values),
    }
}

pub fn get_bool(handle: &mut Handle, key: &str) -> Option<bool> {
    let slots = slots!(handle, key, DataType::Boolean, as_boolean);
    slots.first().copied()
}

pub fn get_float(handle: &mut Handle, key: &str) -> Option<f64> {
    let slots = slots!(handle, key, DataType::Double, as_double);
    slots.first().copied()
}

pub fn get_int(handle: &mut Handle, key: &str) -> Option<i32> {
    let slots = slots!(handle, key, DataType::Int32, as_int32);
    slots.first().copied()
}

pub fn get_string(handle: &mut Handle, key: &str) -> Option<String> {
    let slots = slots!(handle, key, DataType::Text, as_text);
    slots.first().map(ToString::to_string)
}

pub fn get_bool_array<'h>(handle: &'h mut Handle, key: &str) -> Option<&'h [bool]> {
    let handle: &'h Handle = position(handle, key, DataType::Boolean)?;
    handle.as_boolean()
}

pub fn get_float_array<'h>(handle: &'h mut Handle, key: &str) -> Option<&'h [f64]> {
    let handle: &'h Handle = position(handle, key, DataType::Double)?;
    handle.as_double()
}

pub fn get_int_array<'h>(handle: &'h mut Handle, key: &str) -> Option<&'h [i32]> {
    let handle: &'h Handle = position(handle, key, DataType::Int32)?;
    handle.as_int32()
}

pub fn get_string_array(handle: &mut Handle, key: &str) -> Option<Vec<String>> {
    let slots = slots!(handle, key, DataType::Text, as_text);
    Some(slots.iter().map(ToString::to_string).collect())
}

fn position<'h>(handle: &'h mut Handle, key: &str, data_type: DataType) -> Option<&'h Handle> {
    if !setup_key(handle, key) {
        return None;
    }
    expect_type(handle, key, data_type);
    Some(&*handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(descriptors: &[Descriptor]) -> Handle {
        let mut registry = StructureRegistry::new();
        let structure = register_structure(&mut registry, "test", descriptors).unwrap();
        Handle::new(structure)
    }

    #[test]
    fn layout_reserves_fixed_slots() {
        assert_eq!(member_layout(AttributeType::Float), (DataType::Double, 1));
        assert_eq!(
            member_layout(AttributeType::StringArray),
            (DataType::Text, MAX_ARRAY_SIZE)
        );
        let handle = record(&[
            Descriptor::new("color", AttributeType::FloatArray),
            Descriptor::new("name", AttributeType::String),
        ]);
        let members = handle.structure().members();
        assert_eq!(members[0].length, MAX_ARRAY_SIZE);
        assert_eq!(members[1].data_type, DataType::Text);
    }

    #[test]
    fn scalars_read_back() {
        let mut handle = record(&[
            Descriptor::new("visible", AttributeType::Bool),
            Descriptor::new("opacity", AttributeType::Float),
            Descriptor::new("level", AttributeType::Int),
            Descriptor::new("name", AttributeType::String),
        ]);
        put_bool(&mut handle, "visible", true);
        put_float(&mut handle, "opacity", 0.25);
        put_int(&mut handle, "level", -3);
        put_string(&mut handle, "name", "facade");
        assert_eq!(get_bool(&mut handle, "visible"), Some(true));
        assert_eq!(get_float(&mut handle, "opacity"), Some(0.25));
        assert_eq!(get_int(&mut handle, "level"), Some(-3));
        assert_eq!(get_string(&mut handle, "name").as_deref(), Some("facade"));
    }

    #[test]
    fn float_array_keeps_written_values() {
        let mut handle = record(&[Descriptor::new("color", AttributeType::FloatArray)]);
        put_float_array(&mut handle, "color", &[0.1, 0.2, 0.3]);
        let values = get_float_array(&mut handle, "color").unwrap();
        assert_eq!(&values[..3], &[0.1, 0.2, 0.3]);
        assert_eq!(&values[3..], &[0.0, 0.0]);
    }

    #[test]
    fn float_array_drops_overflow() {
        let mut handle = record(&[Descriptor::new("trafo", AttributeType::FloatArray)]);
        put_float_array(&mut handle, "trafo", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let values = get_float_array(&mut handle, "trafo").unwrap();
        assert_eq!(values, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn long_strings_are_truncated() {
        let mut handle = record(&[Descriptor::new("texture", AttributeType::String)]);
        let long: String = "x".repeat(450);
        put_string(&mut handle, "texture", &long);
        let value = get_string(&mut handle, "texture").unwrap();
        assert_eq!(value.chars().count(), MAX_STRING_LENGTH - 1);
        assert_eq!(value.as_str(), &long[..399]);

        put_string(&mut handle, "texture", "");
        assert_eq!(get_string(&mut handle, "texture").as_deref(), Some(""));
    }

    #[test]
    fn string_arrays_terminate_each_slot() {
        let mut handle = record(&[Descriptor::new("maps", AttributeType::StringArray)]);
        let values: Vec<String> = ["a.png", "b.png"].iter().map(|s| s.to_string()).collect();
        put_string_array(&mut handle, "maps", &values);
        let read = get_string_array(&mut handle, "maps").unwrap();
        assert_eq!(read, vec!["a.png", "b.png", "", "", ""]);

        put_string_array(&mut handle, "maps", &values[1..]);
        let read = get_string_array(&mut handle, "maps").unwrap();
        assert_eq!(read[0], "b.png");
        assert_eq!(read[1], "");
    }

    #[test]
    fn int_and_bool_arrays_round_trip() {
        let mut handle = record(&[
            Descriptor::new("ids", AttributeType::IntArray),
            Descriptor::new("flags", AttributeType::BoolArray),
        ]);
        put_value(&mut handle, "ids", &AttributeValue::IntArray(vec![4, 5]));
        put_value(&mut handle, "flags", &AttributeValue::BoolArray(vec![true; 6]));
        assert_eq!(get_int_array(&mut handle, "ids").unwrap(), &[4, 5, 0, 0, 0]);
        assert_eq!(get_bool_array(&mut handle, "flags").unwrap(), &[true; 5]);
    }

    #[test]
    fn unknown_members_are_skipped() {
        let mut handle = record(&[Descriptor::new("opacity", AttributeType::Float)]);
        put_float(&mut handle, "missing", 2.0);
        assert_eq!(get_float(&mut handle, "missing"), None);
        assert_eq!(get_float(&mut handle, "opacity"), Some(0.0));
    }

    #[test]
    #[should_panic(expected = "does not hold")]
    fn type_mismatch_is_fatal() {
        let mut handle = record(&[Descriptor::new("opacity", AttributeType::Float)]);
        put_int(&mut handle, "opacity", 1);
    }

    #[test]
    fn registering_twice_replaces_layout() {
        let mut registry = StructureRegistry::new();
        register_structure(
            &mut registry,
            "mat",
            &[Descriptor::new("a", AttributeType::Float)],
        )
        .unwrap();
        let replaced = register_structure(
            &mut registry,
            "mat",
            &[Descriptor::new("b", AttributeType::String)],
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(replaced.member("a").is_none());
        assert_eq!(
            registry.structure_by_name("mat").unwrap().member("b").unwrap().data_type,
            DataType::Text
        );
    }
}
