use serlio_scene::{Associations, Channel, DataStream, Handle, StructureRegistry};
use tracing::debug;

use crate::attributes::{AttributeMap, AttributeType};
use crate::codec::{put_int, put_value, register_structure, Descriptor};
use crate::error::{host_check, BuildError};
use crate::settings::{CallbackSettings, SchemaMode};

pub const FACE_INDEX_START: &str = "faceIndexStart";
pub const FACE_INDEX_END: &str = "faceIndexEnd";

/// Record layout for the per-range material records: the two face index
/// members followed by one member per material key.
pub fn material_descriptors(materials: &[AttributeMap], mode: SchemaMode) -> Vec<Descriptor> {
    let mut descriptors = vec![
        Descriptor::new(FACE_INDEX_START, AttributeType::Int),
        Descriptor::new(FACE_INDEX_END, AttributeType::Int),
    ];

    let sources = match mode {
        SchemaMode::FirstRange => &materials[..materials.len().min(1)],
        SchemaMode::Union => materials,
    };
    for material in sources {
        for (key, value) in material.iter() {
            if descriptors.iter().any(|descriptor| descriptor.key == key) {
                continue;
            }
            descriptors.push(Descriptor::new(key, value.value_type()));
        }
    }

    descriptors
}

/// Builds the material channel for a mesh with several face ranges.
///
/// Returns `None` for single-material meshes, in which case nothing is
/// registered. Otherwise the structure named in `settings` is (re)registered
/// and a copy of `base` carrying a fresh material channel is returned; `base`
/// itself and every mesh sharing it stay untouched.
pub fn assign_material_metadata(
    registry: &mut StructureRegistry,
    base: &Associations,
    face_ranges: &[u32],
    materials: &[AttributeMap],
    settings: &CallbackSettings,
) -> Result<Option<Associations>, BuildError> {
    if face_ranges.len() <= 1 || materials.is_empty() {
        return Ok(None);
    }

    let descriptors = material_descriptors(materials, settings.schema_mode);
    let structure = host_check!(register_structure(
        registry,
        &settings.material_structure,
        &descriptors
    ));

    let mut stream = DataStream::new(structure.clone(), settings.material_stream.as_str());
    for (index, range) in face_ranges.windows(2).enumerate() {
        let Some(material) = materials.get(index) else {
            break;
        };

        let mut handle = Handle::new(structure.clone());
        for (key, value) in material.iter() {
            put_value(&mut handle, key, value);
        }
        put_int(&mut handle, FACE_INDEX_START, range[0] as i32);
        put_int(&mut handle, FACE_INDEX_END, range[1] as i32);

        host_check!(stream.set_element(index, handle));
    }
    debug!(
        "assign_material_metadata: {} records, {} members",
        stream.element_count(),
        structure.members().len()
    );

    let mut metadata = base.clone();
    metadata.make_unique();
    let mut channel = Channel::new(settings.material_channel.as_str());
    channel.set_data_stream(stream);
    metadata.set_channel(channel);

    Ok(Some(metadata))
}

#[cfg(test)]
mod tests {
    use crate::attributes::AttributeValue;
    use crate::codec::{get_float_array, get_int, get_string};

    use super::*;

    fn material(name: &str, color: [f64; 3]) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert("name", AttributeValue::String(name.to_string()));
        map.insert("diffuseColor", AttributeValue::FloatArray(color.to_vec()));
        map
    }

    fn stream(metadata: &Associations) -> &DataStream {
        metadata
            .channel(crate::settings::MATERIAL_CHANNEL)
            .and_then(|channel| channel.data_stream(crate::settings::MATERIAL_STREAM))
            .expect("material stream")
    }

    #[test]
    fn single_range_is_a_no_op() {
        let mut registry = StructureRegistry::new();
        let result = assign_material_metadata(
            &mut registry,
            &Associations::new(),
            &[0],
            &[material("a", [1.0, 0.0, 0.0])],
            &CallbackSettings::default(),
        )
        .unwrap();
        assert!(result.is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn one_record_per_range() {
        let mut registry = StructureRegistry::new();
        let materials = vec![material("wall", [1.0, 0.0, 0.0]), material("roof", [0.0, 0.0, 1.0])];
        let metadata = assign_material_metadata(
            &mut registry,
            &Associations::new(),
            &[0, 4, 6],
            &materials,
            &CallbackSettings::default(),
        )
        .unwrap()
        .expect("metadata");

        let stream = stream(&metadata);
        assert_eq!(stream.element_count(), 2);

        let mut first = stream.element(0).unwrap().clone();
        assert_eq!(get_int(&mut first, FACE_INDEX_START), Some(0));
        assert_eq!(get_int(&mut first, FACE_INDEX_END), Some(4));
        assert_eq!(get_string(&mut first, "name").as_deref(), Some("wall"));

        let mut second = stream.element(1).unwrap().clone();
        assert_eq!(get_int(&mut second, FACE_INDEX_START), Some(4));
        assert_eq!(get_int(&mut second, FACE_INDEX_END), Some(6));
        assert_eq!(
            &get_float_array(&mut second, "diffuseColor").unwrap()[..3],
            &[0.0, 0.0, 1.0]
        );
        assert!(registry.structure_by_name(crate::settings::MATERIAL_STRUCTURE).is_some());
    }

    #[test]
    fn later_keys_follow_schema_mode() {
        let first = material("wall", [1.0, 1.0, 1.0]);
        let mut second = material("roof", [0.5, 0.5, 0.5]);
        second.insert("opacity", AttributeValue::Float(0.5));
        let materials = vec![first, second];

        let keys = |mode| {
            material_descriptors(&materials, mode)
                .into_iter()
                .map(|descriptor| descriptor.key)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            keys(SchemaMode::FirstRange),
            vec![FACE_INDEX_START, FACE_INDEX_END, "name", "diffuseColor"]
        );
        assert_eq!(
            keys(SchemaMode::Union),
            vec![FACE_INDEX_START, FACE_INDEX_END, "name", "diffuseColor", "opacity"]
        );

        let mut registry = StructureRegistry::new();
        let metadata = assign_material_metadata(
            &mut registry,
            &Associations::new(),
            &[0, 1, 2],
            &materials,
            &CallbackSettings::default(),
        )
        .unwrap()
        .expect("metadata");
        let mut record = stream(&metadata).element(1).unwrap().clone();
        assert_eq!(crate::codec::get_float(&mut record, "opacity"), None);
    }

    #[test]
    fn schema_follows_latest_invocation() {
        let mut registry = StructureRegistry::new();
        let settings = CallbackSettings::default();
        let base = Associations::new();
        assign_material_metadata(
            &mut registry,
            &base,
            &[0, 1, 2],
            &[material("a", [0.0; 3]), material("b", [0.0; 3])],
            &settings,
        )
        .unwrap();

        let mut other = AttributeMap::new();
        other.insert("shininess", AttributeValue::Int(3));
        assign_material_metadata(&mut registry, &base, &[0, 1, 2], &[other.clone(), other], &settings)
            .unwrap();

        let structure = registry
            .structure_by_name(&settings.material_structure)
            .unwrap();
        assert!(structure.member("name").is_none());
        assert!(structure.member("shininess").is_some());
    }

    #[test]
    fn base_metadata_is_not_modified() {
        let mut base = Associations::new();
        base.set_channel(Channel::new("other"));
        base.set_channel(Channel::new(crate::settings::MATERIAL_CHANNEL));
        let shared = base.clone();

        let mut registry = StructureRegistry::new();
        let metadata = assign_material_metadata(
            &mut registry,
            &base,
            &[0, 1, 2],
            &[material("a", [0.0; 3]), material("b", [0.0; 3])],
            &CallbackSettings::default(),
        )
        .unwrap()
        .expect("metadata");

        assert!(shared.shares_storage_with(&base));
        assert!(!metadata.shares_storage_with(&base));
        assert!(metadata.channel("other").is_some());
        assert_eq!(
            base.channel(crate::settings::MATERIAL_CHANNEL)
                .unwrap()
                .stream_count(),
            0
        );
        assert_eq!(
            metadata
                .channel(crate::settings::MATERIAL_CHANNEL)
                .unwrap()
                .stream_count(),
            1
        );
    }
}
