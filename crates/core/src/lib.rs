mod attributes;
mod callbacks;
mod codec;
mod encoder;
mod error;
mod geometry;
mod material_info;
mod material_metadata;
mod mesh;
mod rule_attributes;
mod seed;
mod settings;

pub use attributes::{AttributeMap, AttributeMapBuilder, AttributeType, AttributeValue};
pub use callbacks::{Callbacks, MeshCallbacks};
pub use codec::{
    get_bool, get_bool_array, get_float, get_float_array, get_int, get_int_array, get_string,
    get_string_array, member_layout, put_bool, put_bool_array, put_float, put_float_array,
    put_int, put_int_array, put_string, put_string_array, put_value, register_structure,
    Descriptor, MAX_ARRAY_SIZE, MAX_STRING_LENGTH,
};
pub use encoder::{consolidate, encode, EncodedFace, EncodedGeometry};
pub use error::BuildError;
pub use geometry::{GeneratedMesh, UvChannel};
pub use material_info::{
    face_range, materials_by_stream, MaterialCache, MaterialColor, MaterialInfo, MaterialTrafo,
};
pub use material_metadata::{
    assign_material_metadata, material_descriptors, FACE_INDEX_END, FACE_INDEX_START,
};
pub use mesh::{attach_uv_sets, build_mesh, expand_normals, TextureUvOrder, TEXTURE_UV_ORDERS};
pub use rule_attributes::{
    brief_name, compare_attributes, full_name, get_rule_attributes, global_group_order,
    main_rule_name, nice_name, sort_rule_attributes, Annotation, AnnotationArgument,
    AttributeGroupOrder, Order, RuleAttribute, RuleAttributes, RuleFileEntry, RuleFileInfo,
    RuleValueType, ANNOT_GROUP, ANNOT_HIDDEN, ANNOT_ORDER,
};
pub use seed::{compute_point_seed, compute_seed, seed_from_point};
pub use settings::{
    CallbackSettings, SchemaMode, MATERIAL_CHANNEL, MATERIAL_STREAM, MATERIAL_STRUCTURE,
};
