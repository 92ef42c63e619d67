mod error;
mod fixed_string;
mod mesh;
mod metadata;

pub use error::HostError;
pub use fixed_string::FixedString;
pub use mesh::{FaceVertexNormals, HostMesh, MeshFn, UvSet, DEFAULT_UV_SET};
pub use metadata::{
    Associations, Channel, DataStream, DataType, Handle, Member, MetadataString, Structure,
    StructureRegistry, TEXT_SLOT_LENGTH,
};
