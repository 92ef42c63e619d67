use serde::{Deserialize, Serialize};

pub const MATERIAL_STRUCTURE: &str = "prtMaterialStructure";
pub const MATERIAL_CHANNEL: &str = "prtMaterialChannel";
pub const MATERIAL_STREAM: &str = "prtMaterialStream";

/// Which face ranges contribute keys to the material record layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Keys of the first range only; keys that appear later are dropped.
    #[default]
    FirstRange,
    /// Keys of every range, typed by their first occurrence.
    Union,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackSettings {
    pub material_structure: String,
    pub material_channel: String,
    pub material_stream: String,
    pub schema_mode: SchemaMode,
    pub emit_uvs: bool,
    pub emit_normals: bool,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        Self {
            material_structure: MATERIAL_STRUCTURE.to_string(),
            material_channel: MATERIAL_CHANNEL.to_string(),
            material_stream: MATERIAL_STREAM.to_string(),
            schema_mode: SchemaMode::FirstRange,
            emit_uvs: true,
            emit_normals: true,
        }
    }
}

impl CallbackSettings {
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
