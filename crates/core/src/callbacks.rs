use serlio_scene::{Associations, MeshFn, StructureRegistry};
use tracing::{debug, error};

use crate::attributes::{AttributeMap, AttributeMapBuilder};
use crate::error::{host_check, BuildError};
use crate::geometry::GeneratedMesh;
use crate::material_metadata::assign_material_metadata;
use crate::mesh::build_mesh;
use crate::settings::CallbackSettings;

/// Receiving side of the generation engine's output stream.
///
/// Attribute calls may arrive any number of times before the single
/// `add_mesh` call that delivers one initial shape's consolidated geometry.
pub trait Callbacks {
    fn add_mesh(&mut self, mesh: &GeneratedMesh) -> Result<(), BuildError>;

    fn attr_bool(&mut self, key: &str, value: bool);
    fn attr_float(&mut self, key: &str, value: f64);
    fn attr_string(&mut self, key: &str, value: &str);
    fn attr_bool_array(&mut self, key: &str, values: &[bool]);
    fn attr_float_array(&mut self, key: &str, values: &[f64]);
    fn attr_string_array(&mut self, key: &str, values: &[String]);
}

/// Writes generated geometry into a host output mesh.
///
/// The output is only touched once a complete mesh and its material metadata
/// have been built, so a failed call leaves it as it was.
pub struct MeshCallbacks<'a, M: MeshFn + Default> {
    input_metadata: Associations,
    output: &'a mut M,
    registry: &'a mut StructureRegistry,
    settings: CallbackSettings,
    builder: AttributeMapBuilder,
}

impl<'a, M: MeshFn + Default> MeshCallbacks<'a, M> {
    pub fn new(
        input_metadata: Associations,
        output: &'a mut M,
        registry: &'a mut StructureRegistry,
        settings: CallbackSettings,
    ) -> Self {
        Self {
            input_metadata,
            output,
            registry,
            settings,
            builder: AttributeMapBuilder::new(),
        }
    }

    pub fn settings(&self) -> &CallbackSettings {
        &self.settings
    }

    /// Snapshot of the attributes reported so far.
    pub fn attribute_map(&self) -> AttributeMap {
        self.builder.create_attribute_map()
    }

    pub fn take_attributes(&mut self) -> AttributeMap {
        self.builder.take()
    }

    fn try_add_mesh(&mut self, mesh: &GeneratedMesh) -> Result<(), BuildError> {
        let built: M = build_mesh(mesh, &self.settings)?;
        let metadata = assign_material_metadata(
            self.registry,
            &self.input_metadata,
            &mesh.face_ranges,
            &mesh.materials,
            &self.settings,
        )?;

        host_check!(self.output.copy_in_place(&built));
        let metadata = metadata.unwrap_or_else(|| self.input_metadata.clone());
        self.output.set_metadata(metadata);
        Ok(())
    }
}

impl<M: MeshFn + Default> Callbacks for MeshCallbacks<'_, M> {
    fn add_mesh(&mut self, mesh: &GeneratedMesh) -> Result<(), BuildError> {
        debug!("add_mesh: {} faces", mesh.face_count());
        let result = self.try_add_mesh(mesh);
        if let Err(err) = &result {
            error!("add_mesh failed: {}", err);
        }
        result
    }

    fn attr_bool(&mut self, key: &str, value: bool) {
        self.builder.set_bool(key, value);
    }

    fn attr_float(&mut self, key: &str, value: f64) {
        self.builder.set_float(key, value);
    }

    fn attr_string(&mut self, key: &str, value: &str) {
        self.builder.set_string(key, value);
    }

    fn attr_bool_array(&mut self, key: &str, values: &[bool]) {
        self.builder.set_bool_array(key, values);
    }

    fn attr_float_array(&mut self, key: &str, values: &[f64]) {
        self.builder.set_float_array(key, values);
    }

    fn attr_string_array(&mut self, key: &str, values: &[String]) {
        self.builder.set_string_array(key, values);
    }
}
