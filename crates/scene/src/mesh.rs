use glam::DVec3;

use crate::error::HostError;
use crate::metadata::Associations;

pub const DEFAULT_UV_SET: &str = "map1";

#[derive(Debug, Clone, PartialEq)]
pub struct UvSet {
    pub name: String,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub counts: Vec<u32>,
    pub indices: Vec<u32>,
}

impl UvSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            u: Vec::new(),
            v: Vec::new(),
            counts: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn uv_count(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty() && self.indices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceVertexNormals {
    pub normals: Vec<DVec3>,
    pub faces: Vec<u32>,
    pub vertices: Vec<u32>,
}

/// Mesh operations the translation layer issues against the host.
pub trait MeshFn {
    fn create(
        &mut self,
        positions: Vec<[f32; 3]>,
        face_counts: Vec<u32>,
        face_connects: Vec<u32>,
    ) -> Result<(), HostError>;

    fn clear_uvs(&mut self);

    fn create_uv_set(&mut self, name: &str) -> Result<(), HostError>;

    fn set_uvs(&mut self, u: Vec<f32>, v: Vec<f32>, set: &str) -> Result<(), HostError>;

    fn assign_uvs(&mut self, counts: Vec<u32>, indices: Vec<u32>, set: &str)
        -> Result<(), HostError>;

    fn set_face_vertex_normals(
        &mut self,
        normals: Vec<DVec3>,
        faces: Vec<u32>,
        vertices: Vec<u32>,
    ) -> Result<(), HostError>;

    fn copy_in_place(&mut self, source: &Self) -> Result<(), HostError>
    where
        Self: Sized;

    fn metadata(&self) -> &Associations;

    fn set_metadata(&mut self, metadata: Associations);
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostMesh {
    pub positions: Vec<[f32; 3]>,
    pub face_counts: Vec<u32>,
    pub face_connects: Vec<u32>,
    pub uv_sets: Vec<UvSet>,
    pub face_vertex_normals: Option<FaceVertexNormals>,
    pub metadata: Associations,
}

impl Default for HostMesh {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            face_counts: Vec::new(),
            face_connects: Vec::new(),
            uv_sets: vec![UvSet::new(DEFAULT_UV_SET)],
            face_vertex_normals: None,
            metadata: Associations::default(),
        }
    }
}

impl HostMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    pub fn uv_set(&self, name: &str) -> Option<&UvSet> {
        self.uv_sets.iter().find(|set| set.name == name)
    }

    pub fn uv_set_names(&self) -> Vec<&str> {
        self.uv_sets.iter().map(|set| set.name.as_str()).collect()
    }

    fn uv_set_mut(&mut self, name: &str) -> Result<&mut UvSet, HostError> {
        self.uv_sets
            .iter_mut()
            .find(|set| set.name == name)
            .ok_or_else(|| HostError::UnknownUvSet(name.to_string()))
    }
}

impl MeshFn for HostMesh {
    fn create(
        &mut self,
        positions: Vec<[f32; 3]>,
        face_counts: Vec<u32>,
        face_connects: Vec<u32>,
    ) -> Result<(), HostError> {
        let corners: usize = face_counts.iter().map(|count| *count as usize).sum();
        if corners != face_connects.len() {
            return Err(HostError::LengthMismatch {
                what: "face connects",
                expected: corners,
                actual: face_connects.len(),
            });
        }
        check_indices("vertex", &face_connects, positions.len())?;

        *self = HostMesh {
            positions,
            face_counts,
            face_connects,
            ..HostMesh::default()
        };
        Ok(())
    }

    fn clear_uvs(&mut self) {
        self.uv_sets = vec![UvSet::new(DEFAULT_UV_SET)];
    }

    fn create_uv_set(&mut self, name: &str) -> Result<(), HostError> {
        if self.uv_set(name).is_some() {
            return Err(HostError::DuplicateUvSet(name.to_string()));
        }
        self.uv_sets.push(UvSet::new(name));
        Ok(())
    }

    fn set_uvs(&mut self, u: Vec<f32>, v: Vec<f32>, set: &str) -> Result<(), HostError> {
        if u.len() != v.len() {
            return Err(HostError::LengthMismatch {
                what: "uv coordinates",
                expected: u.len(),
                actual: v.len(),
            });
        }
        let uv_set = self.uv_set_mut(set)?;
        uv_set.u = u;
        uv_set.v = v;
        Ok(())
    }

    fn assign_uvs(
        &mut self,
        counts: Vec<u32>,
        indices: Vec<u32>,
        set: &str,
    ) -> Result<(), HostError> {
        let face_count = self.face_count();
        if counts.len() != face_count {
            return Err(HostError::LengthMismatch {
                what: "uv counts",
                expected: face_count,
                actual: counts.len(),
            });
        }
        let corners: usize = counts.iter().map(|count| *count as usize).sum();
        if corners != indices.len() {
            return Err(HostError::LengthMismatch {
                what: "uv indices",
                expected: corners,
                actual: indices.len(),
            });
        }
        let uv_set = self.uv_set_mut(set)?;
        check_indices("uv", &indices, uv_set.u.len())?;
        uv_set.counts = counts;
        uv_set.indices = indices;
        Ok(())
    }

    fn set_face_vertex_normals(
        &mut self,
        normals: Vec<DVec3>,
        faces: Vec<u32>,
        vertices: Vec<u32>,
    ) -> Result<(), HostError> {
        if faces.len() != normals.len() {
            return Err(HostError::LengthMismatch {
                what: "normal face list",
                expected: normals.len(),
                actual: faces.len(),
            });
        }
        if vertices.len() != normals.len() {
            return Err(HostError::LengthMismatch {
                what: "normal vertex list",
                expected: normals.len(),
                actual: vertices.len(),
            });
        }
        check_indices("face", &faces, self.face_count())?;
        check_indices("vertex", &vertices, self.vertex_count())?;
        self.face_vertex_normals = Some(FaceVertexNormals {
            normals,
            faces,
            vertices,
        });
        Ok(())
    }

    fn copy_in_place(&mut self, source: &Self) -> Result<(), HostError> {
        self.clone_from(source);
        Ok(())
    }

    fn metadata(&self) -> &Associations {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: Associations) {
        self.metadata = metadata;
    }
}

fn check_indices(what: &'static str, indices: &[u32], len: usize) -> Result<(), HostError> {
    match indices.iter().find(|index| **index as usize >= len) {
        Some(index) => Err(HostError::IndexOutOfRange {
            what,
            index: *index as usize,
            len,
        }),
        None => Ok(()),
    }
}
