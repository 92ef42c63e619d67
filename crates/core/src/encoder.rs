use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::AttributeMap;
use crate::callbacks::Callbacks;
use crate::error::BuildError;
use crate::geometry::{GeneratedMesh, UvChannel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodedFace {
    pub vertex_indices: Vec<u32>,
    pub normal_indices: Vec<u32>,
    /// Per UV channel corner indices; a missing or empty entry means the face
    /// carries no coordinates in that channel.
    pub uv_indices: Vec<Vec<u32>>,
}

/// One leaf geometry with indices local to its own buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodedGeometry {
    pub vertices: Vec<f64>,
    pub normals: Vec<f64>,
    /// Interleaved `(u, v)` pairs per UV channel.
    pub uvs: Vec<Vec<f64>>,
    pub faces: Vec<EncodedFace>,
    pub material: AttributeMap,
}

impl EncodedGeometry {
    fn has_normals(&self) -> bool {
        !self.normals.is_empty()
            && self
                .faces
                .iter()
                .all(|face| face.normal_indices.len() == face.vertex_indices.len())
    }
}

fn rebased(indices: &[u32], base: u32) -> impl Iterator<Item = u32> + '_ {
    indices.iter().map(move |index| index + base)
}

/// Merges leaf geometries into one mesh with a face range and material per
/// geometry.
///
/// Normals are only kept if every geometry has them.
pub fn consolidate(geometries: &[EncodedGeometry]) -> GeneratedMesh {
    let keep_normals = !geometries.is_empty() && geometries.iter().all(|geo| geo.has_normals());
    let uv_channel_count = geometries
        .iter()
        .map(|geo| geo.uvs.len())
        .max()
        .unwrap_or(0);

    let mut mesh = GeneratedMesh {
        uv_sets: vec![UvChannel::default(); uv_channel_count],
        face_ranges: vec![0],
        ..GeneratedMesh::default()
    };

    for geo in geometries {
        let vertex_base = (mesh.vertices.len() / 3) as u32;
        let normal_base = (mesh.normals.len() / 3) as u32;
        let uv_bases: Vec<u32> = mesh
            .uv_sets
            .iter()
            .map(|uvs| uvs.uv_count() as u32)
            .collect();

        mesh.vertices.extend_from_slice(&geo.vertices);
        if keep_normals {
            mesh.normals.extend_from_slice(&geo.normals);
        }
        for (channel, coords) in geo.uvs.iter().enumerate() {
            mesh.uv_sets[channel].coords.extend_from_slice(coords);
        }

        for face in &geo.faces {
            mesh.face_counts.push(face.vertex_indices.len() as u32);
            mesh.vertex_indices
                .extend(rebased(&face.vertex_indices, vertex_base));
            if keep_normals {
                mesh.normal_indices
                    .extend(rebased(&face.normal_indices, normal_base));
            }
            for (channel, uvs) in mesh.uv_sets.iter_mut().enumerate() {
                let indices = face
                    .uv_indices
                    .get(channel)
                    .filter(|_| channel < geo.uvs.len())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                uvs.counts.push(indices.len() as u32);
                uvs.indices.extend(rebased(indices, uv_bases[channel]));
            }
        }

        mesh.face_ranges.push(mesh.face_counts.len() as u32);
        mesh.materials.push(geo.material.clone());
    }

    mesh
}

/// Consolidates `geometries` and hands the result to `callbacks`.
pub fn encode<C: Callbacks>(
    geometries: &[EncodedGeometry],
    callbacks: &mut C,
) -> Result<(), BuildError> {
    let mesh = consolidate(geometries);
    debug!(
        "encode: {} geometries, {} vertices, {} faces",
        geometries.len(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    callbacks.add_mesh(&mesh)
}
