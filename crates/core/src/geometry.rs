use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMap;
use crate::error::BuildError;

/// One texture coordinate channel with its own per-face indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvChannel {
    /// Interleaved `(u, v)` pairs.
    pub coords: Vec<f64>,
    pub counts: Vec<u32>,
    pub indices: Vec<u32>,
}

impl UvChannel {
    pub fn uv_count(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Consolidated geometry of one initial shape as delivered by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedMesh {
    pub vertices: Vec<f64>,
    pub face_counts: Vec<u32>,
    pub vertex_indices: Vec<u32>,
    pub normals: Vec<f64>,
    pub normal_indices: Vec<u32>,
    pub uv_sets: Vec<UvChannel>,
    pub face_ranges: Vec<u32>,
    pub materials: Vec<AttributeMap>,
}

impl GeneratedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn material_count(&self) -> usize {
        self.face_ranges.len().saturating_sub(1)
    }

    pub fn face_range(&self, index: usize) -> Option<(u32, u32)> {
        let start = *self.face_ranges.get(index)?;
        let end = *self.face_ranges.get(index + 1)?;
        Some((start, end))
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.vertices.len() % 3 != 0 {
            return Err(BuildError::VertexStride(self.vertices.len()));
        }

        let corners = corner_count(&self.face_counts);
        if corners != self.vertex_indices.len() {
            return Err(BuildError::FaceCorners {
                expected: corners,
                actual: self.vertex_indices.len(),
            });
        }

        let vertex_count = self.vertex_count();
        if let Some(index) = self
            .vertex_indices
            .iter()
            .find(|index| **index as usize >= vertex_count)
        {
            return Err(BuildError::VertexIndex {
                index: *index,
                vertex_count,
            });
        }

        if self.has_normals() {
            if self.normals.len() % 3 != 0 {
                return Err(BuildError::VertexStride(self.normals.len()));
            }
            if self.normal_indices.len() != self.vertex_indices.len() {
                return Err(BuildError::NormalIndexCount {
                    expected: self.vertex_indices.len(),
                    actual: self.normal_indices.len(),
                });
            }
            let normal_count = self.normals.len() / 3;
            if let Some(index) = self
                .normal_indices
                .iter()
                .find(|index| **index as usize >= normal_count)
            {
                return Err(BuildError::NormalIndex {
                    index: *index,
                    normal_count,
                });
            }
        }

        for (channel, uvs) in self.uv_sets.iter().enumerate() {
            if uvs.is_empty() {
                continue;
            }
            if uvs.coords.len() % 2 != 0 {
                return Err(BuildError::UvChannel {
                    channel,
                    message: format!("{} coordinates are not (u, v) pairs", uvs.coords.len()),
                });
            }
            let uv_corners = corner_count(&uvs.counts);
            if uv_corners != uvs.indices.len() {
                return Err(BuildError::UvChannel {
                    channel,
                    message: format!(
                        "counts sum to {} but {} indices were given",
                        uv_corners,
                        uvs.indices.len()
                    ),
                });
            }
        }

        self.validate_face_ranges()
    }

    fn validate_face_ranges(&self) -> Result<(), BuildError> {
        if self.face_ranges.len() <= 1 {
            return Ok(());
        }
        if self
            .face_ranges
            .windows(2)
            .any(|pair| pair[0] > pair[1])
        {
            return Err(BuildError::FaceRanges(
                "boundaries must increase monotonically".to_string(),
            ));
        }
        let last = self.face_ranges[self.face_ranges.len() - 1] as usize;
        if last != self.face_count() {
            return Err(BuildError::FaceRanges(format!(
                "last boundary {} does not match face count {}",
                last,
                self.face_count()
            )));
        }
        if !self.materials.is_empty() && self.materials.len() != self.material_count() {
            return Err(BuildError::MaterialCount {
                ranges: self.material_count(),
                materials: self.materials.len(),
            });
        }
        Ok(())
    }
}

pub(crate) fn corner_count(counts: &[u32]) -> usize {
    counts.iter().map(|count| *count as usize).sum()
}
