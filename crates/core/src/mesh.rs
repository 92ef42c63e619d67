use glam::DVec3;
use serlio_scene::{MeshFn, DEFAULT_UV_SET};
use tracing::debug;

use crate::error::{host_check, BuildError};
use crate::geometry::{GeneratedMesh, UvChannel};
use crate::settings::CallbackSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUvOrder {
    pub host_set_name: &'static str,
    pub host_set_index: u8,
    pub engine_set_index: u8,
}

const fn uv_order(
    host_set_name: &'static str,
    host_set_index: u8,
    engine_set_index: u8,
) -> TextureUvOrder {
    TextureUvOrder {
        host_set_name,
        host_set_index,
        engine_set_index,
    }
}

// Shaders that only read the first four host sets get the most used maps.
pub const TEXTURE_UV_ORDERS: [TextureUvOrder; 10] = [
    uv_order(DEFAULT_UV_SET, 0, 0), // colormap
    uv_order("dirtMap", 1, 2),
    uv_order("normalMap", 2, 5),
    uv_order("opacityMap", 3, 4),
    uv_order("bumpMap", 4, 1),
    uv_order("specularMap", 5, 3),
    uv_order("emissiveMap", 6, 6),
    uv_order("occlusionMap", 7, 7),
    uv_order("roughnessMap", 8, 8),
    uv_order("metallicMap", 9, 9),
];

/// Builds a fresh host mesh from engine buffers. The result is not attached
/// anywhere; callers copy it into their output once every step succeeded.
pub fn build_mesh<M>(mesh: &GeneratedMesh, settings: &CallbackSettings) -> Result<M, BuildError>
where
    M: MeshFn + Default,
{
    mesh.validate()?;
    debug!(
        "build_mesh: {} vertices, {} faces, {} indices, {} uv channels, {} face ranges",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.vertex_indices.len(),
        mesh.uv_sets.len(),
        mesh.face_ranges.len()
    );

    let positions = mesh
        .vertices
        .chunks_exact(3)
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();

    let mut host = M::default();
    host_check!(host.create(
        positions,
        mesh.face_counts.clone(),
        mesh.vertex_indices.clone()
    ));
    host.clear_uvs();

    if settings.emit_uvs {
        attach_uv_sets(&mut host, &mesh.uv_sets)?;
    }

    if settings.emit_normals && mesh.has_normals() {
        let (normals, faces) =
            expand_normals(&mesh.face_counts, &mesh.normals, &mesh.normal_indices)?;
        host_check!(host.set_face_vertex_normals(normals, faces, mesh.vertex_indices.clone()));
    }

    Ok(host)
}

pub fn attach_uv_sets<M: MeshFn>(host: &mut M, uv_sets: &[UvChannel]) -> Result<(), BuildError> {
    if uv_sets.is_empty() {
        return Ok(());
    }

    for order in TEXTURE_UV_ORDERS {
        let engine_index = order.engine_set_index as usize;
        let name = order.host_set_name;

        let Some(channel) = uv_sets.get(engine_index).filter(|uvs| !uvs.is_empty()) else {
            // empty sets keep the positions of the sets after them
            if engine_index > 0 {
                host_check!(host.create_uv_set(name));
            }
            continue;
        };

        if engine_index != 0 {
            host_check!(host.create_uv_set(name));
        }

        let (u, v): (Vec<f32>, Vec<f32>) = channel
            .coords
            .chunks_exact(2)
            .map(|uv| (uv[0] as f32, uv[1] as f32))
            .unzip();
        host_check!(host.set_uvs(u, v, name));
        host_check!(host.assign_uvs(channel.counts.clone(), channel.indices.clone(), name));
    }

    Ok(())
}

/// Resolves one normal per face corner, in face-table order, together with the
/// face each corner belongs to.
pub fn expand_normals(
    face_counts: &[u32],
    normals: &[f64],
    normal_indices: &[u32],
) -> Result<(Vec<DVec3>, Vec<u32>), BuildError> {
    let corners = crate::geometry::corner_count(face_counts);
    if corners != normal_indices.len() {
        return Err(BuildError::NormalIndexCount {
            expected: corners,
            actual: normal_indices.len(),
        });
    }

    let normal_count = normals.len() / 3;
    let mut expanded = Vec::with_capacity(corners);
    let mut faces = Vec::with_capacity(corners);
    let mut corner = 0;
    for (face, count) in face_counts.iter().enumerate() {
        for _ in 0..*count {
            let index = normal_indices[corner];
            let base = index as usize * 3;
            if index as usize >= normal_count {
                return Err(BuildError::NormalIndex {
                    index,
                    normal_count,
                });
            }
            expanded.push(DVec3::new(normals[base], normals[base + 1], normals[base + 2]));
            faces.push(face as u32);
            corner += 1;
        }
    }

    Ok((expanded, faces))
}

#[cfg(test)]
mod tests {
    use serlio_scene::HostMesh;

    use super::*;

    fn quad_with_uvs(uv_sets: Vec<UvChannel>) -> GeneratedMesh {
        GeneratedMesh {
            vertices: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0,
            ],
            face_counts: vec![4],
            vertex_indices: vec![0, 1, 2, 3],
            uv_sets,
            ..GeneratedMesh::default()
        }
    }

    fn unit_square_uvs() -> UvChannel {
        UvChannel {
            coords: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            counts: vec![4],
            indices: vec![0, 1, 2, 3],
        }
    }

    #[test]
    fn uv_order_is_a_permutation() {
        let mut engine: Vec<u8> = TEXTURE_UV_ORDERS.iter().map(|o| o.engine_set_index).collect();
        engine.sort_unstable();
        assert_eq!(engine, (0..10).collect::<Vec<u8>>());
        for (position, order) in TEXTURE_UV_ORDERS.iter().enumerate() {
            assert_eq!(order.host_set_index as usize, position);
        }
    }

    #[test]
    fn no_channels_create_no_sets() {
        let mesh = quad_with_uvs(Vec::new());
        let host: HostMesh = build_mesh(&mesh, &CallbackSettings::default()).unwrap();
        assert_eq!(host.uv_set_names(), vec![DEFAULT_UV_SET]);
        assert!(host.uv_sets[0].is_empty());
    }

    #[test]
    fn channels_follow_host_order() {
        let mut uv_sets = vec![UvChannel::default(); 5];
        uv_sets[0] = unit_square_uvs();
        uv_sets[2] = unit_square_uvs();
        uv_sets[4] = UvChannel {
            coords: vec![0.5, 0.5],
            counts: vec![4],
            indices: vec![0, 0, 0, 0],
        };
        let mesh = quad_with_uvs(uv_sets);
        let host: HostMesh = build_mesh(&mesh, &CallbackSettings::default()).unwrap();

        assert_eq!(
            host.uv_set_names(),
            vec![
                "map1",
                "dirtMap",
                "normalMap",
                "opacityMap",
                "bumpMap",
                "specularMap",
                "emissiveMap",
                "occlusionMap",
                "roughnessMap",
                "metallicMap",
            ]
        );
        assert_eq!(host.uv_sets[0].uv_count(), 4);
        assert_eq!(host.uv_sets[1].uv_count(), 4);
        assert!(host.uv_sets[2].is_empty());
        assert_eq!(host.uv_sets[3].u, vec![0.5]);
        assert_eq!(host.uv_sets[3].indices, vec![0, 0, 0, 0]);
        assert!(host.uv_sets[4].is_empty());
    }

    #[test]
    fn missing_color_channel_keeps_default_set_empty() {
        let uv_sets = vec![UvChannel::default(), unit_square_uvs()];
        let mesh = quad_with_uvs(uv_sets);
        let host: HostMesh = build_mesh(&mesh, &CallbackSettings::default()).unwrap();
        assert!(host.uv_set(DEFAULT_UV_SET).unwrap().is_empty());
        assert_eq!(host.uv_set("bumpMap").unwrap().uv_count(), 4);
        assert_eq!(host.uv_sets[4].name, "bumpMap");
    }

    #[test]
    fn uvs_can_be_disabled() {
        let mesh = quad_with_uvs(vec![unit_square_uvs()]);
        let settings = CallbackSettings {
            emit_uvs: false,
            ..CallbackSettings::default()
        };
        let host: HostMesh = build_mesh(&mesh, &settings).unwrap();
        assert!(host.uv_sets[0].is_empty());
    }

    #[test]
    fn normals_expand_per_corner() {
        let face_counts = [3, 3];
        let normals = [0.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let normal_indices = [0, 0, 0, 1, 1, 0];
        let (expanded, faces) = expand_normals(&face_counts, &normals, &normal_indices).unwrap();
        assert_eq!(expanded.len(), normal_indices.len());
        for (corner, index) in normal_indices.iter().enumerate() {
            let base = *index as usize * 3;
            assert_eq!(
                expanded[corner],
                DVec3::new(normals[base], normals[base + 1], normals[base + 2])
            );
        }
        assert_eq!(faces, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn normal_index_out_of_range_fails() {
        let err = expand_normals(&[3], &[0.0, 0.0, 1.0], &[0, 1, 0]).unwrap_err();
        assert_eq!(
            err,
            BuildError::NormalIndex {
                index: 1,
                normal_count: 1
            }
        );
    }

    #[test]
    fn build_attaches_face_vertex_normals() {
        let mut mesh = quad_with_uvs(Vec::new());
        mesh.normals = vec![0.0, 1.0, 0.0];
        mesh.normal_indices = vec![0, 0, 0, 0];
        let host: HostMesh = build_mesh(&mesh, &CallbackSettings::default()).unwrap();
        let normals = host.face_vertex_normals.expect("normals");
        assert_eq!(normals.normals, vec![DVec3::Y; 4]);
        assert_eq!(normals.faces, vec![0; 4]);
        assert_eq!(normals.vertices, vec![0, 1, 2, 3]);
        assert_eq!(host.face_counts, vec![4]);
        assert_eq!(host.positions[2], [1.0, 0.0, 1.0]);
    }
}
