use glam::Vec3;

const SEED_MODULUS: i32 = 714025;

/// Seed derived from the bit patterns of a point's x and z coordinates.
pub fn seed_from_point(point: Vec3) -> i32 {
    let seed = point.x.to_bits() as i32 ^ point.z.to_bits() as i32;
    seed % SEED_MODULUS
}

/// Seed of an interleaved `xyz` vertex buffer.
///
/// The coordinate sum is divided by the number of scalars rather than the
/// number of points, so the point fed to [`seed_from_point`] is a third of
/// the centroid. Existing scenes depend on these values.
pub fn compute_seed(vertices: &[f64]) -> i32 {
    if vertices.is_empty() {
        return seed_from_point(Vec3::ZERO);
    }
    let sum = vertices
        .chunks_exact(3)
        .fold(Vec3::ZERO, |sum, p| {
            sum + Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32)
        });
    seed_from_point(sum / vertices.len() as f32)
}

/// Seed of a point list, averaged over the point count.
pub fn compute_point_seed(points: &[Vec3]) -> i32 {
    if points.is_empty() {
        return seed_from_point(Vec3::ZERO);
    }
    let sum: Vec3 = points.iter().copied().sum();
    seed_from_point(sum / points.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_mixes_x_and_z_bits() {
        let point = Vec3::new(1.0, 7.0, 2.0);
        let expected = (1.0f32.to_bits() as i32 ^ 2.0f32.to_bits() as i32) % 714025;
        assert_eq!(seed_from_point(point), expected);
        assert_eq!(seed_from_point(Vec3::new(1.0, -3.0, 2.0)), expected);
    }

    #[test]
    fn negative_bit_patterns_keep_their_sign() {
        let seed = seed_from_point(Vec3::new(-1.0, 0.0, 0.0));
        assert!(seed < 0);
        assert!(seed > -714025);
    }

    #[test]
    fn buffer_seed_divides_by_scalar_count() {
        let vertices = [3.0, 0.0, 6.0, 3.0, 0.0, 6.0];
        let expected = seed_from_point(Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(compute_seed(&vertices), expected);
    }

    #[test]
    fn point_seed_uses_centroid() {
        let points = [Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 2.0)];
        assert_eq!(
            compute_point_seed(&points),
            seed_from_point(Vec3::new(1.0, 0.0, 2.0))
        );
    }

    #[test]
    fn empty_input_is_stable() {
        assert_eq!(compute_seed(&[]), 0);
        assert_eq!(compute_point_seed(&[]), 0);
    }
}
