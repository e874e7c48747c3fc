//! Vertex normal generation

use glam::Vec3;

/// Unnormalized triangle normal; its length is twice the triangle area
pub fn triangle_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Vec3 {
    let a = Vec3::from(a);
    (Vec3::from(b) - a).cross(Vec3::from(c) - a)
}

/// Area-weighted vertex normals for an indexed triangle list
///
/// Each triangle adds its unnormalized face normal to its three vertices, so
/// larger faces pull harder. Vertices not used by any triangle (or only by
/// degenerate ones) get a zero normal. Indices must be in range.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let n = triangle_normal(positions[i0], positions[i1], positions[i2]);
        accum[i0] += n;
        accum[i1] += n;
        accum[i2] += n;
    }

    accum
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_single_triangle_normals() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn test_area_weighting() {
        // Shared edge 0-1; large triangle faces +Z, small one faces -Y.
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, -0.1],
        ];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2, 0, 3, 1]);
        let shared = Vec3::from(normals[0]);
        assert_relative_eq!(shared.length(), 1.0, epsilon = 1e-6);
        assert!(shared.z > 0.99);
        assert!(Vec3::from(normals[2]).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(Vec3::from(normals[3]).abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn test_unused_vertex_gets_zero_normal() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], [0.0, 0.0, 0.0]);
    }
}
