//! # Primitive Shape Generation
//!
//! Shape generators for the built-in renderable primitives. Winding is
//! counter-clockwise throughout, matching the front-face setting of every
//! pipeline in the engine.

use std::f32::consts::PI;

use super::MeshData;
use crate::gfx::rendering::vertex::Vertex;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Generate a cube spanning -1..1 on all axes.
///
/// Authored as 36 unshared vertices (6 faces x 2 triangles) so each face
/// keeps hard normals; drawn non-indexed.
pub fn generate_cube() -> MeshData {
    let size = 1.0;
    let faces: [([f32; 3], [[f32; 3]; 6]); 6] = [
        // bottom
        (
            [0.0, -1.0, 0.0],
            [
                [-size, -size, size],
                [-size, -size, -size],
                [size, -size, -size],
                [size, -size, -size],
                [size, -size, size],
                [-size, -size, size],
            ],
        ),
        // top
        (
            [0.0, 1.0, 0.0],
            [
                [size, size, size],
                [size, size, -size],
                [-size, size, -size],
                [-size, size, -size],
                [-size, size, size],
                [size, size, size],
            ],
        ),
        // front
        (
            [0.0, 0.0, 1.0],
            [
                [size, -size, size],
                [size, size, size],
                [-size, size, size],
                [-size, size, size],
                [-size, -size, size],
                [size, -size, size],
            ],
        ),
        // back
        (
            [0.0, 0.0, -1.0],
            [
                [-size, -size, -size],
                [-size, size, -size],
                [size, size, -size],
                [size, size, -size],
                [size, -size, -size],
                [-size, -size, -size],
            ],
        ),
        // left
        (
            [-1.0, 0.0, 0.0],
            [
                [-size, -size, size],
                [-size, size, size],
                [-size, size, -size],
                [-size, size, -size],
                [-size, -size, -size],
                [-size, -size, size],
            ],
        ),
        // right
        (
            [1.0, 0.0, 0.0],
            [
                [size, -size, -size],
                [size, size, -size],
                [size, size, size],
                [size, size, size],
                [size, -size, size],
                [size, -size, -size],
            ],
        ),
    ];

    let uvs = [
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.0, 1.0],
        [0.0, 0.0],
        [1.0, 0.0],
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, corners) in faces.iter() {
        for (corner, uv) in corners.iter().zip(uvs.iter()) {
            vertices.push(Vertex::new(*corner, *uv, WHITE, *normal));
        }
    }

    MeshData {
        vertices,
        indices: Vec::new(),
    }
}

/// Generate a UV sphere of radius 1 centered at the origin, drawn indexed.
///
/// # Arguments
/// * `slices` - Number of segments around the equator (min 3)
/// * `stacks` - Number of segments pole to pole (min 2)
pub fn generate_sphere(slices: u32, stacks: u32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for stack in 0..=stacks {
        let theta = stack as f32 * PI / stacks as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for slice in 0..=slices {
            let phi = slice as f32 * 2.0 * PI / slices as f32;

            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            let uv = [
                slice as f32 / slices as f32,
                stack as f32 / stacks as f32,
            ];
            // unit sphere: the normal is the position itself
            vertices.push(Vertex::new([x, y, z], uv, WHITE, [x, y, z]));
        }
    }

    for stack in 0..stacks {
        for slice in 0..slices {
            let first = (stack * (slices + 1) + slice) as u16;
            let second = first + slices as u16 + 1;

            indices.push(first);
            indices.push(second);
            indices.push(first + 1);

            indices.push(second);
            indices.push(second + 1);
            indices.push(first + 1);
        }
    }

    MeshData { vertices, indices }
}

/// Generate a flat quad in the XY plane facing +Z, drawn indexed.
pub fn generate_plane(size: f32) -> MeshData {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-size, -size, 0.0], [0.0, 0.0], WHITE, normal),
        Vertex::new([size, -size, 0.0], [1.0, 0.0], WHITE, normal),
        Vertex::new([size, size, 0.0], [1.0, 1.0], WHITE, normal),
        Vertex::new([-size, size, 0.0], [0.0, 1.0], WHITE, normal),
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];

    MeshData { vertices, indices }
}

/// Generate a four-sided pyramid with a square base on y = -1 and its apex
/// at y = 1, drawn indexed with per-face normals.
pub fn generate_pyramid() -> MeshData {
    let apex = [0.0, 1.0, 0.0];
    let base = [
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, -1.0, -1.0],
    ];

    let mut vertices = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    // four slanted faces, apex last so the uv seam sits on the tip
    for side in 0..4 {
        let a = base[side];
        let b = base[(side + 1) % 4];
        let normal = face_normal(a, b, apex);
        let start = vertices.len() as u16;
        vertices.push(Vertex::new(a, [0.0, 0.0], WHITE, normal));
        vertices.push(Vertex::new(b, [1.0, 0.0], WHITE, normal));
        vertices.push(Vertex::new(apex, [0.5, 1.0], WHITE, normal));
        indices.extend_from_slice(&[start, start + 1, start + 2]);
    }

    // base, facing down
    let normal = [0.0, -1.0, 0.0];
    let start = vertices.len() as u16;
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    for (corner, uv) in base.iter().rev().zip(uvs.iter()) {
        vertices.push(Vertex::new(*corner, *uv, WHITE, normal));
    }
    indices.extend_from_slice(&[start, start + 1, start + 2, start + 2, start + 3, start]);

    MeshData { vertices, indices }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 0.0 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 36); // 6 faces * 2 triangles * 3 vertices
        assert!(!cube.is_indexed());
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_cube_normals_are_axis_aligned_units() {
        let cube = generate_cube();
        for v in &cube.vertices {
            let len_sq: f32 = v.normal.iter().map(|c| c * c).sum();
            assert!((len_sq - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(50, 50);
        assert_eq!(sphere.vertex_count(), 51 * 51);
        assert_eq!(sphere.index_count(), 50 * 50 * 6);
        assert!(sphere.is_indexed());
        // all indices addressable as u16
        assert!(sphere.vertex_count() < u16::MAX as usize);
    }

    #[test]
    fn test_sphere_normals_match_positions() {
        let sphere = generate_sphere(8, 6);
        for v in &sphere.vertices {
            assert_eq!(v.position, v.normal);
            let len_sq: f32 = v.normal.iter().map(|c| c * c).sum();
            assert!((len_sq - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(1.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.index_count(), 6);
    }

    #[test]
    fn test_pyramid_generation() {
        let pyramid = generate_pyramid();
        assert_eq!(pyramid.vertex_count(), 16); // 4 sides * 3 + base quad
        assert_eq!(pyramid.index_count(), 18); // 4 side tris + 2 base tris
        for v in &pyramid.vertices {
            let len_sq: f32 = v.normal.iter().map(|c| c * c).sum();
            assert!((len_sq - 1.0).abs() < 1e-5);
        }
    }
}
