//! Unit template meshes instanced or transformed by the sphere-mesh shaders.

use std::f32::consts::{PI, TAU};

use crate::gpu_mesh::{GpuMesh, VNORMAL, VPOSITION};

/// CPU-side template geometry.
#[derive(Debug, Clone, Default)]
pub struct TemplateMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TemplateMesh {
    /// Latitude/longitude unit sphere with `segments` divisions in each direction.
    pub fn sphere(segments: u32) -> Self {
        let n = segments.max(3);
        let mut mesh = Self::default();
        for i in 0..=n {
            let theta = PI * ratio(i, n);
            for j in 0..=n {
                let phi = TAU * ratio(j, n);
                let p = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
                mesh.positions.push(p);
                mesh.normals.push(p);
            }
        }
        mesh.stitch_grid(n, n);
        mesh
    }

    /// Open unit cylinder along `+z` with rings at `z = 0` and `z = 1`.
    pub fn cone(segments: u32) -> Self {
        let n = segments.max(3);
        let mut mesh = Self::default();
        for z in [0.0, 1.0] {
            for j in 0..=n {
                let phi = TAU * ratio(j, n);
                let (s, c) = phi.sin_cos();
                mesh.positions.push([c, s, z]);
                mesh.normals.push([c, s, 0.0]);
            }
        }
        mesh.stitch_grid(1, n);
        mesh
    }

    /// Single triangle whose positions are its barycentric coordinates.
    pub fn triangle() -> Self {
        Self {
            positions: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        }
    }

    /// Triangulates a `(rows + 1) x (cols + 1)` vertex grid.
    fn stitch_grid(&mut self, rows: u32, cols: u32) {
        let stride = cols + 1;
        for i in 0..rows {
            for j in 0..cols {
                let a = i * stride + j;
                let b = a + stride;
                self.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
    }

    /// Uploads positions, normals and indices.
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        let mut mesh = GpuMesh::new(label);
        mesh.set_attribute(device, VPOSITION.name, VPOSITION.format, &self.positions);
        mesh.set_attribute(device, VNORMAL.name, VNORMAL.format, &self.normals);
        mesh.set_indices(device, &self.indices);
        mesh
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(i: u32, n: u32) -> f32 {
    i as f32 / n as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_template() {
        let mesh = TemplateMesh::sphere(8);
        assert_eq!(mesh.positions.len(), 81);
        assert_eq!(mesh.indices.len(), 8 * 8 * 6);
        for p in &mesh.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
        let max = mesh.positions.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn test_cone_template() {
        let mesh = TemplateMesh::cone(64);
        assert_eq!(mesh.positions.len(), 130);
        assert_eq!(mesh.indices.len(), 64 * 6);
        assert!(mesh.positions[..65].iter().all(|p| p[2] == 0.0));
        assert!(mesh.positions[65..].iter().all(|p| p[2] == 1.0));
        assert!(mesh.normals.iter().all(|n| n[2] == 0.0));
    }

    #[test]
    fn test_triangle_template_is_barycentric() {
        let mesh = TemplateMesh::triangle();
        for p in &mesh.positions {
            assert!((p[0] + p[1] + p[2] - 1.0).abs() < 1e-6);
        }
    }
}
