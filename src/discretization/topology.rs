use super::mesh::{Mesh, MeshTag, Patch};
use glam::DVec3;

/// Read-only view of a mesh as consumed by the reduction routines.
pub trait MeshTopology {
    fn tag(&self) -> MeshTag;

    fn num_cells(&self) -> usize;

    fn cell_volume(&self, cell: usize) -> f64;

    fn cell_centroid(&self, cell: usize) -> DVec3;

    /// Face-sharing neighbours of `cell` in ascending id order.
    fn neighbors(&self, cell: usize) -> &[usize];

    /// Discrete cell-centred gradient of a scalar cell field.
    /// `values` holds one entry per cell.
    fn scalar_gradient(&self, values: &[f64]) -> Vec<DVec3>;

    fn boundary_patches(&self) -> &[Patch];

    fn volumes(&self) -> Vec<f64> {
        (0..self.num_cells()).map(|c| self.cell_volume(c)).collect()
    }
}

impl MeshTopology for Mesh {
    fn tag(&self) -> MeshTag {
        Mesh::tag(self)
    }

    fn num_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_volume(&self, cell: usize) -> f64 {
        self.cells[cell].volume
    }

    fn cell_centroid(&self, cell: usize) -> DVec3 {
        DVec3::from_array(self.cells[cell].centroid)
    }

    fn neighbors(&self, cell: usize) -> &[usize] {
        &self.adjacency()[cell]
    }

    /// Green-Gauss gradient: grad(phi)_i = (1/V_i) * sum_f phi_f * n_f * A_f.
    /// Interior face values are the arithmetic mean of both cells, boundary
    /// faces take the owning cell value (zero-gradient).
    fn scalar_gradient(&self, values: &[f64]) -> Vec<DVec3> {
        let mut grad = vec![DVec3::ZERO; self.cells.len()];

        for face in &self.faces {
            let ds = DVec3::from_array(face.normal) * face.area;
            match face.neighbor_cell_ids {
                (k, Some(l)) => {
                    let phi_f = 0.5 * (values[k] + values[l]);
                    grad[k] += ds * phi_f;
                    grad[l] -= ds * phi_f;
                }
                (k, None) => grad[k] += ds * values[k],
            }
        }

        for (g, cell) in grad.iter_mut().zip(&self.cells) {
            if cell.volume > 0.0 {
                *g /= cell.volume;
            } else {
                *g = DVec3::ZERO;
            }
        }
        grad
    }

    fn boundary_patches(&self) -> &[Patch] {
        &self.patches
    }
}
