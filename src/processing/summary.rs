use crate::discretization::{Mesh, MeshTopology};
use nalgebra::{DMatrix, DVector};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct ReductionSummary {
    // Mesh info
    pub num_cells: usize,
    pub num_faces: usize,
    pub num_interior_faces: usize,
    pub num_patches: usize,
    pub total_volume: f64,
    pub min_cell_spacing: f64,
    pub max_cell_spacing: f64,
    pub avg_cell_volume: f64,

    // Basis info
    pub num_snapshots: usize,
    pub num_modes: usize,
    pub mass_symmetry_defect: Option<f64>,
    pub mass_condition: Option<f64>,

    // Projection info
    pub max_projection_error: Option<f64>,
    pub mean_projection_error: Option<f64>,
    pub max_orthogonal_error: Option<f64>,
    pub mean_h1_seminorm: Option<f64>,
}

impl ReductionSummary {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let num_cells = mesh.cells.len();

        let mut spacings = Vec::new();
        for face in &mesh.faces {
            if let (k, Some(l)) = face.neighbor_cell_ids {
                let d = (0..3)
                    .map(|i| (mesh.cells[k].centroid[i] - mesh.cells[l].centroid[i]).powi(2))
                    .sum::<f64>()
                    .sqrt();
                spacings.push(d);
            }
        }

        let min_spacing = spacings.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_spacing = spacings.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let total_volume = mesh.total_volume();

        Self {
            num_cells,
            num_faces: mesh.faces.len(),
            num_interior_faces: spacings.len(),
            num_patches: mesh.boundary_patches().len(),
            total_volume,
            min_cell_spacing: min_spacing,
            max_cell_spacing: max_spacing,
            avg_cell_volume: total_volume / num_cells.max(1) as f64,
            num_snapshots: 0,
            num_modes: 0,
            mass_symmetry_defect: None,
            mass_condition: None,
            max_projection_error: None,
            mean_projection_error: None,
            max_orthogonal_error: None,
            mean_h1_seminorm: None,
        }
    }

    /// Record mass matrix diagnostics: the largest `|M - M^T|` entry and the
    /// ratio of extreme eigenvalues.
    pub fn add_mass_info(&mut self, num_snapshots: usize, mass: &DMatrix<f64>) {
        self.num_snapshots = num_snapshots;
        self.num_modes = mass.ncols();
        self.mass_symmetry_defect = Some((mass - mass.transpose()).amax());

        let eigen = mass.clone().symmetric_eigen();
        let max = eigen.eigenvalues.max();
        let min = eigen.eigenvalues.min();
        self.mass_condition = (min > 0.0).then(|| max / min);
    }

    pub fn add_projection_errors(&mut self, errors: &DVector<f64>) {
        if errors.is_empty() {
            return;
        }
        self.max_projection_error = Some(errors.max());
        self.mean_projection_error = Some(errors.mean());
    }

    pub fn add_orthogonal_errors(&mut self, errors: &DVector<f64>) {
        if errors.is_empty() {
            return;
        }
        self.max_orthogonal_error = Some(errors.max());
    }

    pub fn add_h1_info(&mut self, seminorms: &[f64]) {
        if seminorms.is_empty() {
            return;
        }
        self.mean_h1_seminorm = Some(seminorms.iter().sum::<f64>() / seminorms.len() as f64);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write_summary(&mut file)
    }

    pub fn print_to_console(&self) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = self.write_summary(&mut handle);
    }

    fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", "=".repeat(60))?;
        writeln!(w, "{:^60}", "REDUCTION SUMMARY")?;
        writeln!(w, "{}", "=".repeat(60))?;

        writeln!(w, "\nMesh:")?;
        writeln!(w, "  Cells:                 {}", self.num_cells)?;
        writeln!(
            w,
            "  Faces:                 {} ({} interior)",
            self.num_faces, self.num_interior_faces
        )?;
        writeln!(w, "  Boundary patches:      {}", self.num_patches)?;
        writeln!(w, "  Total volume:          {:.6e}", self.total_volume)?;
        writeln!(w, "  Avg cell volume:       {:.6e}", self.avg_cell_volume)?;
        writeln!(
            w,
            "  Cell spacing:          min={:.6e}, max={:.6e}",
            self.min_cell_spacing, self.max_cell_spacing
        )?;

        writeln!(w, "\nBasis:")?;
        writeln!(w, "  Snapshots:             {}", self.num_snapshots)?;
        writeln!(w, "  Modes:                 {}", self.num_modes)?;
        if let Some(defect) = self.mass_symmetry_defect {
            writeln!(w, "  Mass symmetry defect:  {:.3e}", defect)?;
        }
        match self.mass_condition {
            Some(cond) => writeln!(w, "  Mass condition number: {:.3e}", cond)?,
            None => writeln!(w, "  Mass condition number: n/a")?,
        }

        writeln!(w, "\nProjection:")?;
        if let (Some(max), Some(mean)) = (self.max_projection_error, self.mean_projection_error) {
            writeln!(w, "  Galerkin rel. error:   max={:.3e}, mean={:.3e}", max, mean)?;
        }
        if let Some(max) = self.max_orthogonal_error {
            writeln!(w, "  Orthogonal rel. error: max={:.3e}", max)?;
        }
        if let Some(h1) = self.mean_h1_seminorm {
            writeln!(w, "  Mean H1 seminorm:      {:.6e}", h1)?;
        }
        writeln!(w, "{}", "=".repeat(60))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::create_flat_mesh;

    #[test]
    fn mesh_statistics() {
        let mesh = create_flat_mesh([4.0, 2.0], 4, 2, 1.0);
        let summary = ReductionSummary::from_mesh(&mesh);
        assert_eq!(summary.num_cells, 8);
        assert_eq!(summary.num_patches, 6);
        assert_eq!(summary.num_interior_faces, 3 * 2 + 4);
        assert!((summary.min_cell_spacing - 1.0).abs() < 1e-12);
        assert!((summary.avg_cell_volume - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mass_diagnostics() {
        let mesh = create_flat_mesh([1.0, 1.0], 2, 2, 1.0);
        let mut summary = ReductionSummary::from_mesh(&mesh);
        let mass = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 1.0]);
        summary.add_mass_info(5, &mass);
        assert_eq!(summary.num_modes, 2);
        assert_eq!(summary.mass_symmetry_defect, Some(0.0));
        assert!((summary.mass_condition.unwrap() - 4.0).abs() < 1e-12);

        let mut text = Vec::new();
        summary.write_summary(&mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("REDUCTION SUMMARY"));
        assert!(text.contains("Snapshots:             5"));
    }
}
