pub mod mass;
pub mod norms;
pub mod projection;
pub mod sampling;
pub mod stencil;
pub mod timing;
pub mod vectorize;

pub use mass::{mass_matrix, orthonormalize, weighted_gram};
pub use norms::{h1_seminorm, l2_norm, list_errors, relative_error, ErrorEvaluator};
pub use projection::{
    project, project_orthogonal, project_orthogonal_single, project_orthogonal_single_with,
    project_orthogonal_with, project_single, GalerkinProjector,
};
pub use sampling::RandomSampler;
pub use stencil::{stencil, stencil_pair};
pub use vectorize::{dof_weights, unvectorize_columns, vectorize_field, vectorize_fields};

/// Thresholds used by the reduction routines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// A reference norm below this makes a relative error undefined.
    pub zero_norm: f64,
    /// Smallest accepted ratio of squared Cholesky pivots (min / max) of the
    /// unit-diagonal scaled mass matrix.
    pub singular_pivot: f64,
    /// Smallest accepted `M(i, i) / (max(V) * |mode_i|^2)` in orthogonal
    /// projection.
    pub min_mass_diagonal: f64,
    /// Smallest accepted ratio of a mode's weighted norm after Gram-Schmidt
    /// to its norm before.
    pub dependent_mode: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            zero_norm: 1e-12,
            singular_pivot: 1e-12,
            min_mass_diagonal: 1e-14,
            dependent_mode: 1e-6,
        }
    }
}

impl Tolerances {
    pub fn with_zero_norm(mut self, tol: f64) -> Self {
        self.zero_norm = tol;
        self
    }

    pub fn with_singular_pivot(mut self, tol: f64) -> Self {
        self.singular_pivot = tol;
        self
    }

    pub fn with_min_mass_diagonal(mut self, tol: f64) -> Self {
        self.min_mass_diagonal = tol;
        self
    }

    pub fn with_dependent_mode(mut self, tol: f64) -> Self {
        self.dependent_mode = tol;
        self
    }
}
