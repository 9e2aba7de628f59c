use crate::error::{Result, RomError};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random matrices drawn from an owned generator.
///
/// Entries are drawn from the half-open interval `[min, max)`; a degenerate
/// interval `min == max` yields `min`. Bounds must be finite with a finite
/// width `max - min`. Two samplers built with the same seed
/// produce the same sequence of matrices.
pub struct RandomSampler<R: Rng> {
    rng: R,
}

impl RandomSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// `rows × cols` matrix with every entry in `[min, max)`.
    pub fn uniform(&mut self, rows: usize, cols: usize, min: f64, max: f64) -> Result<DMatrix<f64>> {
        check_bounds(min, max)?;
        Ok(DMatrix::from_fn(rows, cols, |_, _| self.draw(min, max)))
    }

    /// `rows × bounds.ncols()` matrix; column `j` is drawn from
    /// `[bounds[(0, j)], bounds[(1, j)])`.
    pub fn uniform_columns(&mut self, rows: usize, bounds: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if bounds.nrows() != 2 {
            return Err(RomError::ShapeMismatch(format!(
                "bounds must have 2 rows (min, max), got {}",
                bounds.nrows()
            )));
        }
        for j in 0..bounds.ncols() {
            check_bounds(bounds[(0, j)], bounds[(1, j)])?;
        }
        let mut out = DMatrix::zeros(rows, bounds.ncols());
        for j in 0..bounds.ncols() {
            let (min, max) = (bounds[(0, j)], bounds[(1, j)]);
            for i in 0..rows {
                out[(i, j)] = self.draw(min, max);
            }
        }
        Ok(out)
    }

    fn draw(&mut self, min: f64, max: f64) -> f64 {
        if min == max {
            min
        } else {
            self.rng.gen_range(min..max)
        }
    }
}

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
        return Err(RomError::InvalidArgument(format!(
            "invalid sampling interval [{min}, {max})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_stay_in_interval() {
        let mut sampler = RandomSampler::seeded(7);
        let m = sampler.uniform(50, 4, -2.0, 3.0).unwrap();
        assert_eq!(m.shape(), (50, 4));
        assert!(m.iter().all(|v| (-2.0..3.0).contains(v)));
    }

    #[test]
    fn same_seed_same_matrix() {
        let a = RandomSampler::seeded(42).uniform(5, 5, 0.0, 1.0).unwrap();
        let b = RandomSampler::seeded(42).uniform(5, 5, 0.0, 1.0).unwrap();
        let c = RandomSampler::seeded(43).uniform(5, 5, 0.0, 1.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn per_column_bounds() {
        let bounds = DMatrix::from_row_slice(2, 3, &[0.0, 10.0, 5.0, 1.0, 20.0, 5.0]);
        let m = RandomSampler::seeded(1).uniform_columns(100, &bounds).unwrap();
        assert_eq!(m.shape(), (100, 3));
        assert!(m.column(0).iter().all(|v| (0.0..1.0).contains(v)));
        assert!(m.column(1).iter().all(|v| (10.0..20.0).contains(v)));
        assert!(m.column(2).iter().all(|v| *v == 5.0));
    }

    #[test]
    fn bad_bounds_are_rejected() {
        let mut sampler = RandomSampler::seeded(0);
        assert!(matches!(
            sampler.uniform(2, 2, 1.0, 0.0),
            Err(RomError::InvalidArgument(_))
        ));
        assert!(matches!(
            sampler.uniform(1, 1, f64::NAN, 1.0),
            Err(RomError::InvalidArgument(_))
        ));
        // both bounds finite, but the width overflows
        assert!(matches!(
            sampler.uniform(1, 1, -f64::MAX, f64::MAX),
            Err(RomError::InvalidArgument(_))
        ));
        let wide = DMatrix::from_row_slice(2, 1, &[-f64::MAX, f64::MAX]);
        assert!(matches!(
            sampler.uniform_columns(1, &wide),
            Err(RomError::InvalidArgument(_))
        ));
        let three_rows = DMatrix::zeros(3, 2);
        assert!(matches!(
            sampler.uniform_columns(2, &three_rows),
            Err(RomError::ShapeMismatch(_))
        ));
    }
}
