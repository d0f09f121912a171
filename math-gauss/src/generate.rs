//! Random test matrices

use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate an `n × (n+1)` matrix with integer entries drawn uniformly from `[0, value_range)`
pub fn random_matrix<R: Rng>(
    n: usize,
    value_range: u32,
    rng: &mut R,
) -> Result<AugmentedMatrix> {
    if value_range == 0 {
        return Err(GaussError::InvalidConfig(
            "value_range must be at least 1".to_string(),
        ));
    }
    let data = Array2::from_shape_simple_fn((n, n + 1), || {
        f64::from(rng.random_range(0..value_range))
    });
    AugmentedMatrix::from_array(data)
}

/// Generate a reproducible random matrix from `seed`
pub fn seeded_matrix(n: usize, value_range: u32, seed: u64) -> Result<AugmentedMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_matrix(n, value_range, &mut rng)
}
