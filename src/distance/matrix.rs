//! Dense distance matrix.

use crate::error::ValidationError;

/// A dense n×n distance matrix stored in row-major order.
///
/// No symmetry is assumed: `get(i, j)` and `get(j, i)` may differ.
/// The diagonal is stored but never read by the formulation.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 5.0, 8.0],
///     vec![5.0, 0.0, 4.0],
///     vec![8.0, 4.0, 0.0],
/// ])
/// .unwrap();
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix from nested rows.
    ///
    /// Fails if any row length differs from the number of rows, or if an
    /// off-diagonal entry is negative or non-finite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(ValidationError::RaggedMatrix {
                    row,
                    expected: size,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }
        let dm = Self { data, size };
        dm.validate()?;
        Ok(dm)
    }

    /// Checks that every off-diagonal entry is finite and non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for i in 0..self.size {
            for j in 0..self.size {
                let value = self.get(i, j);
                if i != j && (!value.is_finite() || value < 0.0) {
                    return Err(ValidationError::InvalidDistance {
                        from: i,
                        to: j,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest off-diagonal entry, or 0 for matrices with fewer than two locations.
    pub fn max_off_diagonal(&self) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..self.size {
            for j in 0..self.size {
                if i != j {
                    max = max.max(self.get(i, j));
                }
            }
        }
        max
    }
}
