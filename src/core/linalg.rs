// linalg.rs - Determinant and inverse for small dense matrices

use ndarray::Array2;

/// LU factorisation with partial pivoting (PA = LU, unit-diagonal L stored below U)
struct LuDecomposition {
    lu: Array2<f64>,
    perm: Vec<usize>,
    sign: f64,
    singular: bool,
}

impl LuDecomposition {
    fn new(matrix: &Array2<f64>) -> Self {
        let n = matrix.nrows();
        let mut lu = matrix.clone();
        let mut perm: Vec<usize> = (0..n).collect();
        let mut sign = 1.0;
        let mut singular = false;

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&a, &b| lu[[a, col]].abs().total_cmp(&lu[[b, col]].abs()))
                .unwrap_or(col);

            if lu[[pivot_row, col]] == 0.0 {
                singular = true;
                continue;
            }

            if pivot_row != col {
                for k in 0..n {
                    lu.swap([pivot_row, k], [col, k]);
                }
                perm.swap(pivot_row, col);
                sign = -sign;
            }

            let pivot = lu[[col, col]];
            for row in col + 1..n {
                let factor = lu[[row, col]] / pivot;
                lu[[row, col]] = factor;
                for k in col + 1..n {
                    lu[[row, k]] -= factor * lu[[col, k]];
                }
            }
        }

        Self { lu, perm, sign, singular }
    }

    fn determinant(&self) -> f64 {
        if self.singular {
            return 0.0;
        }
        self.sign * self.lu.diag().product()
    }

    fn inverse(&self) -> Option<Array2<f64>> {
        if self.singular {
            return None;
        }
        let n = self.lu.nrows();
        let mut inverse = Array2::zeros((n, n));

        for col in 0..n {
            // forward substitution on the permuted unit vector
            let mut y = vec![0.0; n];
            for i in 0..n {
                let mut sum = if self.perm[i] == col { 1.0 } else { 0.0 };
                for k in 0..i {
                    sum -= self.lu[[i, k]] * y[k];
                }
                y[i] = sum;
            }
            // back substitution
            for i in (0..n).rev() {
                let mut sum = y[i];
                for k in i + 1..n {
                    sum -= self.lu[[i, k]] * inverse[[k, col]];
                }
                inverse[[i, col]] = sum / self.lu[[i, i]];
            }
        }

        Some(inverse)
    }
}

/// Determinant of a square matrix
pub fn determinant(matrix: &Array2<f64>) -> f64 {
    debug_assert!(matrix.is_square());
    LuDecomposition::new(matrix).determinant()
}

/// Inverse of a square matrix, or `None` when it is singular
pub fn inverse(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    debug_assert!(matrix.is_square());
    LuDecomposition::new(matrix).inverse()
}
