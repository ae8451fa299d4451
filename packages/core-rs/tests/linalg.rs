use approx::assert_abs_diff_eq;
use mlmat_core::{Matrix, MatrixError, PaddingMode};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

/// Random matrix with a dominant diagonal, hence invertible.
fn nonsingular(n: usize, seed: u64) -> Matrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    let mut data: Vec<f64> = (0..n * n).map(|_| dist.sample(&mut rng)).collect();
    for i in 0..n {
        data[i * n + i] += n as f64 + 1.0;
    }
    Matrix::from_vec(data, n, n).unwrap()
}

#[rstest]
#[case(1, 1)]
#[case(2, 7)]
#[case(3, 42)]
#[case(4, 1234)]
#[case(5, 99)]
fn inverse_round_trip(#[case] n: usize, #[case] seed: u64) {
    let a = nonsingular(n, seed);
    let mut inv = a.clone();
    inv.inverse().unwrap();
    let mut product = a;
    product.dot(&inv).unwrap();
    let eye = Matrix::<f64>::eye(n);
    for (got, want) in product.as_slice().iter().zip(eye.as_slice()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
    }
}

#[test]
fn inverse_of_permuted_matrix_needs_row_swap() {
    let mut m = Matrix::from_slice(&[0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 4.0], 3, 3).unwrap();
    let original = m.clone();
    m.inverse().unwrap();
    let mut product = original;
    product.dot(&m).unwrap();
    assert_eq!(product, Matrix::eye(3));
}

#[test]
fn singular_matrix_reports_column() {
    let mut m = Matrix::from_slice(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 1.0, 0.0, 1.0], 3, 3).unwrap();
    assert!(matches!(m.inverse(), Err(MatrixError::Singular { .. })));
}

#[rstest]
#[case(&[5.0], 5.0)]
#[case(&[1.0, 2.0, 3.0, 4.0], -2.0)]
#[case(&[2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0], 6.0)]
fn determinant(#[case] data: &[f64], #[case] expected: f64) {
    let n = (data.len() as f64).sqrt() as usize;
    let m = Matrix::from_slice(data, n, n).unwrap();
    assert_abs_diff_eq!(m.det().unwrap(), expected, epsilon = 1e-12);
}

// Beyond 3x3 the determinant is the sum of wrapped diagonals minus the sum
// of wrapped anti-diagonals, not the Laplace/LU determinant.
#[rstest]
#[case::identity(Matrix::eye(4), 1.0)]
#[case::reversal(Matrix::from_slice(&[
    0.0, 0.0, 0.0, 1.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    1.0, 0.0, 0.0, 0.0,
], 4, 4).unwrap(), -1.0)]
#[case::shifted_identity(Matrix::from_slice(&[
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
    1.0, 0.0, 0.0, 0.0,
], 4, 4).unwrap(), 1.0)]
fn four_by_four_uses_wrapped_diagonals(#[case] m: Matrix<f64>, #[case] expected: f64) {
    // reversal and shifted_identity have true determinants +1 and -1
    assert_abs_diff_eq!(m.det().unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn integer_matrices_invert_into_f64() {
    let mut m = Matrix::from_slice(&[2i32, 0, 0, 2], 2, 2).unwrap();
    assert!(matches!(m.inverse(), Err(MatrixError::DTypeMismatch { .. })));
    assert_eq!(m.as_slice(), &[2, 0, 0, 2]);
    assert_eq!(m.inverse_f64().unwrap().as_slice(), &[0.5, 0.0, 0.0, 0.5]);
}

#[rstest]
#[case(PaddingMode::Valid, (3, 3))]
#[case(PaddingMode::Full, (7, 7))]
fn five_by_five_convolution_shapes(#[case] mode: PaddingMode, #[case] shape: (usize, usize)) {
    let source: Vec<i32> = vec![
        17, 24, 1, 8, 15, 23, 5, 7, 14, 16, 4, 6, 13, 20, 22, 10, 12, 19, 21, 3, 11, 18, 25, 2, 9,
    ];
    let mut m = Matrix::from_vec(source, 5, 5).unwrap();
    let kernel = Matrix::from_slice(&[1, 2, 1, 0, 2, 0, 3, 1, 3], 3, 3).unwrap();
    m.convn(&kernel, 1, mode).unwrap();
    assert_eq!(m.shape(), shape);
}

#[test]
fn full_convolution_centre_matches_valid() {
    let data: Vec<f64> = (0..25).map(f64::from).collect();
    let kernel = Matrix::from_slice(&[1.0, 0.0, -1.0, 2.0, 0.0, -2.0, 1.0, 0.0, -1.0], 3, 3).unwrap();
    let mut valid = Matrix::from_slice(&data, 5, 5).unwrap();
    let mut full = valid.clone();
    valid.convn(&kernel, 1, "valid".parse().unwrap()).unwrap();
    full.convn(&kernel, 1, "full".parse().unwrap()).unwrap();
    for r in 0..3 {
        for c in 0..3 {
            assert_eq!(valid.get(r, c), full.get(r + 2, c + 2));
        }
    }
}
