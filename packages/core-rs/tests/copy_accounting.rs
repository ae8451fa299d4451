use mlmat_core::{copy_bytes_total, reset_copy_bytes, take_copy_bytes, LabeledMatrix, Matrix};

// The counter is process-wide, so everything lives in one test.
#[test]
fn only_copy_set_paths_are_counted() {
    reset_copy_bytes();
    assert_eq!(copy_bytes_total(), 0);

    let values: Vec<f64> = (0..12).map(f64::from).collect();
    let mut m = Matrix::from_vec(values.clone(), 3, 4).unwrap();
    m.set_move_data(values.clone(), 4, 3).unwrap();
    m.transpose();
    m.add_scalar(1.0);
    assert_eq!(copy_bytes_total(), 0);

    m.set_data(&values, 2, 6).unwrap();
    assert_eq!(copy_bytes_total(), 12 * 8);

    let _ = Matrix::from_slice(&[1i32, 2, 3], 1, 3).unwrap();
    assert_eq!(copy_bytes_total(), 12 * 8 + 3 * 4);
    assert_eq!(take_copy_bytes(), 108);
    assert_eq!(copy_bytes_total(), 0);

    let mut labeled = LabeledMatrix::<f32>::default();
    labeled
        .set_move_data(vec![0.5; 6], vec![1.0, 0.0, 1.0], 3, 2)
        .unwrap();
    assert_eq!(copy_bytes_total(), 0);
    labeled.set_data(&[0.5; 6], &[1.0, 0.0, 1.0], 3, 2).unwrap();
    assert_eq!(copy_bytes_total(), 6 * 4);
}
