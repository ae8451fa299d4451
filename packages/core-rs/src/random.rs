use crate::element::Element;
use crate::matrix::Matrix;
use rand::Rng;
use rand_distr::StandardNormal;

impl<T: Element> Matrix<T> {
    /// Samples every element from `N(mean, std^2)`.
    ///
    /// With `range = Some((min, max))` and `min < max`, samples falling
    /// outside `[min, max)` are wrapped back into it modulo `max - min`.
    pub fn random_normal<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mean: f64,
        std: f64,
        range: Option<(f64, f64)>,
        rng: &mut R,
    ) -> Self {
        let range = range.filter(|(min, max)| min < max);
        let data = (0..rows * cols)
            .map(|_| {
                let z: f64 = rng.sample(StandardNormal);
                let mut value = mean + std * z;
                if let Some((min, max)) = range {
                    if value < min || value >= max {
                        value = min + (value - min).rem_euclid(max - min);
                    }
                }
                T::from_f64(value)
            })
            .collect::<Vec<_>>();
        let mut m = Matrix::new();
        m.replace_buffer(data, rows, cols);
        m
    }
}
