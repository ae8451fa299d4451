//! Feature matrix with one label per row and one name per column, as used
//! by the tree learners for categorical (`split`) and threshold
//! (`binary_split`) partitioning.

use crate::buffer::{clamp_insert_index, normalize_index};
use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::frequency::FrequencyMap;
use crate::matrix::Matrix;
use std::sync::OnceLock;

#[derive(Clone, Debug)]
struct LabeledCache<T: Element> {
    labels: OnceLock<FrequencyMap<T>>,
    features: Vec<OnceLock<FrequencyMap<T>>>,
    entropy: OnceLock<f64>,
}

impl<T: Element> LabeledCache<T> {
    fn new(cols: usize) -> Self {
        LabeledCache {
            labels: OnceLock::new(),
            features: (0..cols).map(|_| OnceLock::new()).collect(),
            entropy: OnceLock::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LabeledMatrix<T: Element> {
    data: Matrix<T>,
    labels: Vec<T>,
    feature_names: Vec<usize>,
    cache: LabeledCache<T>,
}

fn check_parts<T: Element>(
    op: &'static str,
    data: &Matrix<T>,
    labels: usize,
    names: usize,
) -> CoreResult<()> {
    let (rows, cols) = data.shape();
    if labels != rows {
        return Err(MatrixError::length(op, labels, rows, 1));
    }
    if names != cols {
        return Err(MatrixError::length(op, names, 1, cols));
    }
    Ok(())
}

impl<T: Element> LabeledMatrix<T> {
    pub fn from_parts(
        data: Matrix<T>,
        labels: Vec<T>,
        feature_names: Vec<usize>,
    ) -> CoreResult<Self> {
        check_parts("from_parts", &data, labels.len(), feature_names.len())?;
        let cache = LabeledCache::new(data.cols());
        Ok(LabeledMatrix {
            data,
            labels,
            feature_names,
            cache,
        })
    }

    /// Copies `data` and `labels`; features are named `0..cols`.
    pub fn new(data: &[T], labels: &[T], rows: usize, cols: usize) -> CoreResult<Self> {
        let names = (0..cols).collect();
        Self::from_parts(Matrix::from_slice(data, rows, cols)?, labels.to_vec(), names)
    }

    pub fn with_feature_names(
        data: &[T],
        labels: &[T],
        feature_names: &[usize],
        rows: usize,
        cols: usize,
    ) -> CoreResult<Self> {
        Self::from_parts(
            Matrix::from_slice(data, rows, cols)?,
            labels.to_vec(),
            feature_names.to_vec(),
        )
    }

    /// Copy-set replace. Feature names reset to `0..cols`.
    pub fn set_data(&mut self, data: &[T], labels: &[T], rows: usize, cols: usize) -> CoreResult<()> {
        let matrix = Matrix::from_slice(data, rows, cols)?;
        check_parts("set_data", &matrix, labels.len(), cols)?;
        self.replace(matrix, labels.to_vec(), (0..cols).collect());
        Ok(())
    }

    /// Move-set replace. Feature names reset to `0..cols`.
    pub fn set_move_data(
        &mut self,
        data: Vec<T>,
        labels: Vec<T>,
        rows: usize,
        cols: usize,
    ) -> CoreResult<()> {
        let matrix = Matrix::from_vec(data, rows, cols)?;
        check_parts("set_move_data", &matrix, labels.len(), cols)?;
        self.replace(matrix, labels, (0..cols).collect());
        Ok(())
    }

    fn replace(&mut self, matrix: Matrix<T>, labels: Vec<T>, feature_names: Vec<usize>) {
        let parallelism = self.data.parallelism();
        self.data = matrix.with_parallelism(parallelism);
        self.labels = labels;
        self.feature_names = feature_names;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cache = LabeledCache::new(self.data.cols());
    }

    pub fn data(&self) -> &Matrix<T> {
        &self.data
    }

    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[usize] {
        &self.feature_names
    }

    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    pub fn cols(&self) -> usize {
        self.data.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_label(&self, idx: isize) -> CoreResult<T> {
        let i = normalize_index(idx, self.labels.len())?;
        Ok(self.labels[i])
    }

    pub fn get_feature_name(&self, idx: isize) -> CoreResult<usize> {
        let i = normalize_index(idx, self.feature_names.len())?;
        Ok(self.feature_names[i])
    }

    /// Labels as a rows x 1 matrix.
    pub fn labels_matrix(&self) -> Matrix<T> {
        self.data.derived(self.labels.clone(), self.labels.len(), 1)
    }

    pub fn set(&mut self, row: isize, col: isize, value: T) -> CoreResult<()> {
        self.data.set(row, col, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_label(&mut self, idx: isize, value: T) -> CoreResult<()> {
        let i = normalize_index(idx, self.labels.len())?;
        self.labels[i] = value;
        self.invalidate();
        Ok(())
    }

    pub fn label_frequency(&self) -> &FrequencyMap<T> {
        self.cache
            .labels
            .get_or_init(|| FrequencyMap::from_values(self.labels.iter().copied()))
    }

    pub fn feature_frequency(&self, col: usize) -> CoreResult<&FrequencyMap<T>> {
        let slot = self.cache.features.get(col).ok_or(MatrixError::IndexOutOfRange {
            index: col as isize,
            len: self.cols(),
        })?;
        Ok(slot.get_or_init(|| {
            let cols = self.cols();
            FrequencyMap::from_values(self.data.as_slice().iter().skip(col).step_by(cols).copied())
        }))
    }

    /// `-sum(p * log2(p))` over the label distribution; 0.0 when empty.
    pub fn shannon_entropy(&self) -> f64 {
        *self.cache.entropy.get_or_init(|| {
            let rows = self.labels.len();
            if rows == 0 {
                return 0.0;
            }
            self.label_frequency()
                .iter()
                .map(|(_, count)| {
                    let p = count as f64 / rows as f64;
                    -p * p.log2()
                })
                .sum()
        })
    }

    /// Rows whose `feature_idx` column equals `value`, with that column and
    /// its name removed.
    pub fn split(&self, feature_idx: usize, value: T) -> CoreResult<Self> {
        if !self.feature_frequency(feature_idx)?.contains(value) {
            return Err(MatrixError::SplitValueAbsent {
                feature: feature_idx,
            });
        }
        let key = value.key_bits();
        let cols = self.cols();
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for (r, &label) in self.labels.iter().enumerate() {
            let row = self.data.row_slice(r);
            if row[feature_idx].key_bits() != key {
                continue;
            }
            data.extend_from_slice(&row[..feature_idx]);
            data.extend_from_slice(&row[feature_idx + 1..]);
            labels.push(label);
        }
        let mut names = self.feature_names.clone();
        names.remove(feature_idx);
        let rows = labels.len();
        Self::from_parts(self.data.derived(data, rows, cols - 1), labels, names)
    }

    /// Partitions rows into `(feature <= value, feature > value)`, keeping
    /// every column and the original row order.
    pub fn binary_split(&self, feature_idx: usize, value: T) -> CoreResult<(Self, Self)> {
        let cols = self.cols();
        if feature_idx >= cols {
            return Err(MatrixError::IndexOutOfRange {
                index: feature_idx as isize,
                len: cols,
            });
        }
        let (mut le_data, mut le_labels) = (Vec::new(), Vec::new());
        let (mut gt_data, mut gt_labels) = (Vec::new(), Vec::new());
        for (r, &label) in self.labels.iter().enumerate() {
            let row = self.data.row_slice(r);
            if row[feature_idx] <= value {
                le_data.extend_from_slice(row);
                le_labels.push(label);
            } else {
                gt_data.extend_from_slice(row);
                gt_labels.push(label);
            }
        }
        let (le_rows, gt_rows) = (le_labels.len(), gt_labels.len());
        let le = Self::from_parts(
            self.data.derived(le_data, le_rows, cols),
            le_labels,
            self.feature_names.clone(),
        )?;
        let gt = Self::from_parts(
            self.data.derived(gt_data, gt_rows, cols),
            gt_labels,
            self.feature_names.clone(),
        )?;
        Ok((le, gt))
    }

    pub fn label_mean(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|v| v.to_f64()).sum::<f64>() / self.labels.len() as f64
    }

    pub fn label_var(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let mean = self.label_mean();
        self.labels
            .iter()
            .map(|v| (v.to_f64() - mean).powi(2))
            .sum::<f64>()
            / self.labels.len() as f64
    }

    pub fn is_unique_label(&self) -> bool {
        self.label_frequency().len() == 1
    }

    /// Most frequent label; ties go to the label seen first.
    pub fn majority_label(&self) -> Option<T> {
        self.label_frequency().max_entry().map(|(label, _)| label)
    }

    /// Row `idx` with its label, as a one-row labeled matrix.
    pub fn get_row(&self, idx: isize) -> CoreResult<Self> {
        let r = normalize_index(idx, self.rows())?;
        Self::from_parts(
            self.data.get_row(r as isize)?,
            vec![self.labels[r]],
            self.feature_names.clone(),
        )
    }

    /// Splices the rows of `other` (and their labels) in before row `idx`.
    /// A 0x0 receiver becomes a copy of `other`; a receiver whose features
    /// were all split away keeps its rows.
    pub fn insert_row(&mut self, idx: isize, other: &LabeledMatrix<T>) -> CoreResult<()> {
        if self.data.is_unset() {
            let parallelism = self.data.parallelism();
            *self = other.clone();
            self.data.set_parallelism(parallelism);
            return Ok(());
        }
        let at = clamp_insert_index(idx, self.rows());
        self.data.insert_row(at as isize, &other.data)?;
        let tail = self.labels.split_off(at);
        self.labels.extend_from_slice(&other.labels);
        self.labels.extend(tail);
        self.invalidate();
        Ok(())
    }

    /// Header of feature names followed by `label`, then one row per line
    /// with the label last.
    pub fn render_table(&self, sep: &str) -> String {
        let mut header: Vec<String> = self
            .feature_names
            .iter()
            .map(|name| format!("col:{name}"))
            .collect();
        header.push("label".to_string());
        let mut out = header.join(sep);
        out.push('\n');
        for (r, label) in self.labels.iter().enumerate() {
            let mut cells: Vec<String> = self
                .data
                .row_slice(r)
                .iter()
                .map(ToString::to_string)
                .collect();
            cells.push(label.to_string());
            out.push_str(&cells.join(sep));
            out.push('\n');
        }
        out
    }
}

impl<T: Element> Default for LabeledMatrix<T> {
    fn default() -> Self {
        LabeledMatrix {
            data: Matrix::new(),
            labels: Vec::new(),
            feature_names: Vec::new(),
            cache: LabeledCache::new(0),
        }
    }
}
