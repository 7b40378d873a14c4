use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

#[inline]
pub fn mean(values: ArrayView1<'_, u32>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Some(total as f64 / values.len() as f64)
}

/// Mean of the first `n` entries; `None` when `n` is zero or out of range.
pub fn prefix_mean(values: ArrayView1<'_, u32>, n: usize) -> Option<f64> {
    if n > values.len() {
        return None;
    }
    mean(values.slice_move(ndarray::s![..n]))
}

/// Maximum of each column (reduction along axis 0).
pub fn column_max(table: ArrayView2<'_, u32>) -> Array1<u32> {
    table.fold_axis(Axis(0), 0, |&acc, &v| acc.max(v))
}

pub fn count_at_least(values: ArrayView1<'_, u32>, threshold: u32) -> usize {
    values.iter().filter(|&&v| v >= threshold).count()
}

pub fn fraction_at_least(values: ArrayView1<'_, u32>, threshold: u32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    count_at_least(values, threshold) as f64 / values.len() as f64
}

pub fn any_at_least(values: ArrayView1<'_, u32>, threshold: u32) -> bool {
    values.iter().any(|&v| v >= threshold)
}

/// Index of the first entry strictly greater than `threshold`.
///
/// Returns `None` when no entry qualifies, which is distinct from `Some(0)`.
#[inline]
pub fn first_exceeding(values: ArrayView1<'_, f64>, threshold: f64) -> Option<usize> {
    values.iter().position(|&v| v > threshold)
}
