//! NDVI output grids.

/// Row-major grid of index values with the dimensions of its source image.
#[derive(Debug, Clone, PartialEq)]
pub struct NdviGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

/// Aggregate statistics over one grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Share of cells above 0.2, a common threshold for vegetated ground
    pub vegetated_fraction: f64,
}

/// NDVI above which a cell is counted as vegetated.
const VEGETATION_THRESHOLD: f64 = 0.2;

impl NdviGrid {
    pub(crate) fn from_parts(width: usize, height: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Arithmetic mean of all cells, `None` for an empty grid.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn summary(&self) -> Option<IndexSummary> {
        let mean = self.mean()?;
        let (min, max) = self.min_max()?;
        let vegetated = self
            .values
            .iter()
            .filter(|v| **v > VEGETATION_THRESHOLD)
            .count();
        Some(IndexSummary {
            mean,
            min,
            max,
            vegetated_fraction: vegetated as f64 / self.values.len() as f64,
        })
    }

    /// Scale to 8-bit gray levels with `round(value * 255)`, clamped to 0..=255.
    ///
    /// Negative indices map to 0.
    pub fn to_gray8(&self) -> Vec<u8> {
        self.values
            .iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_gray8_scaling() {
        let grid = NdviGrid::from_parts(4, 1, vec![-0.5, 0.0, 0.6, 0.999_999]);
        assert_eq!(grid.to_gray8(), vec![0, 0, 153, 255]);
    }

    #[test]
    fn test_summary() {
        let grid = NdviGrid::from_parts(2, 2, vec![0.1, 0.3, -0.2, 0.6]);
        let summary = grid.summary().unwrap();
        assert!((summary.mean - 0.2).abs() < 1e-12);
        assert_eq!(summary.min, -0.2);
        assert_eq!(summary.max, 0.6);
        assert_eq!(summary.vegetated_fraction, 0.5);
    }

    #[test]
    fn test_empty_grid_has_no_mean() {
        let grid = NdviGrid::from_parts(0, 0, Vec::new());
        assert_eq!(grid.mean(), None);
        assert!(grid.summary().is_none());
    }
}
