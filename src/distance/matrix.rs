//! Dense great-circle distance matrix.

use crate::models::GeoPoint;

/// A dense n×n distance matrix in kilometers, stored row-major.
///
/// Built from geographic coordinates (haversine) or from explicit data.
/// Index 0 is conventionally the depot.
///
/// # Examples
///
/// ```
/// use cash_replen::distance::DistanceMatrix;
/// use cash_replen::models::GeoPoint;
///
/// let points = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, 1.0),
///     GeoPoint::new(0.0, 2.0),
/// ];
/// let dm = DistanceMatrix::from_points(&points);
/// assert_eq!(dm.size(), 3);
/// assert!((dm.get(0, 1) - 111.19).abs() < 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a haversine distance matrix from coordinates.
    pub fn from_points(points: &[GeoPoint]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_km(points[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total distance of the tour `0 → seq[0] → … → seq[n-1] → 0`.
    pub fn tour_distance(&self, seq: &[usize]) -> f64 {
        if seq.is_empty() {
            return 0.0;
        }
        let mut dist = self.get(0, seq[0]);
        for w in seq.windows(2) {
            dist += self.get(w[0], w[1]);
        }
        dist += self.get(seq[seq.len() - 1], 0);
        dist
    }
}
