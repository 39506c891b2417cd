//! Exhaustive nearest-neighbor index over squared Euclidean distance.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the vector in the index
    pub position: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Flat (brute-force) L2 index. Vectors are stored row-major in one
/// buffer; position `i` is the `i`-th vector added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Rebuild an index from a row-major buffer.
    pub fn from_raw(dimension: usize, vectors: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::CorruptIndex {
                reason: "index dimension is zero".into(),
            });
        }
        if vectors.len() % dimension != 0 {
            return Err(RagError::CorruptIndex {
                reason: format!(
                    "{} values is not a multiple of dimension {}",
                    vectors.len(),
                    dimension
                ),
            });
        }
        Ok(Self { dimension, vectors })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Raw row-major buffer.
    pub fn as_raw(&self) -> &[f32] {
        &self.vectors
    }

    /// Vector at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    /// Append a vector; its position is the previous `len()`.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;
        let position = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(position)
    }

    /// The `k` closest vectors, closest first.
    ///
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        // Stable sort, so ties stay in position order
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Squared Euclidean distance between equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(vectors: &[[f32; 2]]) -> FlatL2Index {
        let mut index = FlatL2Index::new(2);
        for v in vectors {
            index.add(v).unwrap();
        }
        index
    }

    #[test]
    fn test_ranks_by_ascending_distance() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0], [0.9, 0.1]]);
        let hits = index.search(&[1.0, 0.0], 2).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].position, 2);
        assert!((hits[1].distance - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = index_of(&[[0.0, 1.0], [1.0, 0.0], [0.0, -1.0], [-1.0, 0.0]]);
        let hits = index.search(&[0.0, 0.0], 4).unwrap();
        let positions: Vec<_> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_k_larger_than_index() {
        let index = index_of(&[[1.0, 0.0]]);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 1);
        assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_is_enforced() {
        let mut index = FlatL2Index::new(3);
        assert!(matches!(
            index.add(&[1.0, 2.0]),
            Err(RagError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_from_raw_validates_shape() {
        assert!(FlatL2Index::from_raw(2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(FlatL2Index::from_raw(0, vec![]).is_err());

        let index = FlatL2Index::from_raw(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[3.0, 4.0][..]));
        assert_eq!(index.vector(2), None);
    }
}
