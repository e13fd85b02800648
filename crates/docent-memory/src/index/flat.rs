use super::IndexError;

const MAGIC: &[u8; 4] = b"DCIX";
const VERSION: u32 = 1;
/// magic + version + dimension + rows
const HEADER_LEN: usize = 4 + 4 + 8 + 8;

/// Row-major matrix of embeddings scored by exact inner product.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append rows. Either every row is appended or none is.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if any row has the wrong length.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        self.data.reserve(vectors.len() * self.dimension);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Drop every row past `rows`.
    pub fn truncate(&mut self, rows: usize) {
        self.data.truncate(rows * self.dimension);
    }

    /// Top `k` rows by inner product with `query`, best first. Ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .map(|row| row.iter().zip(query).map(|(a, b)| a * b).sum::<f32>())
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dimension as u64).to_le_bytes());
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for value in &self.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }

    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] if the header or payload length is invalid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() < HEADER_LEN {
            return Err(IndexError::Corrupt(format!(
                "vector file is {} bytes, shorter than its header",
                bytes.len()
            )));
        }
        if &bytes[..4] != MAGIC {
            return Err(IndexError::Corrupt("bad vector file magic".into()));
        }
        let version = u32::from_le_bytes(fixed(&bytes[4..8])?);
        if version != VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported vector file version {version}"
            )));
        }
        let dimension = to_usize(u64::from_le_bytes(fixed(&bytes[8..16])?))?;
        let rows = to_usize(u64::from_le_bytes(fixed(&bytes[16..24])?))?;
        if dimension == 0 {
            return Err(IndexError::Corrupt("zero embedding dimension".into()));
        }

        let payload = &bytes[HEADER_LEN..];
        let expected = rows
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| IndexError::Corrupt("row count overflows".into()))?;
        if payload.len() != expected {
            return Err(IndexError::Corrupt(format!(
                "expected {expected} payload bytes for {rows}x{dimension}, found {}",
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|b| fixed(b).map(f32::from_le_bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { dimension, data })
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], IndexError> {
    bytes
        .try_into()
        .map_err(|_| IndexError::Corrupt("truncated vector file".into()))
}

fn to_usize(value: u64) -> Result<usize, IndexError> {
    usize::try_from(value).map_err(|e| IndexError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatIndex {
        let mut index = FlatIndex::new(3);
        index
            .add(&[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.5, 0.5, 0.0],
            ])
            .unwrap();
        index
    }

    #[test]
    fn len_counts_rows() {
        assert_eq!(sample().len(), 3);
        assert!(FlatIndex::new(3).is_empty());
        assert!(FlatIndex::new(0).is_empty());
    }

    #[test]
    fn search_ranks_by_inner_product() {
        let hits = sample().search(&[0.0, 2.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!((hits[0].1 - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scores_are_not_normalised() {
        let mut index = FlatIndex::new(2);
        index.add(&[vec![3.0, 4.0]]).unwrap();
        let hits = index.search(&[3.0, 4.0], 1).unwrap();
        assert!((hits[0].1 - 25.0).abs() < 1e-4);
    }

    #[test]
    fn k_clamped_to_len() {
        assert_eq!(sample().search(&[1.0, 1.0, 1.0], 10).unwrap().len(), 3);
        assert!(sample().search(&[1.0, 1.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn empty_search_is_empty() {
        let hits = FlatIndex::new(3).search(&[1.0, 0.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut index = FlatIndex::new(1);
        index.add(&[vec![1.0], vec![1.0], vec![1.0]]).unwrap();
        let order: Vec<usize> = index
            .search(&[1.0], 3)
            .unwrap()
            .iter()
            .map(|h| h.0)
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn wrong_dimension_rejected_atomically() {
        let mut index = sample();
        let err = index.add(&[vec![1.0, 0.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
        assert_eq!(index.len(), 3);
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn truncate_drops_tail_rows() {
        let mut index = sample();
        index.truncate(1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 5).unwrap().len(), 1);
    }

    #[test]
    fn bytes_roundtrip() {
        let index = sample();
        assert_eq!(FlatIndex::from_bytes(&index.to_bytes()).unwrap(), index);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(matches!(
            FlatIndex::from_bytes(b"nope"),
            Err(IndexError::Corrupt(_))
        ));

        let mut bytes = sample().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            FlatIndex::from_bytes(&bytes),
            Err(IndexError::Corrupt(_))
        ));
    }

    #[test]
    fn from_bytes_rejects_truncated_payload() {
        let mut bytes = sample().to_bytes();
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            FlatIndex::from_bytes(&bytes),
            Err(IndexError::Corrupt(_))
        ));
    }
}
