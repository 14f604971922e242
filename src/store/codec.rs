//! Encoding of the persisted record sequence.

use crate::store::{ObservationRecord, StoreError};

/// Encodes and decodes the full record sequence as a single blob.
pub trait RecordCodec: Send + Sync {
    fn encode(&self, records: &[ObservationRecord]) -> Result<Vec<u8>, StoreError>;

    fn decode(&self, bytes: &[u8]) -> Result<Vec<ObservationRecord>, StoreError>;
}

/// JSON array encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output, easier to inspect by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl RecordCodec for JsonCodec {
    fn encode(&self, records: &[ObservationRecord]) -> Result<Vec<u8>, StoreError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        encoded.map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<ObservationRecord>, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
