use chrono::{DateTime, Utc};

use crate::encoder::Segment;

/// Final merged recording
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    mime_type: String,
    data: Vec<u8>,
    segment_count: usize,
    created_at: DateTime<Utc>,
}

impl Artifact {
    /// Concatenate segments in order
    pub fn merge(segments: &[Segment], mime_type: impl Into<String>) -> Self {
        let total: usize = segments.iter().map(Segment::len).sum();
        let mut data = Vec::with_capacity(total);
        for segment in segments {
            data.extend_from_slice(&segment.data);
        }

        Self {
            mime_type: mime_type.into(),
            data,
            segment_count: segments.len(),
            created_at: Utc::now(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
