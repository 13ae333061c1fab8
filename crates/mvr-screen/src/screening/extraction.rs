//! Boundary with the document-to-facts extractor.
//!
//! The extractor is an untrusted producer: it may read a document poorly, but it must say so
//! through `FactRecord::unreadable` rather than invent plausible facts. Anything that does not
//! match the fact record shape is rejected here, before the policy engine sees it.

use serde::{Deserialize, Serialize};

use super::domain::FactRecord;

/// Raw document handed to an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(u8::is_ascii_whitespace)
    }
}

/// Converts a source document into structured facts.
pub trait FactExtractor: Send + Sync {
    fn extract(&self, document: &SourceDocument) -> Result<FactRecord, ExtractionError>;
}

/// Extraction failure. Neither variant is a hiring decision.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("document '{document}' does not match the fact record shape: {source}")]
    Malformed {
        document: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("extractor unavailable: {0}")]
    Unavailable(String),
}

/// Extractor for documents that already carry the JSON payload produced by an upstream
/// extraction service.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFactExtractor;

impl FactExtractor for JsonFactExtractor {
    fn extract(&self, document: &SourceDocument) -> Result<FactRecord, ExtractionError> {
        if document.is_empty() {
            return Ok(FactRecord::unreadable());
        }

        serde_json::from_slice(&document.bytes).map_err(|source| ExtractionError::Malformed {
            document: document.name.clone(),
            source,
        })
    }
}
