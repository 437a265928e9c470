//! Validation outcome shared by the local and semantic validators

use serde::{Deserialize, Serialize};

/// Outcome of one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// Whether the candidate may be returned as-is
    pub accepted: bool,
    /// Human-readable problems; empty when accepted by the local validator
    pub defects: Vec<String>,
}

impl ValidationVerdict {
    /// Accepted with no defects
    #[inline]
    #[must_use]
    pub fn accept() -> Self {
        Self {
            accepted: true,
            defects: Vec::new(),
        }
    }

    /// Rejected with the given defects
    #[inline]
    #[must_use]
    pub fn reject(defects: Vec<String>) -> Self {
        Self {
            accepted: false,
            defects,
        }
    }

    /// Accepted exactly when there are no defects
    #[inline]
    #[must_use]
    pub fn from_defects(defects: Vec<String>) -> Self {
        Self {
            accepted: defects.is_empty(),
            defects,
        }
    }
}
