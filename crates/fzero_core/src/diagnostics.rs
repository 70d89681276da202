//! Recoverable problems found while decoding.
//!
//! Decoding favours partial data over refusal: a bad signature, checksum,
//! unlock byte or a short image is logged and collected here, and decoding
//! carries on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureKind {
    Header,
    Footer,
}

impl SignatureKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Header => "Header",
            Self::Footer => "Footer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    SignatureMismatch {
        kind: SignatureKind,
        offset: usize,
        found: Vec<u8>,
    },
    ChecksumMismatch {
        league: String,
        stored: Checksum,
        computed: Checksum,
    },
    MalformedRecord {
        league: String,
        track: usize,
        slot: usize,
        reason: String,
    },
    InvalidUnlocks {
        raw: u8,
    },
    Truncated {
        section: String,
        needed: usize,
        found: usize,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureMismatch {
                kind,
                offset,
                found,
            } => write!(
                f,
                "{} signature mismatch at 0x{offset:04X}: {}",
                kind.as_str(),
                String::from_utf8_lossy(found)
            ),
            Self::ChecksumMismatch {
                league,
                stored,
                computed,
            } => write!(
                f,
                "{league} League checksum mismatch: stored {stored}, expected {computed}"
            ),
            Self::MalformedRecord {
                league,
                track,
                slot,
                reason,
            } => write!(
                f,
                "{league} League track {} record {}: {reason}",
                track + 1,
                slot + 1
            ),
            Self::InvalidUnlocks { raw } => write!(f, "invalid Master unlocks byte 0x{raw:02X}"),
            Self::Truncated {
                section,
                needed,
                found,
            } => write!(f, "{section} truncated: need {needed} bytes, got {found}"),
        }
    }
}

/// Collects [`Issue`]s in the order the decoder meets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
