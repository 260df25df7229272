//! Catalog and participant types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Codes printed on the hunt's QR stickers.
pub const DEFAULT_CODES: [&str; 5] = ["abc123", "def456", "ghi789", "jkl012", "mno345"];

/// The fixed set of codes that count toward completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    codes: Vec<String>,
}

impl Catalog {
    /// Build a catalog from a list of codes.
    ///
    /// Blank entries are skipped and duplicates collapse to their first
    /// occurrence, so the catalog size is the number of distinct codes.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code: String = code.into();
            let code = code.trim().to_string();
            if !code.is_empty() && !unique.contains(&code) {
                unique.push(code);
            }
        }
        Self { codes: unique }
    }

    /// Parse a comma-separated list such as `"abc123,def456"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_CODES)
    }
}

/// A participant record as persisted by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub registration_number: String,
    /// Collected codes in the order they were first scanned.
    pub components: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(registration_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            registration_number: registration_number.into(),
            components: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_component(&self, code: &str) -> bool {
        self.components.iter().any(|c| c == code)
    }

    /// Add a component. Returns `false` if it was already collected.
    pub fn add_component(&mut self, code: &str) -> bool {
        if self.has_component(code) {
            return false;
        }
        self.components.push(code.to_string());
        self.updated_at = Utc::now();
        true
    }
}

/// Progress of one participant relative to a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantState {
    pub registration_number: String,
    pub components: Vec<String>,
    pub count: usize,
    pub catalog_size: usize,
}

impl ParticipantState {
    /// State of someone who has not scanned anything yet.
    pub fn empty(registration_number: impl Into<String>, catalog: &Catalog) -> Self {
        Self {
            registration_number: registration_number.into(),
            components: Vec::new(),
            count: 0,
            catalog_size: catalog.len(),
        }
    }

    /// Project a stored participant onto the catalog.
    ///
    /// Codes that are no longer part of the catalog are not counted.
    pub fn from_participant(participant: &Participant, catalog: &Catalog) -> Self {
        let components: Vec<String> = participant
            .components
            .iter()
            .filter(|c| catalog.contains(c))
            .cloned()
            .collect();

        Self {
            registration_number: participant.registration_number.clone(),
            count: components.len(),
            components,
            catalog_size: catalog.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.catalog_size
    }
}
