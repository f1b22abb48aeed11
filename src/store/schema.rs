use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk layout of one session: a flat string map, like browser session storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionFile {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

impl SessionFile {
    /// Check if loaded data has a stale schema version and must be discarded.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
