use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::id::ModuleId;

use super::folded_text;

/// A protectable resource area, referenced by name from `"module:right"`
/// declarations. Names are stored case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleInput {
    pub name: String,
}

impl Module {
    pub fn create(input: ModuleInput, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: ModuleId::new(),
            name: folded_text("name", &input.name)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, input: ModuleInput, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = folded_text("name", &input.name)?;
        self.updated_at = now;
        Ok(())
    }
}
