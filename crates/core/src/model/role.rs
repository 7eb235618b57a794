use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::id::RoleId;

use super::folded_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Both create and update require the full body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleInput {
    pub name: String,
    pub score: i64,
}

impl Role {
    pub fn create(input: RoleInput, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            name: folded_text("name", &input.name)?,
            score: input.score,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, input: RoleInput, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = folded_text("name", &input.name)?;
        self.score = input.score;
        self.updated_at = now;
        Ok(())
    }
}
