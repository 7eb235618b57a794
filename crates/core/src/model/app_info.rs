use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::id::AppInfoId;

use super::{folded_text, required_text};

/// Published client-app version record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub id: AppInfoId,
    pub os: Option<String>,
    pub version: String,
    #[serde(rename = "update_type")]
    pub update_type: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppInfoInput {
    #[serde(default)]
    pub os: Option<String>,
    pub version: String,
    pub update_type: i64,
}

impl AppInfo {
    pub fn create(input: AppInfoInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let (os, version) = normalize(&input)?;
        Ok(Self {
            id: AppInfoId::new(),
            os,
            version,
            update_type: input.update_type,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, input: AppInfoInput, now: DateTime<Utc>) -> DomainResult<()> {
        let (os, version) = normalize(&input)?;
        self.os = os;
        self.version = version;
        self.update_type = input.update_type;
        self.updated_at = now;
        Ok(())
    }
}

fn normalize(input: &AppInfoInput) -> DomainResult<(Option<String>, String)> {
    let os = input.os.as_deref().map(|os| required_text("os", os)).transpose()?;
    let version = folded_text("version", &input.version)?;
    Ok((os, version))
}
