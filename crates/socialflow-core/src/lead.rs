//! Leads captured through public landing pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::LandingPage;
use crate::error::{CoreError, CoreResult};
use crate::workspace::validate_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "qualified" => Some(LeadStatus::Qualified),
            "converted" => Some(LeadStatus::Converted),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub page_id: Uuid,
    pub name: String,

    /// Normalized
    pub email: String,

    pub phone: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form submission from a public landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Lead {
    pub fn new(page: &LandingPage, input: NewLead, now: DateTime<Utc>) -> CoreResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("name must not be empty"));
        }
        let email = validate_email(&input.email)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: page.tenant_id,
            page_id: page.id,
            name,
            email,
            phone: non_blank(input.phone),
            message: non_blank(input.message),
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_status(&mut self, status: LeadStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}
