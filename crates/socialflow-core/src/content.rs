//! Templates, landing pages and AI generation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_connectors::GenerationKind;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub description: String,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ai_generated: bool,
}

impl Template {
    pub fn new(tenant_id: Uuid, author_id: Uuid, input: NewTemplate, now: DateTime<Utc>) -> CoreResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("template name must not be empty"));
        }
        let category = match input.category.trim() {
            "" => "general".to_string(),
            other => other.to_lowercase(),
        };
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            author_id,
            name,
            category,
            image_url: input.image_url,
            description: input.description,
            ai_generated: input.ai_generated,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingPage {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub headline: String,
    pub description: String,
    pub cta_text: String,

    /// Globally unique
    pub slug: String,

    pub views: u64,
    pub conversions: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLandingPage {
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cta_text: String,

    /// Derived from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
}

impl LandingPage {
    pub fn new(tenant_id: Uuid, author_id: Uuid, input: NewLandingPage, now: DateTime<Utc>) -> CoreResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("landing page name must not be empty"));
        }
        let slug = slugify(input.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(CoreError::invalid("landing page slug must contain letters or digits"));
        }
        let cta_text = match input.cta_text.trim() {
            "" => "Sign up".to_string(),
            other => other.to_string(),
        };
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            author_id,
            name,
            headline: input.headline,
            description: input.description,
            cta_text,
            slug,
            views: 0,
            conversions: 0,
            created_at: now,
        })
    }

    /// Conversions per view, as a percentage.
    pub fn conversion_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        self.conversions as f64 / self.views as f64 * 100.0
    }
}

/// Lowercase ASCII slug with single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// One successful AI generation, counted against the monthly quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiGeneration {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub kind: GenerationKind,
    pub created_at: DateTime<Utc>,
}

impl AiGeneration {
    pub fn new(tenant_id: Uuid, user_id: Uuid, kind: GenerationKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            user_id,
            kind,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Summer Sale 2026!"), "summer-sale-2026");
        assert_eq!(slugify("  --Hello,   World--  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_landing_page_defaults() {
        let page = LandingPage::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            NewLandingPage {
                name: "Spring Launch".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(page.slug, "spring-launch");
        assert_eq!(page.cta_text, "Sign up");
        assert_eq!(page.conversion_rate(), 0.0);
    }

    #[test]
    fn test_template_requires_name() {
        let err = Template::new(Uuid::now_v7(), Uuid::now_v7(), NewTemplate::default(), Utc::now());
        assert!(matches!(err, Err(CoreError::InvalidInput(_))));
    }
}
