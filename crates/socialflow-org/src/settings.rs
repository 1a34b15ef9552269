//! Workspace settings
//!
//! Branding and notification preferences for a tenant. Settings stay readable
//! and writable after the subscription expires.

use serde::{Deserialize, Serialize};

/// Settings stored on each tenant.
///
/// # Examples
///
/// ```
/// use socialflow_org::{SettingsPatch, TenantSettings};
///
/// let mut settings = TenantSettings::default();
/// assert_eq!(settings.timezone, "UTC");
///
/// settings.apply(SettingsPatch {
///     timezone: Some("Europe/Berlin".to_string()),
///     ..SettingsPatch::default()
/// });
/// assert_eq!(settings.timezone, "Europe/Berlin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// IANA timezone used to display schedules
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Hashtags appended to new posts by default
    #[serde(default)]
    pub default_hashtags: Vec<String>,

    #[serde(default)]
    pub branding: BrandingSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_hashtags: Vec::new(),
            branding: BrandingSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl TenantSettings {
    /// Overwrite every field the patch carries.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(timezone) = patch.timezone {
            self.timezone = timezone;
        }
        if let Some(hashtags) = patch.default_hashtags {
            self.default_hashtags = hashtags;
        }
        if let Some(branding) = patch.branding {
            self.branding = branding;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingSettings {
    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub logo_url: Option<String>,

    /// Hex color, e.g. `#4f46e5`
    #[serde(default)]
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub email_on_publish_failure: bool,

    #[serde(default)]
    pub weekly_digest: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_on_publish_failure: true,
            weekly_digest: false,
        }
    }
}

/// Partial update for [`TenantSettings`]; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub default_hashtags: Option<Vec<String>>,

    #[serde(default)]
    pub branding: Option<BrandingSettings>,

    #[serde(default)]
    pub notifications: Option<NotificationSettings>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
