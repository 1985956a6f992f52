use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    MetaAds,
    GoogleAds,
    TiktokAds,
    LinkedinAds,
    SnapchatAds,
    TwitterAds,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl Platform {
    /// Platforms synced by default, in run order.
    pub const DEFAULT_ORDER: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::MetaAds,
        Platform::GoogleAds,
        Platform::TiktokAds,
    ];

    pub const ALL: [Platform; 8] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::MetaAds,
        Platform::GoogleAds,
        Platform::TiktokAds,
        Platform::LinkedinAds,
        Platform::SnapchatAds,
        Platform::TwitterAds,
    ];

    /// Identifier stored in the `integrations.platform` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::MetaAds => "meta_ads",
            Platform::GoogleAds => "google_ads",
            Platform::TiktokAds => "tiktok_ads",
            Platform::LinkedinAds => "linkedin_ads",
            Platform::SnapchatAds => "snapchat_ads",
            Platform::TwitterAds => "twitter_ads",
        }
    }

    /// Name used on the command line, e.g. `meta-ads`.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::MetaAds => "meta-ads",
            Platform::GoogleAds => "google-ads",
            Platform::TiktokAds => "tiktok-ads",
            Platform::LinkedinAds => "linkedin-ads",
            Platform::SnapchatAds => "snapchat-ads",
            Platform::TwitterAds => "twitter-ads",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::MetaAds => "Meta Ads",
            Platform::GoogleAds => "Google Ads",
            Platform::TiktokAds => "TikTok Ads",
            Platform::LinkedinAds => "LinkedIn Ads",
            Platform::SnapchatAds => "Snapchat Ads",
            Platform::TwitterAds => "Twitter Ads",
        }
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Active,
    Inactive,
    Error,
}

impl IntegrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Active => "active",
            IntegrationStatus::Inactive => "inactive",
            IntegrationStatus::Error => "error",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        match s {
            "active" => Some(IntegrationStatus::Active),
            "inactive" => Some(IntegrationStatus::Inactive),
            "error" => Some(IntegrationStatus::Error),
            _ => None,
        }
    }
}

/// A tenant's connected account on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    pub id: String,
    pub platform: Platform,
    pub tenant_id: String,
    pub status: IntegrationStatus,
}

impl Integration {
    pub fn is_active(&self) -> bool {
        self.status == IntegrationStatus::Active
    }
}

/// Which organizations a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TenantScope {
    #[default]
    All,
    Tenant(String),
}

impl TenantScope {
    /// `None` means every tenant. Callers reject blank ids before getting here.
    pub fn from_org(org: Option<String>) -> Self {
        match org {
            Some(id) => TenantScope::Tenant(id),
            None => TenantScope::All,
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            TenantScope::All => None,
            TenantScope::Tenant(id) => Some(id),
        }
    }

    pub fn includes(&self, tenant_id: &str) -> bool {
        match self {
            TenantScope::All => true,
            TenantScope::Tenant(id) => id == tenant_id,
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantScope::All => f.write_str("all tenants"),
            TenantScope::Tenant(id) => write!(f, "tenant {id}"),
        }
    }
}

/// Unit of work handed to the job queue for one integration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncTask {
    pub integration_id: String,
    pub tenant_id: String,
    pub platform: Platform,
    pub requested_at: DateTime<Utc>,
}

impl SyncTask {
    pub fn for_integration(integration: &Integration) -> Self {
        Self {
            integration_id: integration.id.clone(),
            tenant_id: integration.tenant_id.clone(),
            platform: integration.platform,
            requested_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_slug_and_storage_name() {
        assert_eq!("meta-ads".parse::<Platform>().unwrap(), Platform::MetaAds);
        assert_eq!("meta_ads".parse::<Platform>().unwrap(), Platform::MetaAds);
        assert_eq!("TikTok-Ads".parse::<Platform>().unwrap(), Platform::TiktokAds);
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn slug_round_trips_for_every_platform() {
        for p in Platform::ALL {
            assert_eq!(p.slug().parse::<Platform>().unwrap(), p);
        }
    }

    #[test]
    fn platform_serializes_as_storage_name() {
        let json = serde_json::to_string(&Platform::GoogleAds).unwrap();
        assert_eq!(json, "\"google_ads\"");
    }

    #[test]
    fn scope_from_org() {
        assert_eq!(TenantScope::from_org(None), TenantScope::All);
        let scoped = TenantScope::from_org(Some("org-1".into()));
        assert!(scoped.includes("org-1"));
        assert!(!scoped.includes("org-2"));
    }
}
