//! Workspace overview: simple totals over stored records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialflow_org::GatedAction;
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::instrument;

use crate::access::Actor;
use crate::account::SocialAccount;
use crate::content::LandingPage;
use crate::error::CoreResult;
use crate::lead::{Lead, LeadStatus};
use crate::post::{Post, PostStatus};
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostTotals {
    pub total: u64,
    pub draft: u64,
    pub scheduled: u64,
    pub published: u64,
    pub failed: u64,

    /// Sum over published posts
    pub total_reach: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountTotals {
    pub connected: u64,

    /// From the last sync of each connected account
    pub followers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageTotals {
    pub total: u64,
    pub views: u64,
    pub conversions: u64,

    /// Percent, two decimals
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeadTotals {
    pub total: u64,
    pub new: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsOverview {
    pub posts: PostTotals,
    pub social_accounts: AccountTotals,
    pub landing_pages: PageTotals,
    pub leads: LeadTotals,
}

impl AnalyticsOverview {
    pub fn compute(posts: &[Post], accounts: &[SocialAccount], pages: &[LandingPage], leads: &[Lead]) -> Self {
        let mut post_totals = PostTotals {
            total: posts.len() as u64,
            ..Default::default()
        };
        for post in posts {
            match post.status {
                PostStatus::Draft => post_totals.draft += 1,
                PostStatus::Scheduled => post_totals.scheduled += 1,
                PostStatus::Published => post_totals.published += 1,
                PostStatus::Failed => post_totals.failed += 1,
            }
            if let Some(result) = &post.result {
                post_totals.total_reach += result.total_reach;
            }
        }

        let connected: Vec<&SocialAccount> = accounts.iter().filter(|a| a.is_connected()).collect();
        let social_accounts = AccountTotals {
            connected: connected.len() as u64,
            followers: connected
                .iter()
                .filter_map(|a| a.stats.as_ref())
                .map(|s| s.followers_count)
                .sum(),
        };

        let views: u64 = pages.iter().map(|p| p.views).sum();
        let conversions: u64 = pages.iter().map(|p| p.conversions).sum();
        let conversion_rate = if views == 0 {
            0.0
        } else {
            (conversions as f64 / views as f64 * 10_000.0).round() / 100.0
        };
        let landing_pages = PageTotals {
            total: pages.len() as u64,
            views,
            conversions,
            conversion_rate,
        };

        let leads = LeadTotals {
            total: leads.len() as u64,
            new: leads.iter().filter(|l| l.status == LeadStatus::New).count() as u64,
        };

        Self {
            posts: post_totals,
            social_accounts,
            landing_pages,
            leads,
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn Store>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn overview(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<AnalyticsOverview> {
        actor.permit(ResourceType::Analytics, Action::Read, GatedAction::ReadContent, now)?;

        let tenant_id = actor.tenant_id();
        let posts = self.store.list_posts(tenant_id).await?;
        let accounts = self.store.list_accounts(tenant_id).await?;
        let pages = self.store.list_landing_pages(tenant_id).await?;
        let leads = self.store.list_leads(tenant_id).await?;
        Ok(AnalyticsOverview::compute(&posts, &accounts, &pages, &leads))
    }
}
