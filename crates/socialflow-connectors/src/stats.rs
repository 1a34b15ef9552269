//! Simulated reach and account statistics.
//!
//! The mock connector never invents numbers itself; it asks a [`StatsSource`].
//! Production wiring uses [`RandomStats`], tests use [`FixedStats`].

use crate::types::{AccountStats, Platform};
use chrono::Utc;
use rand::Rng;
use std::ops::RangeInclusive;

pub const REACH_RANGE: RangeInclusive<u64> = 100..=5000;
pub const FOLLOWERS_RANGE: RangeInclusive<u64> = 100..=50_000;
pub const FOLLOWING_RANGE: RangeInclusive<u64> = 50..=2_000;
pub const POSTS_RANGE: RangeInclusive<u64> = 10..=500;

pub trait StatsSource: Send + Sync {
    /// Estimated reach of one simulated publish.
    fn reach(&self, platform: Platform) -> u64;

    fn account_stats(&self, platform: Platform) -> AccountStats;
}

/// Uniformly random stats within fixed bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStats;

impl StatsSource for RandomStats {
    fn reach(&self, _platform: Platform) -> u64 {
        rand::thread_rng().gen_range(REACH_RANGE)
    }

    fn account_stats(&self, _platform: Platform) -> AccountStats {
        let mut rng = rand::thread_rng();
        let engagement: f64 = rng.gen_range(1.0..8.0);
        AccountStats {
            followers_count: rng.gen_range(FOLLOWERS_RANGE),
            following_count: rng.gen_range(FOLLOWING_RANGE),
            posts_count: rng.gen_range(POSTS_RANGE),
            engagement_rate: (engagement * 100.0).round() / 100.0,
            last_synced_at: Utc::now(),
        }
    }
}

/// Constant stats.
#[derive(Debug, Clone, Copy)]
pub struct FixedStats {
    pub reach: u64,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    pub engagement_rate: f64,
}

impl FixedStats {
    pub fn with_reach(reach: u64) -> Self {
        Self {
            reach,
            ..Default::default()
        }
    }
}

impl Default for FixedStats {
    fn default() -> Self {
        Self {
            reach: 1000,
            followers: 2500,
            following: 300,
            posts: 42,
            engagement_rate: 3.5,
        }
    }
}

impl StatsSource for FixedStats {
    fn reach(&self, _platform: Platform) -> u64 {
        self.reach
    }

    fn account_stats(&self, _platform: Platform) -> AccountStats {
        AccountStats {
            followers_count: self.followers,
            following_count: self.following,
            posts_count: self.posts,
            engagement_rate: self.engagement_rate,
            last_synced_at: Utc::now(),
        }
    }
}
