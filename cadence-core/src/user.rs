//! User profile: identity fields, time zone and progress counters.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::achievements::{self, Achievement, ProgressSnapshot};
use crate::error::EngineResult;
use crate::streak::{DEFAULT_DAILY_GOAL, Streak};
use crate::time::parse_tz;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub key: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    /// IANA zone id.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub streak: Streak,
    #[serde(default)]
    pub total_completed: u32,
    #[serde(default)]
    pub achievements: Vec<EarnedAchievement>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_daily_goal() -> u32 {
    DEFAULT_DAILY_GOAL
}

impl UserProfile {
    pub fn new(
        id: u64,
        username: impl Into<String>,
        email: impl Into<String>,
        timezone: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            created_at,
            last_login: None,
            timezone: timezone.into(),
            daily_goal: DEFAULT_DAILY_GOAL,
            streak: Streak::default(),
            total_completed: 0,
            achievements: Vec::new(),
        }
    }

    pub fn tz(&self) -> EngineResult<Tz> {
        parse_tz(&self.timezone)
    }

    pub fn has_achievement(&self, key: &str) -> bool {
        self.achievements.iter().any(|a| a.key == key)
    }

    /// Record every newly met achievement at `now`; returns what was added.
    pub fn award_achievements(
        &mut self,
        completed_today: u32,
        now: DateTime<Utc>,
    ) -> Vec<&'static Achievement> {
        let snapshot = ProgressSnapshot {
            total_completed: self.total_completed,
            current_streak: self.streak.current,
            completed_today,
        };
        let held: Vec<&str> = self.achievements.iter().map(|a| a.key.as_str()).collect();
        let fresh = achievements::newly_earned(&snapshot, &held);
        for a in &fresh {
            self.achievements.push(EarnedAchievement {
                key: a.key.to_string(),
                earned_at: now,
            });
        }
        fresh
    }

    /// Latest `n` earned achievements, newest first.
    pub fn recent_achievements(&self, n: usize) -> Vec<&EarnedAchievement> {
        let mut all: Vec<&EarnedAchievement> = self.achievements.iter().collect();
        all.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        all.truncate(n);
        all
    }
}
