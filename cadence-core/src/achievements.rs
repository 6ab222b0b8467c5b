//! Achievement catalog and award rules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Lifetime completed tasks.
    TotalTasks(u32),
    /// Current streak length in days.
    Streak(u32),
    /// Tasks completed within one local day.
    DailyCount(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
    pub requirement: Requirement,
    pub points: u32,
}

pub const CATALOG: &[Achievement] = &[
    Achievement {
        key: "getting_started",
        name: "Getting Started",
        description: "Complete your first task",
        icon: "🎯",
        category: "milestone",
        requirement: Requirement::TotalTasks(1),
        points: 5,
    },
    Achievement {
        key: "day_1",
        name: "Day 1",
        description: "Start your first streak",
        icon: "🔥",
        category: "streak",
        requirement: Requirement::Streak(1),
        points: 10,
    },
    Achievement {
        key: "hot_streak",
        name: "Hot Streak",
        description: "3 days in a row!",
        icon: "🔥",
        category: "streak",
        requirement: Requirement::Streak(3),
        points: 25,
    },
    Achievement {
        key: "on_fire",
        name: "On Fire",
        description: "7 days in a row!",
        icon: "🚀",
        category: "streak",
        requirement: Requirement::Streak(7),
        points: 50,
    },
    Achievement {
        key: "unstoppable",
        name: "Unstoppable",
        description: "30 days in a row!",
        icon: "⚡",
        category: "streak",
        requirement: Requirement::Streak(30),
        points: 200,
    },
    Achievement {
        key: "legend",
        name: "Legend",
        description: "100 days in a row!",
        icon: "👑",
        category: "streak",
        requirement: Requirement::Streak(100),
        points: 500,
    },
    Achievement {
        key: "productive",
        name: "Productive",
        description: "Complete 10 tasks",
        icon: "📋",
        category: "milestone",
        requirement: Requirement::TotalTasks(10),
        points: 20,
    },
    Achievement {
        key: "task_master",
        name: "Task Master",
        description: "Complete 50 tasks",
        icon: "🏆",
        category: "milestone",
        requirement: Requirement::TotalTasks(50),
        points: 100,
    },
    Achievement {
        key: "achiever",
        name: "Achiever",
        description: "Complete 100 tasks",
        icon: "🎖️",
        category: "milestone",
        requirement: Requirement::TotalTasks(100),
        points: 250,
    },
    Achievement {
        key: "champion",
        name: "Champion",
        description: "Complete 500 tasks",
        icon: "🥇",
        category: "milestone",
        requirement: Requirement::TotalTasks(500),
        points: 1000,
    },
    Achievement {
        key: "goal_crusher",
        name: "Goal Crusher",
        description: "Reach your daily goal",
        icon: "🎯",
        category: "daily",
        requirement: Requirement::DailyCount(3),
        points: 15,
    },
    Achievement {
        key: "overachiever",
        name: "Overachiever",
        description: "Complete 5 tasks in one day",
        icon: "⭐",
        category: "daily",
        requirement: Requirement::DailyCount(5),
        points: 30,
    },
    Achievement {
        key: "productivity_beast",
        name: "Productivity Beast",
        description: "Complete 10 tasks in one day",
        icon: "🦾",
        category: "daily",
        requirement: Requirement::DailyCount(10),
        points: 50,
    },
];

/// The numbers achievements are judged on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total_completed: u32,
    pub current_streak: u32,
    pub completed_today: u32,
}

impl Requirement {
    pub fn is_met(&self, s: &ProgressSnapshot) -> bool {
        match *self {
            Requirement::TotalTasks(n) => s.total_completed >= n,
            Requirement::Streak(n) => s.current_streak >= n,
            Requirement::DailyCount(n) => s.completed_today >= n,
        }
    }
}

pub fn find(key: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.key == key)
}

/// Catalog entries whose requirement is met and whose key is not in `earned`.
pub fn newly_earned(snapshot: &ProgressSnapshot, earned: &[&str]) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !earned.contains(&a.key))
        .filter(|a| a.requirement.is_met(snapshot))
        .collect()
}
