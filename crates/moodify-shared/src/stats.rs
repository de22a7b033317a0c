//! Dashboard figures derived from the mood history.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::constants::CHART_WINDOW;
use crate::types::{MoodEntry, MoodKind};

/// Chart value of a mood (higher is better).
pub fn mood_value(mood: MoodKind) -> u8 {
    match mood {
        MoodKind::VeryHappy => 10,
        MoodKind::Happy => 8,
        MoodKind::Neutral => 6,
        MoodKind::Sad => 4,
        MoodKind::VerySad => 2,
        MoodKind::Anxious | MoodKind::Stressed => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub at: DateTime<Utc>,
    pub value: u8,
    pub mood: MoodKind,
}

/// The most recent entries, oldest first.
pub fn chart_points(history: &[MoodEntry]) -> Vec<ChartPoint> {
    let mut sorted: Vec<&MoodEntry> = history.iter().collect();
    sorted.sort_by_key(|e| e.created_at);

    let skip = sorted.len().saturating_sub(CHART_WINDOW);
    sorted
        .into_iter()
        .skip(skip)
        .map(|e| ChartPoint {
            at: e.created_at,
            value: mood_value(e.mood),
            mood: e.mood,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodStats {
    pub total_entries: usize,
    pub last_7_days_entries: usize,
    pub most_common_mood: Option<MoodKind>,
}

impl MoodStats {
    pub fn compute(history: &[MoodEntry], now: DateTime<Utc>) -> Self {
        let since = now - Duration::days(7);
        let recent: Vec<&MoodEntry> = history.iter().filter(|e| e.created_at >= since).collect();

        let mut counts: HashMap<MoodKind, usize> = HashMap::new();
        for entry in &recent {
            *counts.entry(entry.mood).or_default() += 1;
        }

        // Ties go to the mood seen first in the window.
        let mut most_common: Option<(MoodKind, usize)> = None;
        for entry in &recent {
            let count = counts[&entry.mood];
            if most_common.map_or(true, |(_, best)| count > best) {
                most_common = Some((entry.mood, count));
            }
        }

        Self {
            total_entries: history.len(),
            last_7_days_entries: recent.len(),
            most_common_mood: most_common.map(|(mood, _)| mood),
        }
    }
}
