//! Priority bucketing.
//!
//! Work items carry up to four independent scores in [0,1]. Views never show
//! a raw score; they show one of five ordinal buckets derived with fixed
//! half-open thresholds:
//!
//! | score          | bucket   |
//! |----------------|----------|
//! | `>= 0.8`       | critical |
//! | `[0.6, 0.8)`   | high     |
//! | `[0.4, 0.6)`   | moderate |
//! | `[0.2, 0.4)`   | low      |
//! | `< 0.2`        | minimal  |
//!
//! Out-of-range scores clamp to the extremes; NaN counts as 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::WorkItem;

/// Lower bound of the critical bucket.
pub const CRITICAL_THRESHOLD: f64 = 0.8;
/// Lower bound of the high bucket.
pub const HIGH_THRESHOLD: f64 = 0.6;
/// Lower bound of the moderate bucket.
pub const MODERATE_THRESHOLD: f64 = 0.4;
/// Lower bound of the low bucket.
pub const LOW_THRESHOLD: f64 = 0.2;

/// Ordinal priority label. Ordering follows rank: minimal < ... < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBucket {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
}

impl PriorityBucket {
    /// Map a score to its bucket. Total and monotonic non-decreasing.
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= CRITICAL_THRESHOLD {
            PriorityBucket::Critical
        } else if score >= HIGH_THRESHOLD {
            PriorityBucket::High
        } else if score >= MODERATE_THRESHOLD {
            PriorityBucket::Moderate
        } else if score >= LOW_THRESHOLD {
            PriorityBucket::Low
        } else {
            PriorityBucket::Minimal
        }
    }

    /// 0 for minimal through 4 for critical.
    pub fn rank(&self) -> u8 {
        match self {
            PriorityBucket::Minimal => 0,
            PriorityBucket::Low => 1,
            PriorityBucket::Moderate => 2,
            PriorityBucket::High => 3,
            PriorityBucket::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityBucket::Minimal => "minimal",
            PriorityBucket::Low => "low",
            PriorityBucket::Moderate => "moderate",
            PriorityBucket::High => "high",
            PriorityBucket::Critical => "critical",
        }
    }

    /// All buckets, highest first (display order).
    pub fn all() -> &'static [PriorityBucket] {
        &[
            PriorityBucket::Critical,
            PriorityBucket::High,
            PriorityBucket::Moderate,
            PriorityBucket::Low,
            PriorityBucket::Minimal,
        ]
    }
}

/// Shorthand for [`PriorityBucket::from_score`].
pub fn bucket(score: f64) -> PriorityBucket {
    PriorityBucket::from_score(score)
}

/// Clamp into [0,1], mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

impl fmt::Display for PriorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PriorityBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(PriorityBucket::Critical),
            "high" => Ok(PriorityBucket::High),
            "moderate" | "medium" => Ok(PriorityBucket::Moderate),
            "low" => Ok(PriorityBucket::Low),
            "minimal" => Ok(PriorityBucket::Minimal),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Which score counts as "the" priority of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityField {
    /// `priorityExec`
    Exec,
    /// `priorityIndiv`
    Indiv,
    /// `priorityComm`
    Comm,
    /// `priorityComp`, falling back to the mean of the other present scores
    #[default]
    Comp,
    /// Mean of all present scores
    Average,
}

impl PriorityField {
    /// Score of `item` under this field, clamped to [0,1]. Missing scores are 0.
    pub fn score(&self, item: &WorkItem) -> f64 {
        let raw = match self {
            PriorityField::Exec => item.priority_exec,
            PriorityField::Indiv => item.priority_indiv,
            PriorityField::Comm => item.priority_comm,
            PriorityField::Comp => item.priority_comp.or_else(|| {
                mean([item.priority_exec, item.priority_indiv, item.priority_comm])
            }),
            PriorityField::Average => mean([
                item.priority_exec,
                item.priority_indiv,
                item.priority_comm,
                item.priority_comp,
            ]),
        };
        clamp_score(raw.unwrap_or(0.0))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityField::Exec => "exec",
            PriorityField::Indiv => "indiv",
            PriorityField::Comm => "comm",
            PriorityField::Comp => "comp",
            PriorityField::Average => "average",
        }
    }
}

fn mean<const N: usize>(scores: [Option<f64>; N]) -> Option<f64> {
    let present: Vec<f64> = scores.into_iter().flatten().filter(|s| !s.is_nan()).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

impl fmt::Display for PriorityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PriorityField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exec" | "executive" => Ok(PriorityField::Exec),
            "indiv" | "individual" => Ok(PriorityField::Indiv),
            "comm" | "community" => Ok(PriorityField::Comm),
            "comp" | "composite" => Ok(PriorityField::Comp),
            "average" | "avg" => Ok(PriorityField::Average),
            _ => Err(format!("Unknown priority field: {}", s)),
        }
    }
}
