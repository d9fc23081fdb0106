//! Player detections and detection result sets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which team a detected player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Alternating assignment used when the model omits the team field.
    pub fn by_position(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Home
        } else {
            Self::Away
        }
    }
}

/// Dominant jersey colors for the two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamColors {
    pub home: String,
    pub away: String,
}

impl Default for TeamColors {
    fn default() -> Self {
        Self {
            home: "#e53935".to_string(),
            away: "#1e88e5".to_string(),
        }
    }
}

/// One identified player.
///
/// The bounding box is expressed in percentages of the source frame:
/// `x`, `y`, `width`, `height` are each in `[0, 100]` with
/// `x + width <= 100` and `y + height <= 100`. Instances produced by the
/// validator always satisfy these bounds and never describe referees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Positive, unique within a result set
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// Shirt number as displayed, defaulted to the id when unreadable
    pub jersey_number: String,
    pub team: TeamSide,
    /// Approximate jersey color of this player's team
    pub team_color: String,
    /// Timestamp of the source frame within the video
    pub timestamp_seconds: f64,
    /// Always false in validated output; referees are filtered out
    pub is_referee: bool,
}

impl Detection {
    /// Check the bounding-box and confidence invariants.
    pub fn is_valid(&self) -> bool {
        self.id > 0
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 100.001 // Allow small epsilon for float precision
            && self.y + self.height <= 100.001
            && (0.0..=1.0).contains(&self.confidence)
            && !self.is_referee
    }
}

/// A validated set of detections for one or more frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResultSet {
    pub team_colors: TeamColors,
    pub detections: Vec<Detection>,
    /// True when this set was synthesized by the fallback generator after
    /// all real inference attempts were exhausted.
    #[serde(default)]
    pub degraded: bool,
}

impl DetectionResultSet {
    /// An empty, non-degraded result set with default colors.
    pub fn empty() -> Self {
        Self {
            team_colors: TeamColors::default(),
            detections: Vec::new(),
            degraded: false,
        }
    }

    /// Merge another result set into this one, keeping ids unique.
    pub fn merge(&mut self, other: DetectionResultSet) {
        let offset = self.detections.iter().map(|d| d.id).max().unwrap_or(0);
        for mut d in other.detections {
            d.id += offset;
            self.detections.push(d);
        }
        self.degraded |= other.degraded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32) -> Detection {
        Detection {
            id,
            x: 10.0,
            y: 20.0,
            width: 8.0,
            height: 18.0,
            confidence: 0.9,
            jersey_number: id.to_string(),
            team: TeamSide::Home,
            team_color: "#e53935".to_string(),
            timestamp_seconds: 42.0,
            is_referee: false,
        }
    }

    #[test]
    fn test_team_by_position_alternates() {
        assert_eq!(TeamSide::by_position(0), TeamSide::Home);
        assert_eq!(TeamSide::by_position(1), TeamSide::Away);
        assert_eq!(TeamSide::by_position(2), TeamSide::Home);
    }

    #[test]
    fn test_detection_validity() {
        assert!(sample(1).is_valid());

        let mut d = sample(1);
        d.x = 95.0; // 95 + 8 > 100
        assert!(!d.is_valid());

        let mut d = sample(1);
        d.is_referee = true;
        assert!(!d.is_valid());

        let mut d = sample(1);
        d.confidence = 1.2;
        assert!(!d.is_valid());
    }

    #[test]
    fn test_merge_keeps_ids_unique() {
        let mut a = DetectionResultSet::empty();
        a.detections = vec![sample(1), sample(2)];

        let mut b = DetectionResultSet::empty();
        b.detections = vec![sample(1)];
        b.degraded = true;

        a.merge(b);
        let ids: Vec<u32> = a.detections.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(a.degraded);
    }
}
