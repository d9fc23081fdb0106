//! Detection validation and normalization.
//!
//! Takes the extracted JSON object and enforces every domain invariant:
//! coordinates clamped into the percentage ranges, confidence bounded,
//! referees filtered, missing fields defaulted. Out-of-range values are
//! corrected rather than dropped; an element is only discarded when a field
//! with no sensible default is missing, when its confidence falls below the
//! configured floor, or when it is flagged as a referee.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use pitch_models::{Detection, DetectionResultSet, TeamColors, TeamSide};

use crate::error::{InferenceError, InferenceResult};

/// Confidence floor for single-frame high-precision detection.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Confidence floor for multi-sample performance analysis.
pub const PERMISSIVE_MIN_CONFIDENCE: f64 = 0.4;

/// Mid-range default applied when the model omits confidence.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Options controlling normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Elements below this confidence are dropped, not clamped; a too-low
    /// confidence signals a non-player rather than a measurement to correct.
    pub min_confidence: f64,
    /// Timestamp stamped onto every detection in the set.
    pub timestamp_seconds: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            timestamp_seconds: 0.0,
        }
    }
}

impl NormalizeOptions {
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_timestamp(mut self, timestamp_seconds: f64) -> Self {
        self.timestamp_seconds = timestamp_seconds;
        self
    }
}

/// Raw per-element shape as the model tends to emit it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetection {
    id: Option<u32>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    confidence: Option<f64>,
    #[serde(alias = "jerseyNumber", alias = "jersey")]
    jersey_number: Option<Value>,
    team: Option<String>,
    #[serde(alias = "teamColor")]
    team_color: Option<String>,
    #[serde(alias = "isReferee")]
    is_referee: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTeamColors {
    home: Option<String>,
    away: Option<String>,
}

/// Normalize an extracted JSON object into a validated result set.
///
/// Fails with a schema error only when the top-level `players`/`detections`
/// array is absent or not a list; per-element problems are repaired or the
/// element is dropped.
pub fn normalize_detections(
    value: &Value,
    options: &NormalizeOptions,
) -> InferenceResult<DetectionResultSet> {
    let object = value
        .as_object()
        .ok_or_else(|| InferenceError::Schema("top level is not an object".to_string()))?;

    let raw_list = object
        .get("players")
        .or_else(|| object.get("detections"))
        .ok_or_else(|| InferenceError::Schema("missing players/detections array".to_string()))?
        .as_array()
        .ok_or_else(|| InferenceError::Schema("players/detections is not an array".to_string()))?;

    let team_colors = object
        .get("teamColors")
        .and_then(|v| serde_json::from_value::<RawTeamColors>(v.clone()).ok())
        .map(|raw| {
            let defaults = TeamColors::default();
            TeamColors {
                home: raw.home.unwrap_or(defaults.home),
                away: raw.away.unwrap_or(defaults.away),
            }
        })
        .unwrap_or_default();

    let mut detections = Vec::with_capacity(raw_list.len());
    let mut used_ids = HashSet::new();

    for (index, element) in raw_list.iter().enumerate() {
        let raw: RawDetection = match serde_json::from_value(element.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Dropping unparseable detection at index {}: {}", index, e);
                continue;
            }
        };

        if raw.is_referee.unwrap_or(false) {
            debug!("Dropping referee at index {}", index);
            continue;
        }

        // A bounding box with a missing coordinate has no sensible default.
        let (Some(x), Some(y), Some(width), Some(height)) = (raw.x, raw.y, raw.width, raw.height)
        else {
            warn!("Dropping detection at index {} with incomplete box", index);
            continue;
        };

        let confidence = raw.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0);
        if confidence < options.min_confidence {
            debug!(
                "Dropping detection at index {} below confidence floor ({:.2} < {:.2})",
                index, confidence, options.min_confidence
            );
            continue;
        }

        let width = width.clamp(0.0, 100.0);
        let height = height.clamp(0.0, 100.0);
        let x = x.clamp(0.0, 100.0 - width);
        let y = y.clamp(0.0, 100.0 - height);

        let team = raw
            .team
            .as_deref()
            .and_then(parse_team)
            .unwrap_or_else(|| TeamSide::by_position(index));

        let team_color = raw.team_color.unwrap_or_else(|| match team {
            TeamSide::Home => team_colors.home.clone(),
            TeamSide::Away => team_colors.away.clone(),
        });

        let mut id = match raw.id {
            Some(id) if id > 0 => id,
            _ => index as u32 + 1,
        };
        while !used_ids.insert(id) {
            id += 1;
        }

        let jersey_number = raw
            .jersey_number
            .as_ref()
            .and_then(jersey_to_string)
            .unwrap_or_else(|| id.to_string());

        detections.push(Detection {
            id,
            x,
            y,
            width,
            height,
            confidence,
            jersey_number,
            team,
            team_color,
            timestamp_seconds: options.timestamp_seconds,
            is_referee: false,
        });
    }

    debug!(
        "Normalized {} of {} raw detections",
        detections.len(),
        raw_list.len()
    );

    Ok(DetectionResultSet {
        team_colors,
        detections,
        degraded: false,
    })
}

fn parse_team(raw: &str) -> Option<TeamSide> {
    match raw.to_ascii_lowercase().as_str() {
        "home" => Some(TeamSide::Home),
        "away" => Some(TeamSide::Away),
        _ => None,
    }
}

/// Jersey numbers arrive as strings or bare numbers.
fn jersey_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> DetectionResultSet {
        normalize_detections(&value, &NormalizeOptions::default().with_timestamp(12.0)).unwrap()
    }

    #[test]
    fn test_missing_array_is_schema_error() {
        let err = normalize_detections(&json!({"teams": []}), &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::Schema(_)));

        let err = normalize_detections(&json!({"players": 3}), &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::Schema(_)));
    }

    #[test]
    fn test_detections_alias_accepted() {
        let set = normalize(json!({"detections": [
            {"x": 10, "y": 10, "width": 5, "height": 10, "confidence": 0.9}
        ]}));
        assert_eq!(set.detections.len(), 1);
    }

    #[test]
    fn test_out_of_range_x_clamped_against_width() {
        let set = normalize(json!({"players": [
            {"id": 1, "x": 150, "y": 10, "width": 8, "height": 18, "confidence": 0.9, "team": "home"}
        ]}));
        let d = &set.detections[0];
        assert!(d.x <= 100.0 - d.width);
        assert!(d.is_valid());
    }

    #[test]
    fn test_referee_never_surfaces() {
        let set = normalize(json!({"players": [
            {"id": 1, "x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.99, "isReferee": true},
            {"id": 2, "x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.99}
        ]}));
        assert_eq!(set.detections.len(), 1);
        assert_eq!(set.detections[0].id, 2);
        assert!(set.detections.iter().all(|d| !d.is_referee));
    }

    #[test]
    fn test_low_confidence_dropped_not_clamped() {
        let set = normalize(json!({"players": [
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.2},
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9}
        ]}));
        assert_eq!(set.detections.len(), 1);
        assert!((set.detections[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_missing_confidence_defaults_mid_range() {
        let options = NormalizeOptions::default().with_min_confidence(0.4);
        let set = normalize_detections(
            &json!({"players": [{"x": 1, "y": 1, "width": 5, "height": 10}]}),
            &options,
        )
        .unwrap();
        assert!((set.detections[0].confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_box_dropped() {
        let set = normalize(json!({"players": [
            {"x": 1, "y": 1, "height": 10, "confidence": 0.9}
        ]}));
        assert!(set.detections.is_empty());
    }

    #[test]
    fn test_missing_team_alternates_by_position() {
        let set = normalize(json!({"players": [
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9},
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9},
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9}
        ]}));
        assert_eq!(set.detections[0].team, TeamSide::Home);
        assert_eq!(set.detections[1].team, TeamSide::Away);
        assert_eq!(set.detections[2].team, TeamSide::Home);
    }

    #[test]
    fn test_defaults_for_id_and_jersey() {
        let set = normalize(json!({"players": [
            {"x": 10, "y": 10, "width": 8, "height": 18, "confidence": 0.9, "team": "home"}
        ]}));
        let d = &set.detections[0];
        assert_eq!(d.id, 1);
        assert_eq!(d.jersey_number, "1");
        assert!((d.timestamp_seconds - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_jersey_stringified() {
        let set = normalize(json!({"players": [
            {"x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9, "jersey": 10}
        ]}));
        assert_eq!(set.detections[0].jersey_number, "10");
    }

    #[test]
    fn test_duplicate_ids_made_unique() {
        let set = normalize(json!({"players": [
            {"id": 3, "x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9},
            {"id": 3, "x": 1, "y": 1, "width": 5, "height": 10, "confidence": 0.9}
        ]}));
        let ids: HashSet<u32> = set.detections.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_team_colors_parsed_with_defaults() {
        let set = normalize(json!({
            "teamColors": {"home": "#abcdef"},
            "players": []
        }));
        assert_eq!(set.team_colors.home, "#abcdef");
        assert_eq!(set.team_colors.away, TeamColors::default().away);
    }

    #[test]
    fn test_every_output_satisfies_invariants() {
        let set = normalize(json!({"players": [
            {"x": -20, "y": 110, "width": 130, "height": -4, "confidence": 3.0},
            {"id": 9, "x": 99, "y": 99, "width": 30, "height": 30, "confidence": 0.61}
        ]}));
        assert!(set.detections.iter().all(|d| d.is_valid()));
    }
}
