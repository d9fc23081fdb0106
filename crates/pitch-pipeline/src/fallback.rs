//! Deterministic fallback detections.
//!
//! When every real inference attempt is exhausted the caller still receives a
//! schema-valid result set, flagged `degraded`. Returning nothing on repeated
//! model failure is treated as worse than returning a labeled synthetic
//! result in this best-effort feature.

use pitch_models::{Detection, DetectionResultSet, TeamColors, TeamSide};

/// Confidence assigned to synthetic detections; low enough to read as
/// tentative, high enough to render.
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Fixed layout of synthetic players: (x, y, width, height, jersey).
const FALLBACK_POSITIONS: &[(f64, f64, f64, f64, &str)] = &[
    (18.0, 30.0, 6.0, 14.0, "4"),
    (32.0, 55.0, 6.0, 14.0, "8"),
    (45.0, 25.0, 6.0, 14.0, "10"),
    (55.0, 60.0, 6.0, 14.0, "6"),
    (68.0, 35.0, 6.0, 14.0, "9"),
    (80.0, 50.0, 6.0, 14.0, "11"),
];

/// Build the deterministic fallback result set for a frame timestamp.
pub fn fallback_detections(timestamp_seconds: f64) -> DetectionResultSet {
    let team_colors = TeamColors::default();
    let detections = FALLBACK_POSITIONS
        .iter()
        .enumerate()
        .map(|(index, &(x, y, width, height, jersey))| {
            let team = TeamSide::by_position(index);
            Detection {
                id: index as u32 + 1,
                x,
                y,
                width,
                height,
                confidence: FALLBACK_CONFIDENCE,
                jersey_number: jersey.to_string(),
                team,
                team_color: match team {
                    TeamSide::Home => team_colors.home.clone(),
                    TeamSide::Away => team_colors.away.clone(),
                },
                timestamp_seconds,
                is_referee: false,
            }
        })
        .collect();

    DetectionResultSet {
        team_colors,
        detections,
        degraded: true,
    }
}
