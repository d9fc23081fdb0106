//! Instruction prompts for the multimodal model.
//!
//! The prompts declare the exact JSON schema expected in the reply and spell
//! out the domain constraints in prose; everything else about the output
//! format is enforced downstream by extraction and validation.

/// Prompt for locating every player in a frame.
pub fn detection_prompt() -> String {
    r##"You are analyzing a single frame from a football (soccer) match video.
Locate every outfield player and goalkeeper visible in the frame.

IMPORTANT: You must strictly follow this output format.
Return ONLY a single JSON object with this schema:
{
  "teamColors": {"home": "#rrggbb", "away": "#rrggbb"},
  "players": [
    {
      "id": 1,
      "x": 0,
      "y": 0,
      "width": 0,
      "height": 0,
      "confidence": 0.0,
      "jerseyNumber": "10",
      "team": "home",
      "isReferee": false
    }
  ]
}

Constraints:
- x, y, width, height are percentages of the frame dimensions, each in [0, 100],
  with x + width <= 100 and y + height <= 100. x and y are the top-left corner
  of the player's bounding box.
- confidence is a number between 0 and 1.
- team is either "home" or "away", judged by kit color.
- Mark referees and other non-players with "isReferee": true; do not invent
  players that are not clearly visible.
- Return ONLY the JSON object. No explanation, no markdown, no surrounding prose.
"##
    .to_string()
}

/// Prompt for tracking one player, identified by jersey number, in a frame.
pub fn performance_prompt(jersey_number: &str) -> String {
    format!(
        r##"You are analyzing a single frame from a football (soccer) match video.
Locate the player wearing jersey number {jersey_number}, if visible, along with
any players in their immediate vicinity.

IMPORTANT: You must strictly follow this output format.
Return ONLY a single JSON object with this schema:
{{
  "teamColors": {{"home": "#rrggbb", "away": "#rrggbb"}},
  "players": [
    {{
      "id": 1,
      "x": 0,
      "y": 0,
      "width": 0,
      "height": 0,
      "confidence": 0.0,
      "jerseyNumber": "{jersey_number}",
      "team": "home",
      "isReferee": false
    }}
  ]
}}

Constraints:
- x, y, width, height are percentages of the frame dimensions, each in [0, 100],
  with x + width <= 100 and y + height <= 100.
- confidence is a number between 0 and 1.
- team is either "home" or "away", judged by kit color.
- Mark referees with "isReferee": true. If the player is not visible, return an
  empty "players" array.
- Return ONLY the JSON object. No explanation, no markdown, no surrounding prose.
"##
    )
}
