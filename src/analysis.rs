//! Turning a free-text (or transcribed voice) mood description into mood
//! weights. Best effort throughout: a language model is asked first, and a
//! keyword match is used whenever that is unavailable or its reply is
//! unusable.

use crate::playlist::MoodWeights;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Moods the frontend offers, in display order
pub const KNOWN_MOODS: [&str; 5] = ["Happy", "Sad", "Party", "Chill", "Peace"];

/// Weight given to a mood the model did not mention
pub const DEFAULT_WEIGHT: f64 = 20.0;

const MOOD_KEYWORDS: [(&str, &[&str]); 5] = [
    (
        "Happy",
        &[
            "happy", "joy", "joyful", "cheerful", "upbeat", "sunny", "glad", "smile",
            "excited", "good mood", "great day", "fun",
        ],
    ),
    (
        "Sad",
        &[
            "sad", "down", "blue", "depressed", "lonely", "heartbroken", "cry", "crying",
            "melancholy", "upset", "gloomy", "breakup",
        ],
    ),
    (
        "Party",
        &[
            "party", "dance", "dancing", "club", "hype", "celebrate", "celebration",
            "energetic", "workout", "pumped", "friday night",
        ],
    ),
    (
        "Chill",
        &[
            "chill", "relax", "relaxed", "relaxing", "calm", "lazy", "laid back", "lofi",
            "lo-fi", "study", "focus", "cozy",
        ],
    ),
    (
        "Peace",
        &[
            "peace", "peaceful", "meditate", "meditation", "serene", "quiet", "sleep",
            "tranquil", "zen", "mindful", "nature", "soothing",
        ],
    ),
];

/// A language model that can answer a mood prompt
#[cfg_attr(test, mockall::automock)]
pub trait MoodAnalyzer: Send + Sync {
    /// Raw reply text for the prompt
    fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Find the first JSON object embedded in free text.
///
/// Model replies often wrap the object in prose or code fences. The span
/// from the first `{` to the last `}` is tried first, then every balanced
/// `{...}` in order of appearance.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let parse = |candidate: &str| match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    };

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        if let Some(object) = parse(&text[start..=end]) {
            return Some(object);
        }
    }

    text.match_indices('{')
        .filter_map(|(start, _)| {
            matching_brace(&text[start..]).map(|end| &text[start..=start + end])
        })
        .find_map(parse)
}

/// Byte offset of the brace closing the one `text` starts with
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Numeric value of a reply field: numbers, or strings like "70" and "70%"
fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Weights for every known mood from a parsed reply. Keys match
/// case-insensitively; missing or unusable values get [`DEFAULT_WEIGHT`];
/// everything is clamped to 0..=100 and rounded.
pub fn weights_from_json(object: &Map<String, Value>) -> MoodWeights {
    let entries = KNOWN_MOODS.iter().map(|&mood| {
        let weight = object
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(mood))
            .and_then(|(_, value)| numeric(value))
            .unwrap_or(DEFAULT_WEIGHT);
        (mood, weight.clamp(0.0, 100.0).round())
    });
    MoodWeights::clamped(entries)
}

/// Weights from keyword hits in the prompt. No hits means an even mix.
pub fn keyword_weights(prompt: &str) -> MoodWeights {
    let normalized: String = prompt
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    let padded = format!(" {} ", normalized.split_whitespace().collect::<Vec<_>>().join(" "));

    let hits: Vec<(&str, usize)> = MOOD_KEYWORDS
        .iter()
        .map(|(mood, keywords)| {
            let count = keywords
                .iter()
                .filter(|keyword| padded.contains(&format!(" {keyword} ")))
                .count();
            (*mood, count)
        })
        .collect();

    let total: usize = hits.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return MoodWeights::clamped(KNOWN_MOODS.iter().map(|&mood| (mood, DEFAULT_WEIGHT)));
    }

    MoodWeights::clamped(hits.into_iter().map(|(mood, count)| {
        (mood, (100.0 * count as f64 / total as f64).round())
    }))
}

/// Prompt analysis with the model when configured and keywords otherwise
pub struct MoodPromptAnalyzer {
    model: Option<Arc<dyn MoodAnalyzer>>,
}

impl MoodPromptAnalyzer {
    pub fn new(model: Option<Arc<dyn MoodAnalyzer>>) -> Self {
        Self { model }
    }

    /// Keyword matching only
    pub fn keywords_only() -> Self {
        Self { model: None }
    }

    pub fn uses_model(&self) -> bool {
        self.model.is_some()
    }

    /// Never fails: any problem with the model falls back to keywords
    pub fn analyze(&self, prompt: &str) -> MoodWeights {
        if let Some(model) = &self.model {
            match model.complete(prompt) {
                Ok(reply) => match extract_json_object(&reply) {
                    Some(object) => {
                        let weights = weights_from_json(&object);
                        tracing::info!(weights = ?weights, "Mood weights from language model");
                        return weights;
                    }
                    None => {
                        tracing::warn!(reply = %reply, "No JSON object in model reply, using keywords");
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Mood analysis request failed, using keywords");
                }
            }
        }

        let weights = keyword_weights(prompt);
        tracing::info!(weights = ?weights, "Mood weights from keywords");
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_pairs(weights: &MoodWeights) -> Vec<(String, f64)> {
        weights
            .iter()
            .map(|(mood, weight)| (mood.to_string(), weight))
            .collect()
    }

    fn expected(values: [f64; 5]) -> Vec<(String, f64)> {
        KNOWN_MOODS
            .iter()
            .zip(values)
            .map(|(mood, weight)| (mood.to_string(), weight))
            .collect()
    }

    #[test]
    fn test_extracts_object_from_prose() {
        let reply = "Sure! Here is the mix: {\"Happy\": 70, \"Sad\": 10} Enjoy your music.";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["Happy"], json!(70));
        assert_eq!(object["Sad"], json!(10));
    }

    #[test]
    fn test_extracts_object_from_code_fence() {
        let reply = "```json\n{\n  \"Chill\": 80,\n  \"Peace\": 20\n}\n```";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["Chill"], json!(80));
    }

    #[test]
    fn test_skips_unparseable_braces() {
        let reply = "Mood {Happy} -> {\"Happy\": 90}";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["Happy"], json!(90));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let reply = "x {\"note\": \"a } b\", \"Sad\": 40} trailing }";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["Sad"], json!(40));
    }

    #[test]
    fn test_no_object_in_text() {
        assert!(extract_json_object("I think you are happy").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn test_weights_default_and_clamp() {
        let object = json!({
            "happy": "85%",
            "SAD": 150,
            "Party": -5,
            "Chill": "lots",
            "Unrelated": 99
        });

        let weights = weights_from_json(object.as_object().unwrap());
        assert_eq!(as_pairs(&weights), expected([85.0, 100.0, 0.0, 20.0, 20.0]));
    }

    #[test]
    fn test_weights_are_rounded() {
        let object = json!({"Happy": 33.4, "Sad": 66.6, "Party": 0, "Chill": 0, "Peace": 0});
        let weights = weights_from_json(object.as_object().unwrap());
        assert_eq!(as_pairs(&weights), expected([33.0, 67.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_keyword_fallback_splits_by_hits() {
        let weights = keyword_weights("Feeling sad today, I just want to relax.");
        assert_eq!(as_pairs(&weights), expected([0.0, 50.0, 0.0, 50.0, 0.0]));

        let weights = keyword_weights("Let's DANCE at the party!!!");
        assert_eq!(as_pairs(&weights), expected([0.0, 0.0, 100.0, 0.0, 0.0]));
    }

    #[test]
    fn test_keyword_fallback_matches_phrases_and_whole_words() {
        // "sadness" is not "sad", "laid back" is a phrase
        let weights = keyword_weights("no sadness, just laid back");
        assert_eq!(as_pairs(&weights), expected([0.0, 0.0, 0.0, 100.0, 0.0]));
    }

    #[test]
    fn test_keyword_fallback_without_hits_is_even() {
        let weights = keyword_weights("tell me something");
        assert_eq!(as_pairs(&weights), expected([20.0; 5]));
        assert_eq!(as_pairs(&keyword_weights("")), expected([20.0; 5]));
    }

    #[test]
    fn test_analyzer_uses_model_reply() {
        let mut model = MockMoodAnalyzer::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_| Ok("Here: {\"Happy\": 60, \"Party\": 40, \"Sad\": 0, \"Chill\": 0, \"Peace\": 0}".to_string()));
        let analyzer = MoodPromptAnalyzer::new(Some(Arc::new(model)));

        let weights = analyzer.analyze("sunny road trip with friends");
        assert_eq!(as_pairs(&weights), expected([60.0, 0.0, 40.0, 0.0, 0.0]));
    }

    #[test]
    fn test_analyzer_falls_back_when_model_fails() {
        let mut model = MockMoodAnalyzer::new();
        model
            .expect_complete()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let analyzer = MoodPromptAnalyzer::new(Some(Arc::new(model)));

        let weights = analyzer.analyze("quiet evening, time to meditate");
        assert_eq!(as_pairs(&weights), expected([0.0, 0.0, 0.0, 0.0, 100.0]));
    }

    #[test]
    fn test_analyzer_falls_back_when_reply_has_no_json() {
        let mut model = MockMoodAnalyzer::new();
        model
            .expect_complete()
            .returning(|_| Ok("I'm sorry, I can't help with that.".to_string()));
        let analyzer = MoodPromptAnalyzer::new(Some(Arc::new(model)));

        let weights = analyzer.analyze("happy happy happy");
        assert_eq!(as_pairs(&weights), expected([100.0, 0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_keywords_only_analyzer() {
        let analyzer = MoodPromptAnalyzer::keywords_only();
        assert!(!analyzer.uses_model());
        assert_eq!(
            as_pairs(&analyzer.analyze("cozy study session")),
            expected([0.0, 0.0, 0.0, 100.0, 0.0])
        );
    }
}
