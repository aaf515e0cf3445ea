use serde::{Deserialize, Serialize};

/// A playable track as returned to the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration: String, // "m:ss" or "Unknown"
    pub cover_art: Option<String>, // data: URL of the embedded picture
    pub file_path: String, // public URL under /songs/
    pub mood: String,
}

impl Track {
    /// Duration in whole seconds, when known
    pub fn duration_seconds(&self) -> Option<u32> {
        let (minutes, seconds) = self.duration.split_once(':')?;
        let minutes: u32 = minutes.parse().ok()?;
        let seconds: u32 = seconds.parse().ok()?;
        Some(minutes * 60 + seconds)
    }
}

impl Default for Track {
    fn default() -> Self {
        Track {
            id: String::new(),
            title: "Unknown".to_string(),
            artist: "Unknown Artist".to_string(),
            duration: "Unknown".to_string(),
            cover_art: None,
            file_path: String::new(),
            mood: String::new(),
        }
    }
}

/// Body of POST /api/analyze-mood-prompt
#[derive(Debug, Deserialize)]
pub struct AnalyzePromptRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Query of GET /api/generate-playlist
#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub mood: Option<String>,
}

/// Request body for an OpenAI-compatible chat completion
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Response structure for a chat completion call
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Body of GET /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_serializes_camel_case() {
        let track = Track {
            id: "abc".to_string(),
            title: "Sunny".to_string(),
            artist: "Bobby Hebb".to_string(),
            duration: "2:45".to_string(),
            cover_art: None,
            file_path: "http://localhost:5000/songs/happy/sunny.mp3".to_string(),
            mood: "Happy".to_string(),
        };

        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["filePath"], "http://localhost:5000/songs/happy/sunny.mp3");
        assert!(value["coverArt"].is_null());
        assert_eq!(value["duration"], "2:45");
    }

    #[test]
    fn test_duration_seconds() {
        let mut track = Track {
            duration: "3:07".to_string(),
            ..Default::default()
        };
        assert_eq!(track.duration_seconds(), Some(187));

        track.duration = "Unknown".to_string();
        assert_eq!(track.duration_seconds(), None);
    }

    #[test]
    fn test_chat_response_parses_first_choice() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"Happy\": 80}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, r#"{"Happy": 80}"#);
    }
}
