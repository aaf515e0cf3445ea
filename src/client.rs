use crate::analysis::{KNOWN_MOODS, MoodAnalyzer};
use crate::config::LlmConfig;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use anyhow::Result;
use ureq::Agent;

/// A simple client for an OpenAI-compatible chat completions endpoint
pub struct LlmClient {
    agent: Agent,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Create a new client with configuration from environment
    pub fn new(config: LlmConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .build();

        LlmClient {
            agent,
            api_url: config.api_url,
            api_key: config.api_key,
            model: config.model,
        }
    }

    /// Instruction sent ahead of every user prompt
    fn system_prompt() -> String {
        format!(
            "You translate a listener's description of how they feel into a music mix. \
             Reply with only a JSON object whose keys are exactly {} and whose values are \
             integers from 0 to 100 saying how much of the playlist each mood should fill.",
            KNOWN_MOODS.join(", ")
        )
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.2,
        }
    }
}

impl MoodAnalyzer for LlmClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&request)
            .map_err(|e| anyhow::anyhow!("Mood analysis request failed: {}", e))?;

        let parsed: ChatCompletionResponse = response
            .into_json()
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON response: {}", e))?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(anyhow::anyhow!("No choices returned in completion response")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> LlmClient {
        LlmClient::new(LlmConfig {
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        })
    }

    #[test]
    fn test_request_lists_every_mood() {
        let request = client().build_request("rainy sunday morning");

        assert_eq!(request.model, "test-model");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "rainy sunday morning");
        for mood in KNOWN_MOODS {
            assert!(request.messages[0].content.contains(mood));
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        // Port 9 (discard) is not expected to run an HTTP server
        assert!(client().complete("anything").is_err());
    }
}
