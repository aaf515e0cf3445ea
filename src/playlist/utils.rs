use std::time::Duration;

/// Helper trait for string formatting
pub trait ToTitleCase {
    fn to_title_case(&self) -> String;
}

impl ToTitleCase for str {
    fn to_title_case(&self) -> String {
        self.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Format a track length as `m:ss`, or "Unknown" when there is none
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(duration) if !duration.is_zero() => {
            let total = duration.as_secs();
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "Unknown".to_string(),
    }
}
