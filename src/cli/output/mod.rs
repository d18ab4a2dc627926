//! CLI output formatting module
//!
//! Every command result implements [`CommandOutput`] and is rendered either
//! for humans or as JSON depending on the global `--json` flag.

pub mod progress;
pub mod table;

pub use progress::create_progress_bar;
pub use table::TableFormatter;

use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if
/// truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("naan", 10), "naan");
        assert_eq!(truncate("naan veetukku poren", 10), "naan ve...");
        // Tamil text is multi-byte; slicing by bytes would panic here
        assert_eq!(truncate("நான் வீட்டுக்கு", 6), "நான...");
    }
}
