//! Default file names for saved conversations

use crate::types::ConversationLog;
use chrono::{Local, NaiveDateTime};

/// Directory conversations are saved to when none is given
pub const DEFAULT_DIR: &str = "chat_history";

const PREFIX_CHARS: usize = 10;
const UNTITLED: &str = "untitled_chat";

/// File stem derived from the first user text and a timestamp
///
/// `"What is Rust?"` at 2024-05-01 09:30:00 gives `What is Ru_20240501_093000`.
pub fn default_stem(log: &ConversationLog, now: NaiveDateTime) -> String {
    let prefix: String = log
        .first_user_text()
        .map(|text| {
            text.trim()
                .chars()
                .take(PREFIX_CHARS)
                .map(|c| match c {
                    '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
                    c if c.is_control() => '_',
                    c => c,
                })
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    format!("{}_{}", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// [`default_stem`] at the current local time
pub fn default_stem_now(log: &ConversationLog) -> String {
    default_stem(log, Local::now().naive_local())
}
