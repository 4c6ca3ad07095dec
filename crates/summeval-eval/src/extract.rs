use serde::{Deserialize, Serialize};

use crate::record::{ConversationRecord, RecordEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A single user or assistant turn of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

/// The conversation fields a grading prompt needs, normalized from a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedConversation {
    system_prompt: String,
    turns: Vec<Turn>,
    latest_user_message: String,
}

impl ExtractedConversation {
    pub fn from_record(record: &ConversationRecord) -> Self {
        Self::from_entries(record.entries())
    }

    pub fn from_entries(entries: &[RecordEntry]) -> Self {
        let system_prompt = entries
            .iter()
            .find_map(RecordEntry::as_system)
            .unwrap_or_default()
            .to_string();

        let turns: Vec<Turn> = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .as_human()
                    .map(|text| (TurnRole::User, text))
                    .or_else(|| entry.as_ai().map(|text| (TurnRole::Assistant, text)))
            })
            .map(|(role, text)| Turn {
                role,
                content: text.to_string(),
            })
            .collect();

        // Last turn of either role, not the last user-authored turn.
        let latest_user_message = turns
            .last()
            .map(|turn| turn.content.clone())
            .unwrap_or_default();

        Self {
            system_prompt,
            turns,
            latest_user_message,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn latest_user_message(&self) -> &str {
        &self.latest_user_message
    }
}

/// Free-function form of [`ExtractedConversation::from_record`].
pub fn extract_conversation(record: &ConversationRecord) -> ExtractedConversation {
    ExtractedConversation::from_record(record)
}
