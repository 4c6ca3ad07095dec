//! Typed access to the loosely-typed records supplied by the evaluation harness.
//!
//! An example row looks like:
//!
//! ```json
//! {
//!   "inputs":  { "input": [ { "type": "system", "data": { "content": "..." } },
//!                           { "type": "human",  "data": { "content": "..." } } ] },
//!   "outputs": { "output": { "data": { "content": "..." } } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use summeval_core::SummevalError;
use thiserror::Error;

/// The record did not have the shape the accessor expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at `{path}`: {reason}")]
pub struct MalformedRecordError {
    pub path: String,
    pub reason: String,
}

impl MalformedRecordError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<MalformedRecordError> for SummevalError {
    fn from(err: MalformedRecordError) -> Self {
        SummevalError::MalformedRecord(err.to_string())
    }
}

/// Role discriminator of a conversation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    System,
    Human,
    Ai,
    /// Any other tag (tool, function, ...). Kept so ordering is preserved, ignored by extraction.
    Other(String),
}

impl EntryKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "system" => EntryKind::System,
            "human" | "user" => EntryKind::Human,
            "ai" | "assistant" => EntryKind::Ai,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

/// One message entry of a conversation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    kind: EntryKind,
    content: String,
}

impl RecordEntry {
    pub fn new(kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(EntryKind::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Ai, content)
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn as_system(&self) -> Option<&str> {
        matches!(self.kind, EntryKind::System).then_some(self.content.as_str())
    }

    pub fn as_human(&self) -> Option<&str> {
        matches!(self.kind, EntryKind::Human).then_some(self.content.as_str())
    }

    pub fn as_ai(&self) -> Option<&str> {
        matches!(self.kind, EntryKind::Ai).then_some(self.content.as_str())
    }

    /// Parse `{"type": <tag>, "data": {"content": <text>}}`. Entries with an
    /// unrecognized tag may omit `data`.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, MalformedRecordError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| MalformedRecordError::new(format!("{path}.type"), "expected a string tag"))?;
        let kind = EntryKind::from_tag(tag);

        let content = match value.get("data").and_then(|d| d.get("content")) {
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                return Err(MalformedRecordError::new(
                    format!("{path}.data.content"),
                    "expected a string",
                ))
            }
            None if matches!(kind, EntryKind::Other(_)) => String::new(),
            None => {
                return Err(MalformedRecordError::new(
                    format!("{path}.data.content"),
                    "missing",
                ))
            }
        };

        Ok(Self { kind, content })
    }
}

/// Ordered sequence of tagged entries making up the conversation under test.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationRecord {
    entries: Vec<RecordEntry>,
}

impl ConversationRecord {
    pub fn new(entries: Vec<RecordEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn from_value(value: &Value, path: &str) -> Result<Self, MalformedRecordError> {
        let items = value
            .as_array()
            .ok_or_else(|| MalformedRecordError::new(path, "expected an array of messages"))?;
        let entries = items
            .iter()
            .enumerate()
            .map(|(i, item)| RecordEntry::from_value(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

/// One dataset example as handed over by the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub inputs: Value,
    pub outputs: Value,
}

impl ExampleRecord {
    pub fn new(inputs: Value, outputs: Value) -> Self {
        Self {
            id: None,
            inputs,
            outputs,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// `inputs.input` as a typed conversation.
    pub fn conversation(&self) -> Result<ConversationRecord, MalformedRecordError> {
        let input = self
            .inputs
            .get("input")
            .ok_or_else(|| MalformedRecordError::new("inputs.input", "missing"))?;
        ConversationRecord::from_value(input, "inputs.input")
    }

    /// `outputs.output.data.content`: the candidate reply being graded.
    pub fn model_output(&self) -> Result<String, MalformedRecordError> {
        let output = self
            .outputs
            .get("output")
            .ok_or_else(|| MalformedRecordError::new("outputs.output", "missing"))?;
        match output.get("data").and_then(|d| d.get("content")) {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(MalformedRecordError::new(
                "outputs.output.data.content",
                "expected a string",
            )),
            None => Err(MalformedRecordError::new(
                "outputs.output.data.content",
                "missing",
            )),
        }
    }
}
