use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ResourceSpec;
use crate::database::DocumentPatch;
use crate::error::FieldError;

pub const MAX_NOTE_LENGTH: usize = 2000;

/// Body of `PATCH /api/admin/<resource>/<id>` before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<Value>,
    pub note: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStatusUpdate {
    pub status: String,
    pub note: Option<String>,
}

impl StatusUpdate {
    /// Check the body against the resource's lifecycle. Collects every field
    /// error instead of stopping at the first.
    pub fn validate(&self, spec: &ResourceSpec) -> Result<ValidStatusUpdate, Vec<FieldError>> {
        let mut errors = Vec::new();

        let status = match &self.status {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("status", "This field is required"));
                None
            }
            Some(Value::String(s)) if spec.statuses.contains(&s.as_str()) => Some(s.clone()),
            Some(Value::String(_)) => {
                errors.push(FieldError::new(
                    "status",
                    format!("Must be one of: {}", spec.statuses.join(", ")),
                ));
                None
            }
            Some(_) => {
                errors.push(FieldError::new("status", "Must be a string"));
                None
            }
        };

        let note = match &self.note {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.chars().count() > MAX_NOTE_LENGTH => {
                errors.push(FieldError::new(
                    "note",
                    format!("Must be at most {} characters", MAX_NOTE_LENGTH),
                ));
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Some(_) => {
                errors.push(FieldError::new("note", "Must be a string"));
                None
            }
        };

        match status {
            Some(status) if errors.is_empty() => Ok(ValidStatusUpdate { status, note }),
            _ => Err(errors),
        }
    }
}

impl ValidStatusUpdate {
    /// Patch setting the new status and appending an entry to `statusHistory`.
    pub fn to_patch(&self, actor: &str, at: DateTime<Utc>) -> DocumentPatch {
        let timestamp = at.to_rfc3339();
        let mut set = serde_json::Map::new();
        set.insert("status".into(), Value::String(self.status.clone()));
        set.insert("updatedAt".into(), Value::String(timestamp.clone()));

        DocumentPatch {
            set,
            push: Some((
                "statusHistory".to_string(),
                json!({
                    "status": self.status,
                    "note": self.note,
                    "by": actor,
                    "at": timestamp,
                }),
            )),
        }
    }
}
