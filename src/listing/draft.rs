//! Add/edit form draft with one upload slot per file field.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::domain::resource::{FieldKind, FormField};
use crate::domain::row::Row;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("\"{0}\" is still uploading")]
    UploadPending(String),
    #[error("\"{0}\" requires a file")]
    MissingUpload(String),
    #[error("\"{0}\" is not an upload field")]
    UnknownUpload(String),
}

/// Upload status of one file field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadSlot {
    pub uploading: bool,
    pub url: Option<String>,
    pub required: bool,
}

impl UploadSlot {
    fn blocks_submit(&self) -> bool {
        self.uploading || (self.required && self.url.is_none())
    }
}

/// Mutable copy of one entity's editable fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    values: BTreeMap<String, String>,
    uploads: BTreeMap<String, UploadSlot>,
}

impl FormDraft {
    /// Empty draft for an add form.
    pub fn new(fields: &[FormField]) -> Self {
        let uploads = fields
            .iter()
            .filter(|field| field.is_upload())
            .map(|field| {
                (
                    field.key.to_string(),
                    UploadSlot {
                        required: field.required,
                        ..UploadSlot::default()
                    },
                )
            })
            .collect();
        Self {
            values: BTreeMap::new(),
            uploads,
        }
    }

    /// Draft pre-populated from a fetched entity for an edit form.
    pub fn from_entity(fields: &[FormField], row: &Row) -> Self {
        let mut draft = Self::new(fields);
        for field in fields {
            let Some(value) = row.get(field.key).and_then(|v| form_value(field.kind, v)) else {
                continue;
            };
            match draft.uploads.get_mut(field.key) {
                Some(slot) => slot.url = Some(value),
                None => {
                    draft.values.insert(field.key.to_string(), value);
                }
            }
        }
        draft
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn slot(&self, key: &str) -> Option<&UploadSlot> {
        self.uploads.get(key)
    }

    pub fn begin_upload(&mut self, key: &str) -> Result<(), DraftError> {
        let slot = self.slot_mut(key)?;
        if slot.uploading {
            return Err(DraftError::UploadPending(key.to_string()));
        }
        slot.uploading = true;
        Ok(())
    }

    pub fn complete_upload(&mut self, key: &str, url: impl Into<String>) -> Result<(), DraftError> {
        let slot = self.slot_mut(key)?;
        slot.uploading = false;
        slot.url = Some(url.into());
        Ok(())
    }

    /// Clears the flag without touching the URL, so the field can be retried.
    pub fn fail_upload(&mut self, key: &str) -> Result<(), DraftError> {
        self.slot_mut(key)?.uploading = false;
        Ok(())
    }

    /// Submit is blocked while any upload is pending or a required upload has
    /// no URL yet.
    pub fn can_submit(&self) -> Result<(), DraftError> {
        for (key, slot) in &self.uploads {
            if slot.uploading {
                return Err(DraftError::UploadPending(key.clone()));
            }
        }
        match self.uploads.iter().find(|(_, slot)| slot.blocks_submit()) {
            Some((key, _)) => Err(DraftError::MissingUpload(key.clone())),
            None => Ok(()),
        }
    }

    /// JSON body for the backend. Blank values are left out.
    pub fn to_payload(&self, fields: &[FormField]) -> Map<String, Value> {
        let mut payload = Map::new();
        for field in fields {
            let raw = match self.uploads.get(field.key) {
                Some(slot) => slot.url.as_deref(),
                None => self.value(field.key),
            };
            let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
                continue;
            };
            payload.insert(field.key.to_string(), payload_value(field.kind, raw));
        }
        payload
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut UploadSlot, DraftError> {
        self.uploads
            .get_mut(key)
            .ok_or_else(|| DraftError::UnknownUpload(key.to_string()))
    }
}

fn form_value(kind: FieldKind, value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("_id"))
            .and_then(|id| form_value(FieldKind::Text, id))?,
        Value::Array(_) => return None,
    };
    // Inputs of type date / datetime-local need the truncated ISO form.
    let width = match kind {
        FieldKind::Date => 10,
        FieldKind::DateTime => 16,
        _ => return Some(text),
    };
    Some(text.chars().take(width).collect())
}

fn payload_value(kind: FieldKind, raw: &str) -> Value {
    if kind == FieldKind::Number {
        if let Ok(int) = raw.parse::<i64>() {
            return Value::Number(int.into());
        }
        if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}
