//! Add/edit form submitted for any editable resource.

use std::collections::BTreeMap;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use validator::{ValidateEmail, ValidateUrl};

use crate::domain::resource::{FieldKind, FormField};
use crate::forms::FormError;
use crate::repository::FileUpload;

/// Multipart body of an entity form.
///
/// Plain inputs arrive as parallel `key`/`value` lists; every file input is
/// preceded by an `upload_key` naming the field it belongs to.
#[derive(MultipartForm)]
pub struct EntityMultipartForm {
    #[multipart(rename = "key")]
    pub keys: Vec<Text<String>>,
    #[multipart(rename = "value")]
    pub values: Vec<Text<String>>,
    pub upload_key: Vec<Text<String>>,
    #[multipart(limit = "20MB")]
    pub upload_file: Vec<TempFile>,
}

/// Decoded submission: sanitized values plus the files to forward.
#[derive(Debug, Default)]
pub struct EntitySubmission {
    pub values: BTreeMap<String, String>,
    pub files: Vec<(String, FileUpload)>,
}

impl EntityMultipartForm {
    pub fn into_submission(self, fields: &[FormField]) -> Result<EntitySubmission, FormError> {
        if self.keys.len() != self.values.len() || self.upload_key.len() != self.upload_file.len()
        {
            return Err(FormError::MismatchedFields);
        }

        let mut values = BTreeMap::new();
        for (key, value) in self.keys.into_iter().zip(self.values) {
            let key = key.into_inner();
            let field = find_field(fields, &key)?;
            let value = value.into_inner();
            let value = match field.kind {
                FieldKind::RichText => ammonia::clean(&value),
                _ => value.trim().to_string(),
            };
            values.insert(key, value);
        }

        let mut files = Vec::new();
        for (key, file) in self.upload_key.into_iter().zip(self.upload_file) {
            let key = key.into_inner();
            let field = find_field(fields, &key)?;
            if !field.is_upload() {
                return Err(FormError::UnknownField(key));
            }
            // Empty file inputs are still posted by browsers.
            if file.size == 0 {
                continue;
            }
            let bytes = std::fs::read(file.file.path())?;
            files.push((
                key,
                FileUpload {
                    file_name: file.file_name.unwrap_or_else(|| "upload".to_string()),
                    content_type: file.content_type.map(|mime| mime.to_string()),
                    bytes,
                },
            ));
        }

        Ok(EntitySubmission { values, files })
    }
}

fn find_field<'a>(fields: &'a [FormField], key: &str) -> Result<&'a FormField, FormError> {
    fields
        .iter()
        .find(|field| field.key == key)
        .ok_or_else(|| FormError::UnknownField(key.to_string()))
}

/// Inline message attached to one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub key: String,
    pub message: String,
}

/// Client-side guards run before anything is sent. Upload fields are checked
/// through the draft instead.
pub fn validate_values(fields: &[FormField], values: &BTreeMap<String, String>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in fields.iter().filter(|field| !field.is_upload()) {
        let value = values.get(field.key).map(|v| v.trim()).unwrap_or_default();
        let message = if value.is_empty() {
            field.required.then(|| format!("{} is required.", field.label))
        } else {
            check_kind(field, value)
        };
        if let Some(message) = message {
            errors.push(FieldError {
                key: field.key.to_string(),
                message,
            });
        }
    }
    errors
}

fn check_kind(field: &FormField, value: &str) -> Option<String> {
    let valid = match field.kind {
        FieldKind::Number => value.parse::<f64>().is_ok_and(f64::is_finite),
        FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        FieldKind::DateTime => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok(),
        FieldKind::Email => value.to_string().validate_email(),
        FieldKind::Url => value.to_string().validate_url(),
        FieldKind::Select(choices) => choices.iter().any(|choice| choice.value == value),
        FieldKind::Text | FieldKind::LongText | FieldKind::RichText | FieldKind::Upload { .. } => {
            true
        }
    };
    (!valid).then(|| format!("{} is not valid.", field.label))
}
