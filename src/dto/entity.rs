//! Data handed to the detail, form and confirmation templates.

use serde::Serialize;

use crate::domain::resource::{Column, FormField, Resource, RowAction};
use crate::domain::row::{AttendeeKind, Row};
use crate::dto::list::{ActionLink, ResourceMeta};
use crate::forms::entity::FieldError;
use crate::listing::actions::PendingAction;
use crate::listing::draft::{FormDraft, UploadSlot};
use crate::listing::pagination::Paginated;

#[derive(Debug, Clone, Serialize)]
pub struct FieldValue {
    pub label: &'static str,
    pub value: String,
    pub is_link: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabLink {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Attendee table of an event; columns follow the active tab's kind.
#[derive(Debug, Serialize)]
pub struct AttendeeTab {
    pub active: AttendeeKind,
    pub tabs: Vec<TabLink>,
    pub columns: &'static [Column],
    pub rows: Paginated<Vec<String>>,
    pub error: Option<String>,
}

impl AttendeeTab {
    pub fn tabs(active: AttendeeKind) -> Vec<TabLink> {
        AttendeeKind::ALL
            .into_iter()
            .map(|kind| TabLink {
                key: kind.as_str(),
                label: kind.label(),
                active: kind == active,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct DetailPageData {
    pub resource: ResourceMeta,
    pub id: String,
    pub fields: Vec<FieldValue>,
    pub actions: Vec<ActionLink>,
    pub attendees: Option<AttendeeTab>,
}

impl DetailPageData {
    /// Labelled values: form fields for editable resources, table columns otherwise.
    pub fn field_values(resource: Resource, row: &Row) -> Vec<FieldValue> {
        let pairs: Vec<(&'static str, &'static str)> = if resource.is_editable() {
            resource
                .form_fields()
                .iter()
                .map(|field| (field.key, field.label))
                .collect()
        } else {
            resource
                .columns()
                .iter()
                .map(|column| (column.key, column.label))
                .collect()
        };
        pairs
            .into_iter()
            .map(|(key, label)| {
                let value = row.cell(key);
                FieldValue {
                    label,
                    is_link: value.starts_with("http://") || value.starts_with("https://"),
                    value,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormFieldView {
    pub field: FormField,
    pub value: String,
    pub upload: Option<UploadSlot>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormPageData {
    pub resource: ResourceMeta,
    pub id: Option<String>,
    pub fields: Vec<FormFieldView>,
    /// Messages not tied to a single input.
    pub errors: Vec<String>,
}

impl FormPageData {
    pub fn new(
        resource: Resource,
        id: Option<String>,
        draft: &FormDraft,
        field_errors: &[FieldError],
        errors: Vec<String>,
    ) -> Self {
        let fields = resource
            .form_fields()
            .iter()
            .map(|field| FormFieldView {
                field: *field,
                value: draft.value(field.key).unwrap_or_default().to_string(),
                upload: draft.slot(field.key).cloned(),
                error: field_errors
                    .iter()
                    .find(|err| err.key == field.key)
                    .map(|err| err.message.clone()),
            })
            .collect();
        Self {
            resource: resource.into(),
            id,
            fields,
            errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmPageData {
    pub resource: ResourceMeta,
    pub id: String,
    pub action: RowAction,
    pub label: &'static str,
    pub prompt: String,
}

impl From<&PendingAction> for ConfirmPageData {
    fn from(pending: &PendingAction) -> Self {
        Self {
            resource: pending.resource().into(),
            id: pending.id().to_string(),
            action: pending.action(),
            label: pending.action().label(),
            prompt: pending.prompt(),
        }
    }
}
