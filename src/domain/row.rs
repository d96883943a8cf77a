//! Row view-models rendered by list and detail tables.

use chrono::NaiveDateTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::resource::Column;

/// Accepts identifiers encoded either as JSON strings or numbers.
pub fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("unexpected id value: {other}"))),
    }
}

/// One backend entity as returned by a list or read endpoint.
///
/// Entities are owned by the backend; the console only reads fields by key.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Identifier of the entity, from `id` or `_id`.
    pub fn id(&self) -> Option<String> {
        ["id", "_id"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Raw value at a dotted path such as `district.name`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.0.get(parts.next()?)?;
        parts.try_fold(first, |value, part| value.get(part))
    }

    /// Display text for a cell.
    pub fn cell(&self, path: &str) -> String {
        self.get(path).map(display_value).unwrap_or_default()
    }

    /// Display text for every column, in column order.
    pub fn cells(&self, columns: &[Column]) -> Vec<String> {
        columns.iter().map(|column| self.cell(column.key)).collect()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("title"))
            .map(display_value)
            .unwrap_or_else(|| value.to_string()),
    }
}

/// Discriminant of [`AttendeeRow`], also used as the tab key on event pages.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeKind {
    #[default]
    Guest,
    Speaker,
    Rsvp,
}

const GUEST_COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("phone", "Phone"),
];

const SPEAKER_COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("title", "Title"),
    Column::new("organization", "Organization"),
];

const RSVP_COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("response", "Response"),
    Column::new("responded_at", "Responded at"),
];

impl AttendeeKind {
    pub const ALL: [AttendeeKind; 3] = [AttendeeKind::Guest, AttendeeKind::Speaker, AttendeeKind::Rsvp];

    pub fn as_str(self) -> &'static str {
        match self {
            AttendeeKind::Guest => "guest",
            AttendeeKind::Speaker => "speaker",
            AttendeeKind::Rsvp => "rsvp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendeeKind::Guest => "Guests",
            AttendeeKind::Speaker => "Speakers",
            AttendeeKind::Rsvp => "RSVPs",
        }
    }

    /// Column set rendered for rows of this kind.
    pub fn columns(self) -> &'static [Column] {
        match self {
            AttendeeKind::Guest => GUEST_COLUMNS,
            AttendeeKind::Speaker => SPEAKER_COLUMNS,
            AttendeeKind::Rsvp => RSVP_COLUMNS,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RsvpResponse {
    Going,
    Maybe,
    NotGoing,
}

impl RsvpResponse {
    fn label(self) -> &'static str {
        match self {
            RsvpResponse::Going => "Going",
            RsvpResponse::Maybe => "Maybe",
            RsvpResponse::NotGoing => "Not going",
        }
    }
}

/// People attached to an event. Guests, speakers and RSVPs share one table
/// whose columns depend on the `kind` discriminant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttendeeRow {
    Guest {
        name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        phone: Option<String>,
    },
    Speaker {
        name: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        organization: Option<String>,
    },
    Rsvp {
        name: String,
        #[serde(default)]
        email: Option<String>,
        response: RsvpResponse,
        #[serde(default)]
        responded_at: Option<NaiveDateTime>,
    },
}

impl AttendeeRow {
    pub fn kind(&self) -> AttendeeKind {
        match self {
            AttendeeRow::Guest { .. } => AttendeeKind::Guest,
            AttendeeRow::Speaker { .. } => AttendeeKind::Speaker,
            AttendeeRow::Rsvp { .. } => AttendeeKind::Rsvp,
        }
    }

    /// Display cells matching [`AttendeeKind::columns`] for this row's kind.
    pub fn cells(&self) -> Vec<String> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        match self {
            AttendeeRow::Guest { name, email, phone } => {
                vec![name.clone(), text(email), text(phone)]
            }
            AttendeeRow::Speaker {
                name,
                title,
                organization,
            } => vec![name.clone(), text(title), text(organization)],
            AttendeeRow::Rsvp {
                name,
                email,
                response,
                responded_at,
            } => vec![
                name.clone(),
                text(email),
                response.label().to_string(),
                responded_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn row_reads_numeric_and_string_ids() {
        assert_eq!(row(json!({"id": 12})).id().as_deref(), Some("12"));
        assert_eq!(row(json!({"_id": "abc"})).id().as_deref(), Some("abc"));
        assert_eq!(row(json!({"name": "x"})).id(), None);
    }

    #[test]
    fn row_cells_follow_dotted_paths() {
        let r = row(json!({
            "name": "Spring Gala",
            "district": {"name": "North"},
            "published": true,
            "tags": ["a", null, "b"],
            "capacity": 120,
            "venue": null
        }));
        assert_eq!(r.cell("district.name"), "North");
        assert_eq!(r.cell("district"), "North");
        assert_eq!(r.cell("published"), "Yes");
        assert_eq!(r.cell("tags"), "a, b");
        assert_eq!(r.cell("capacity"), "120");
        assert_eq!(r.cell("venue"), "");
        assert_eq!(r.cell("missing.path"), "");
    }

    #[test]
    fn attendee_rows_decode_by_discriminant() {
        let rows: Vec<AttendeeRow> = serde_json::from_value(json!([
            {"kind": "guest", "name": "Ann", "email": "ann@example.com"},
            {"kind": "speaker", "name": "Bo", "organization": "Acme"},
            {"kind": "rsvp", "name": "Cy", "response": "not_going",
             "responded_at": "2024-03-01T10:30:00"}
        ]))
        .unwrap();

        assert_eq!(rows[0].kind(), AttendeeKind::Guest);
        assert_eq!(rows[0].cells(), vec!["Ann", "ann@example.com", ""]);
        assert_eq!(rows[1].cells(), vec!["Bo", "", "Acme"]);
        assert_eq!(
            rows[2].cells(),
            vec!["Cy", "", "Not going", "2024-03-01 10:30"]
        );
        for r in &rows {
            assert_eq!(r.cells().len(), r.kind().columns().len());
        }
    }

    #[test]
    fn attendee_kind_round_trips_through_tab_key() {
        for kind in AttendeeKind::ALL {
            assert_eq!(AttendeeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AttendeeKind::parse("host"), None);
    }
}
