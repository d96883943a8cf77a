//! Filter drawer: a draft copy of filter values committed only on Apply.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::resource::DateRangeRule;
use crate::listing::query::{FilterValues, ListQueryState, normalize_filters};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cross-field problems that block Apply.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FilterError {
    #[error("\"{end}\" requires \"{start}\"")]
    EndWithoutStart { start: String, end: String },
    #[error("\"{start}\" requires \"{end}\"")]
    StartWithoutEnd { start: String, end: String },
    #[error("\"{end}\" must not be before \"{start}\"")]
    EndBeforeStart { start: String, end: String },
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),
}

impl FilterError {
    /// Filter key the message should be shown next to.
    pub fn field(&self) -> &str {
        match self {
            FilterError::EndWithoutStart { start, .. } => start,
            FilterError::StartWithoutEnd { end, .. } => end,
            FilterError::EndBeforeStart { end, .. } => end,
            FilterError::InvalidDate(key) => key,
        }
    }
}

fn parse_date(values: &FilterValues, key: &str) -> Result<Option<NaiveDate>, FilterError> {
    values
        .get(key)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| FilterError::InvalidDate(key.to_string()))
        })
        .transpose()
}

/// Validates every date-range rule against `values`.
pub fn validate_ranges(values: &FilterValues, rules: &[DateRangeRule]) -> Result<(), FilterError> {
    for rule in rules {
        let start = parse_date(values, rule.start)?;
        let end = parse_date(values, rule.end)?;
        let names = || (rule.start.to_string(), rule.end.to_string());
        match (start, end) {
            (None, Some(_)) => {
                let (start, end) = names();
                return Err(FilterError::EndWithoutStart { start, end });
            }
            (Some(_), None) => {
                let (start, end) = names();
                return Err(FilterError::StartWithoutEnd { start, end });
            }
            (Some(from), Some(to)) if to < from => {
                let (start, end) = names();
                return Err(FilterError::EndBeforeStart { start, end });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Transient side panel state. The draft never influences the list until
/// [`FilterDrawer::apply`] or [`FilterDrawer::reset`] commits it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterDrawer {
    open: bool,
    draft: FilterValues,
    error: Option<FilterError>,
}

impl FilterDrawer {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &FilterValues {
        &self.draft
    }

    pub fn error(&self) -> Option<&FilterError> {
        self.error.as_ref()
    }

    /// Opens the drawer showing the filters currently in effect.
    pub fn open(&mut self, committed: &FilterValues) {
        self.open = true;
        self.draft = committed.clone();
        self.error = None;
    }

    /// Edits one draft value; an empty value clears it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.draft.remove(&key);
        } else {
            self.draft.insert(key, value);
        }
    }

    /// Replaces the whole draft, e.g. with a submitted drawer form.
    pub fn replace_draft(&mut self, draft: FilterValues) {
        self.draft = draft;
    }

    /// Commits the draft when it passes validation, closes the drawer and
    /// returns whether the list descriptor changed. On error the drawer stays
    /// open with the draft untouched.
    pub fn apply(
        &mut self,
        rules: &[DateRangeRule],
        query: &mut ListQueryState,
    ) -> Result<bool, FilterError> {
        let draft = normalize_filters(self.draft.clone());
        if let Err(err) = validate_ranges(&draft, rules) {
            self.open = true;
            self.error = Some(err.clone());
            return Err(err);
        }
        let changed = query.commit_filters(draft);
        self.close();
        Ok(changed)
    }

    /// Clears the draft and commits the empty filter set immediately.
    pub fn reset(&mut self, query: &mut ListQueryState) -> bool {
        self.draft.clear();
        self.error = None;
        query.commit_filters(FilterValues::new())
    }

    /// Closes without applying; the draft is discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.draft.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[DateRangeRule] = &[DateRangeRule {
        start: "start_date",
        end: "end_date",
    }];

    fn committed(state: &ListQueryState) -> FilterValues {
        state.filters().clone()
    }

    #[test]
    fn editing_draft_leaves_committed_filters_untouched() {
        let mut query = ListQueryState::default();
        let before = query.descriptor();
        let mut drawer = FilterDrawer::default();

        drawer.open(&committed(&query));
        drawer.set("status", "published");
        drawer.set("category", "social");

        assert_eq!(query.descriptor(), before);
        assert_eq!(drawer.draft().len(), 2);
    }

    #[test]
    fn reopening_shows_previously_applied_values() {
        let mut query = ListQueryState::default();
        let mut drawer = FilterDrawer::default();

        drawer.open(&committed(&query));
        drawer.set("status", "published");
        assert_eq!(drawer.apply(RULES, &mut query), Ok(true));
        assert!(!drawer.is_open());

        drawer.open(&committed(&query));
        assert_eq!(
            drawer.draft().get("status").map(String::as_str),
            Some("published")
        );
    }

    #[test]
    fn closing_without_apply_discards_draft() {
        let mut query = ListQueryState::default();
        let mut drawer = FilterDrawer::default();
        drawer.open(&committed(&query));
        drawer.set("status", "draft");
        assert!(drawer.apply(RULES, &mut query).unwrap());

        drawer.open(&committed(&query));
        drawer.set("status", "cancelled");
        drawer.close();

        assert_eq!(
            query.filters().get("status").map(String::as_str),
            Some("draft")
        );
        drawer.open(&committed(&query));
        assert_eq!(
            drawer.draft().get("status").map(String::as_str),
            Some("draft")
        );
    }

    #[test]
    fn reset_commits_empty_filters_and_first_page() {
        let mut query = ListQueryState::default();
        let mut drawer = FilterDrawer::default();
        drawer.open(&committed(&query));
        drawer.set("status", "draft");
        drawer.apply(RULES, &mut query).unwrap();
        query.go_to_page(2, 4).unwrap();

        drawer.open(&committed(&query));
        assert!(drawer.reset(&mut query));
        assert!(drawer.draft().is_empty());
        assert!(query.filters().is_empty());
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn end_date_without_start_blocks_apply() {
        let mut query = ListQueryState::default();
        let before = query.descriptor();
        let mut drawer = FilterDrawer::default();
        drawer.open(&committed(&query));
        drawer.set("status", "published");
        drawer.set("end_date", "2024-05-01");

        let err = drawer.apply(RULES, &mut query).unwrap_err();
        assert_eq!(
            err,
            FilterError::EndWithoutStart {
                start: "start_date".into(),
                end: "end_date".into()
            }
        );
        assert_eq!(err.field(), "start_date");
        assert!(drawer.is_open());
        assert_eq!(drawer.error(), Some(&err));
        assert_eq!(drawer.draft().len(), 2);
        assert_eq!(query.descriptor(), before);
    }

    #[test]
    fn range_validation_cases() {
        let values = |pairs: &[(&str, &str)]| -> FilterValues {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        assert!(validate_ranges(&values(&[]), RULES).is_ok());
        assert!(
            validate_ranges(
                &values(&[("start_date", "2024-01-01"), ("end_date", "2024-01-01")]),
                RULES
            )
            .is_ok()
        );
        assert!(matches!(
            validate_ranges(&values(&[("start_date", "2024-01-01")]), RULES),
            Err(FilterError::StartWithoutEnd { .. })
        ));
        assert!(matches!(
            validate_ranges(
                &values(&[("start_date", "2024-02-01"), ("end_date", "2024-01-01")]),
                RULES
            ),
            Err(FilterError::EndBeforeStart { .. })
        ));
        assert_eq!(
            validate_ranges(
                &values(&[("start_date", "01/02/2024"), ("end_date", "2024-01-01")]),
                RULES
            ),
            Err(FilterError::InvalidDate("start_date".into()))
        );
    }
}
