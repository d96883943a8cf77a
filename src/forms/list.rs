//! Forms submitted from list pages: search box, page-size selector and the
//! filter drawer.

use serde::Deserialize;
use validator::Validate;

use crate::domain::resource::Resource;
use crate::domain::types::PageSize;
use crate::forms::FormError;
use crate::listing::query::FilterValues;

/// Longest search term or filter value a list accepts.
pub const MAX_QUERY_TEXT: usize = 200;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub search: String,
}

impl SearchForm {
    /// The submitted term, refused when it is longer than [`MAX_QUERY_TEXT`].
    pub fn into_term(self) -> Result<String, FormError> {
        self.validate().map_err(|_| FormError::TooLong {
            field: "Search".to_string(),
            max: MAX_QUERY_TEXT,
        })?;
        Ok(self.search)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageSizeForm {
    pub page_size: usize,
}

impl TryFrom<PageSizeForm> for PageSize {
    type Error = FormError;

    fn try_from(form: PageSizeForm) -> Result<Self, Self::Error> {
        PageSize::try_from(form.page_size).map_err(|_| FormError::InvalidPageSize)
    }
}

/// Body of the confirmation page. Only `confirm=yes` counts.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl ConfirmForm {
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

/// Filter drawer submission. Only keys declared for the resource are kept;
/// a repeated key keeps its last value. Values longer than
/// [`MAX_QUERY_TEXT`] refuse the whole submission.
#[derive(Debug, Default)]
pub struct FilterForm {
    pub values: FilterValues,
}

impl FilterForm {
    pub fn parse(resource: Resource, body: &str) -> Result<Self, FormError> {
        let pairs: Vec<(String, String)> =
            serde_html_form::from_str(body).map_err(|e| FormError::Malformed(e.to_string()))?;
        let declared = resource.filters();
        let mut values = FilterValues::new();
        for (key, value) in pairs {
            let Some(field) = declared.iter().find(|field| field.key == key) else {
                continue;
            };
            if value.chars().count() > MAX_QUERY_TEXT {
                return Err(FormError::TooLong {
                    field: field.label.to_string(),
                    max: MAX_QUERY_TEXT,
                });
            }
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}
