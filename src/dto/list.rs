//! Data handed to the list template.

use serde::Serialize;

use crate::domain::resource::{Column, FilterField, Resource, RowAction};
use crate::domain::row::Row;
use crate::domain::types::{EntityId, PageSize};
use crate::listing::actions::InFlightRows;
use crate::listing::pagination::{Paginated, Pager};
use crate::listing::query::FilterValues;
use crate::listing::view::ListView;
use crate::repository::ListResult;

/// Static description of a resource for headers, navigation and forms.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceMeta {
    pub slug: &'static str,
    pub title: &'static str,
    pub singular: &'static str,
    pub columns: &'static [Column],
    pub filters: &'static [FilterField],
    pub editable: bool,
    pub exportable: bool,
    pub has_attendees: bool,
}

impl From<Resource> for ResourceMeta {
    fn from(resource: Resource) -> Self {
        Self {
            slug: resource.slug(),
            title: resource.title(),
            singular: resource.singular(),
            columns: resource.columns(),
            filters: resource.filters(),
            editable: resource.is_editable(),
            exportable: resource.export_endpoint().is_some(),
            has_attendees: resource.has_attendees(),
        }
    }
}

/// Row control; `disabled` while a mutation of the row is in flight.
#[derive(Debug, Clone, Serialize)]
pub struct ActionLink {
    pub action: RowAction,
    pub label: &'static str,
    pub confirm: bool,
    pub disabled: bool,
}

impl ActionLink {
    pub fn for_row(resource: Resource, id: Option<&EntityId>, rows: &InFlightRows) -> Vec<Self> {
        let pending = id.is_some_and(|id| rows.is_pending(resource, id));
        resource
            .actions()
            .iter()
            .map(|&action| ActionLink {
                action,
                label: action.label(),
                confirm: action.requires_confirmation(),
                disabled: id.is_none() || (pending && action.requires_confirmation()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub id: Option<String>,
    pub cells: Vec<String>,
    pub actions: Vec<ActionLink>,
}

impl RowView {
    pub fn new(resource: Resource, row: &Row, rows: &InFlightRows) -> Self {
        let id = row.id().and_then(|id| EntityId::new(id).ok());
        Self {
            cells: row.cells(resource.columns()),
            actions: ActionLink::for_row(resource, id.as_ref(), rows),
            id: id.map(EntityId::into_inner),
        }
    }
}

/// One input of the filter drawer with its draft value.
#[derive(Debug, Clone, Serialize)]
pub struct DrawerFieldView {
    pub field: FilterField,
    pub value: String,
    pub error: Option<String>,
}

/// Filter drawer as the template renders it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawerView {
    pub open: bool,
    pub values: FilterValues,
    pub fields: Vec<DrawerFieldView>,
    pub error: Option<String>,
    pub error_field: Option<String>,
}

impl DrawerView {
    fn new(resource: Resource, view: &ListView) -> Self {
        let drawer = view.drawer();
        let error_field = drawer.error().map(|err| err.field().to_string());
        let fields = resource
            .filters()
            .iter()
            .map(|field| DrawerFieldView {
                field: *field,
                value: drawer.draft().get(field.key).cloned().unwrap_or_default(),
                error: drawer
                    .error()
                    .filter(|_| error_field.as_deref() == Some(field.key))
                    .map(ToString::to_string),
            })
            .collect();
        Self {
            open: drawer.is_open(),
            values: drawer.draft().clone(),
            fields,
            error: drawer.error().map(ToString::to_string),
            error_field,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPageData {
    pub resource: ResourceMeta,
    pub rows: Paginated<RowView>,
    pub search: String,
    pub page_size: usize,
    pub page_sizes: Vec<usize>,
    pub committed_filters: FilterValues,
    pub drawer: DrawerView,
    /// Inline message shown instead of rows when the fetch failed.
    pub error: Option<String>,
}

impl ListPageData {
    pub fn new(
        resource: Resource,
        view: &ListView,
        result: ListResult<Row>,
        error: Option<String>,
        rows: &InFlightRows,
    ) -> Self {
        let query = view.query();
        let pager = Pager::new(query.page(), query.page_size(), result.total_count);
        Self {
            resource: resource.into(),
            rows: Paginated::new(result.items, pager).map(|row| RowView::new(resource, &row, rows)),
            search: query.search().to_string(),
            page_size: query.page_size().get(),
            page_sizes: PageSize::ALL.iter().map(|size| size.get()).collect(),
            committed_filters: query.filters().clone(),
            drawer: DrawerView::new(resource, view),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pending_rows_disable_mutating_controls_only() {
        let rows = InFlightRows::new();
        let id = EntityId::new("e1").unwrap();
        let pending = match crate::listing::actions::dispatch(
            Resource::Events,
            id.clone(),
            RowAction::Delete,
        )
        .unwrap()
        {
            crate::listing::actions::Dispatch::ConfirmationRequired(pending) => pending,
            _ => unreachable!(),
        };
        let _claimed = pending.confirm(&rows).unwrap();

        let links = ActionLink::for_row(Resource::Events, Some(&id), &rows);
        let disabled: Vec<_> = links
            .iter()
            .map(|link| (link.action, link.disabled))
            .collect();
        assert_eq!(
            disabled,
            vec![
                (RowAction::View, false),
                (RowAction::Edit, false),
                (RowAction::Delete, true)
            ]
        );
    }

    #[test]
    fn page_data_carries_range_and_cells() {
        let row: Row = serde_json::from_value(json!({
            "id": 3, "name": "North Campus", "district": {"name": "North"}, "address": "1 Main"
        }))
        .unwrap();
        let data = ListPageData::new(
            Resource::Campuses,
            &ListView::default(),
            ListResult::new(vec![row], 1),
            None,
            &InFlightRows::new(),
        );
        assert_eq!(data.rows.range_label, "1-1 of 1");
        assert_eq!(data.rows.items[0].id.as_deref(), Some("3"));
        assert_eq!(data.rows.items[0].cells, vec!["North Campus", "North", "1 Main"]);
        assert_eq!(data.page_sizes, vec![10, 25, 50]);
    }
}
