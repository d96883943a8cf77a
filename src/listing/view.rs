//! Per-resource list state kept between requests.

use crate::domain::resource::Resource;
use crate::domain::types::PageSize;
use crate::listing::filters::{FilterDrawer, FilterError};
use crate::listing::pagination::Pager;
use crate::listing::query::{FilterValues, ListQueryState, PageOutOfRange, QueryDescriptor};

/// Query state plus the filter drawer of one list page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListView {
    query: ListQueryState,
    drawer: FilterDrawer,
    /// Total reported by the last successful fetch.
    last_total: Option<usize>,
}

impl ListView {
    pub fn descriptor(&self) -> QueryDescriptor {
        self.query.descriptor()
    }

    pub fn query(&self) -> &ListQueryState {
        &self.query
    }

    pub fn drawer(&self) -> &FilterDrawer {
        &self.drawer
    }

    pub fn last_total(&self) -> Option<usize> {
        self.last_total
    }

    pub fn search(&mut self, term: &str) -> bool {
        self.query.set_search(term)
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        self.query.set_page_size(page_size)
    }

    /// Moves to `page` within the bounds of the last fetched total.
    pub fn go_to_page(&mut self, page: usize) -> Result<bool, PageOutOfRange> {
        let total = self.last_total.unwrap_or(0);
        let pager = Pager::new(self.query.page(), self.query.page_size(), total);
        self.query.go_to_page(page, pager.total_pages())
    }

    pub fn open_drawer(&mut self) {
        let committed = self.query.filters().clone();
        self.drawer.open(&committed);
    }

    pub fn close_drawer(&mut self) {
        self.drawer.close();
    }

    /// Submitted drawer values become the draft, then Apply runs.
    pub fn apply_filters(
        &mut self,
        resource: Resource,
        draft: FilterValues,
    ) -> Result<bool, FilterError> {
        self.drawer.replace_draft(draft);
        self.drawer.apply(resource.date_ranges(), &mut self.query)
    }

    pub fn reset_filters(&mut self) -> bool {
        self.drawer.reset(&mut self.query)
    }

    /// Records a fresh total and pulls the page back in range when the result
    /// shrank. Returns `true` when the page moved and a refetch is needed.
    pub fn reconcile(&mut self, total_count: usize) -> bool {
        self.last_total = Some(total_count);
        let pager = Pager::new(self.query.page(), self.query.page_size(), total_count);
        pager.is_out_of_range() && self.query.clamp_to(pager.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(pairs: &[(&str, &str)]) -> FilterValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn deleting_last_row_on_last_page_steps_back() {
        let mut view = ListView::default();
        view.reconcile(21);
        assert_eq!(view.go_to_page(3), Ok(true));

        assert!(view.reconcile(20));
        assert_eq!(view.descriptor().page, 2);
        assert!(!view.reconcile(20));
    }

    #[test]
    fn page_navigation_uses_last_total() {
        let mut view = ListView::default();
        assert!(view.go_to_page(2).is_err());
        view.reconcile(25);
        assert_eq!(view.go_to_page(3), Ok(true));
        assert!(view.go_to_page(4).is_err());
        assert_eq!(view.descriptor().page, 3);
    }

    #[test]
    fn drawer_interaction_keeps_descriptor_until_apply() {
        let mut view = ListView::default();
        let before = view.descriptor();
        view.open_drawer();
        assert_eq!(view.descriptor(), before);

        let changed = view
            .apply_filters(Resource::Events, filters(&[("status", "published")]))
            .unwrap();
        assert!(changed);
        assert!(!view.drawer().is_open());
        assert_eq!(
            view.descriptor().filters.get("status").map(String::as_str),
            Some("published")
        );
    }

    #[test]
    fn invalid_range_keeps_drawer_open() {
        let mut view = ListView::default();
        view.open_drawer();
        let err = view
            .apply_filters(Resource::Events, filters(&[("end_date", "2024-01-01")]))
            .unwrap_err();
        assert!(matches!(err, FilterError::EndWithoutStart { .. }));
        assert!(view.drawer().is_open());
        assert!(view.descriptor().filters.is_empty());
    }
}
