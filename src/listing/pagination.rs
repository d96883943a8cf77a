//! Pagination controller and page-number window shown under list tables.

use serde::Serialize;

use crate::domain::types::PageSize;

/// Pages listed on each side of the current one in [`Pager::window`].
const NEIGHBOURS: usize = 2;

/// Derives page counts and navigation bounds from a server-reported total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: PageSize,
    total_count: usize,
}

impl Pager {
    pub fn new(page: usize, page_size: PageSize, total_count: usize) -> Self {
        Self {
            page: page.max(1),
            page_size,
            total_count,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size.get())
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether the current page lies past the last page for this total.
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.total_pages().max(1)
    }

    /// First and last displayed row numbers, `(0, 0)` when nothing is shown.
    pub fn row_range(&self) -> (usize, usize) {
        let size = self.page_size.get();
        let first = (self.page - 1) * size + 1;
        if self.total_count == 0 || first > self.total_count {
            return (0, 0);
        }
        (first, (self.page * size).min(self.total_count))
    }

    /// Range caption such as `21-25 of 25`.
    pub fn range_label(&self) -> String {
        let (first, last) = self.row_range();
        format!("{first}-{last} of {}", self.total_count)
    }

    /// Page links under the table: the first and last page plus the
    /// current page's neighbours. `None` stands for an elided run; a run of a
    /// single page is listed instead.
    pub fn window(&self) -> Vec<Option<usize>> {
        let last = self.total_pages();
        if last == 0 {
            return Vec::new();
        }
        let current = self.page.min(last);
        let low = current.saturating_sub(NEIGHBOURS).max(1);
        let high = (current + NEIGHBOURS).min(last);

        let mut shown = vec![1];
        shown.extend(low..=high);
        shown.push(last);
        shown.dedup();

        let mut window = Vec::with_capacity(shown.len() + 2);
        let mut previous = 0;
        for page in shown {
            match page - previous {
                1 => {}
                2 => window.push(Some(previous + 1)),
                _ => window.push(None),
            }
            window.push(Some(page));
            previous = page;
        }
        window
    }
}

/// One page of items together with everything the pager template needs.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub range_label: String,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pager: Pager) -> Self {
        Self {
            items,
            pages: pager.window(),
            page: pager.page(),
            page_size: pager.page_size.get(),
            total_pages: pager.total_pages(),
            total_count: pager.total_count(),
            range_label: pager.range_label(),
            prev_page: pager.can_go_prev().then(|| pager.page() - 1),
            next_page: pager.can_go_next().then(|| pager.page() + 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pages: self.pages,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_count: self.total_count,
            range_label: self.range_label,
            prev_page: self.prev_page,
            next_page: self.next_page,
        }
    }
}
