use serde::Serialize;

/// Events per page on list views.
pub const EVENTS_PAGE_SIZE: usize = 3;
/// Discussions per page on the dashboard.
pub const DASHBOARD_DISCUSSIONS_PAGE_SIZE: usize = 5;
/// Discussions per page on the general discussion list.
pub const DISCUSSIONS_PAGE_SIZE: usize = 10;

/// One page of an in-memory collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number as requested, even when it is out of range.
    pub page: usize,
    pub page_size: usize,
    /// Never less than 1, so a page counter never reads "0 pages".
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Slice `items` into page `page` of `page_size` items.
///
/// Page numbers outside `1..=total_pages` give an empty page instead of an error.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = if page_size == 0 {
        1
    } else {
        total_items.div_ceil(page_size).max(1)
    };

    let items = if page == 0 || page_size == 0 {
        Vec::new()
    } else {
        let start = (page - 1).saturating_mul(page_size);
        items.into_iter().skip(start).take(page_size).collect()
    };

    Page {
        items,
        page,
        page_size,
        total_pages,
        total_items,
        has_previous: page > 1,
        has_next: page < total_pages,
    }
}
