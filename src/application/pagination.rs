//! Server-paginated collection snapshots.

use serde::Serialize;

use quire_api_types::PagePayload;

const LEFT_EDGE: u32 = 2;
const LEFT_CURRENT: u32 = 2;
const RIGHT_CURRENT: u32 = 4;
const RIGHT_EDGE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous().then(|| self.current_page - 1)
    }

    /// Page links for a pager: edges and a window around the current page,
    /// with `None` marking an elided gap.
    pub fn page_links(&self) -> Vec<Option<u32>> {
        page_links(
            self.last_page,
            self.current_page.max(1),
            LEFT_EDGE,
            LEFT_CURRENT,
            RIGHT_CURRENT,
            RIGHT_EDGE,
        )
    }
}

/// Read-only snapshot of one server page.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage<E> {
    items: Vec<E>,
    meta: PageMeta,
}

impl<E> CollectionPage<E> {
    pub fn new(items: Vec<E>, meta: PageMeta) -> Self {
        Self { items, meta }
    }

    /// A lone page holding every item, for callers without server pagination.
    pub fn single(items: Vec<E>) -> Self {
        let total = items.len() as u64;
        let per_page = u32::try_from(items.len()).unwrap_or(u32::MAX);
        Self {
            items,
            meta: PageMeta {
                current_page: 1,
                last_page: 1,
                per_page,
                total,
            },
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn meta(&self) -> PageMeta {
        self.meta
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<E> From<PagePayload<E>> for CollectionPage<E> {
    fn from(payload: PagePayload<E>) -> Self {
        Self {
            meta: PageMeta {
                current_page: payload.current_page,
                last_page: payload.last_page,
                per_page: payload.per_page,
                total: payload.total,
            },
            items: payload.data,
        }
    }
}

fn page_links(
    last_page: u32,
    current_page: u32,
    left_edge: u32,
    left_current: u32,
    right_current: u32,
    right_edge: u32,
) -> Vec<Option<u32>> {
    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let past_last = last_page.saturating_add(1);
    let left_end = left_edge.saturating_add(1).min(past_last);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(past_last);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge).saturating_add(1));

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(current_page: u32, last_page: u32) -> PageMeta {
        PageMeta {
            current_page,
            last_page,
            per_page: 15,
            total: u64::from(last_page) * 15,
        }
    }

    #[test]
    fn navigation_respects_bounds() {
        assert_eq!(meta(1, 3).previous_page(), None);
        assert_eq!(meta(1, 3).next_page(), Some(2));
        assert_eq!(meta(3, 3).next_page(), None);
        assert_eq!(meta(3, 3).previous_page(), Some(2));
    }

    #[test]
    fn short_collections_list_every_page() {
        assert_eq!(meta(2, 4).page_links(), vec![Some(1), Some(2), Some(3), Some(4)]);
        assert!(meta(1, 0).page_links().is_empty());
    }

    #[test]
    fn long_collections_elide_gaps() {
        let links = meta(10, 20).page_links();
        assert_eq!(
            links,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn links_saturate_at_the_last_representable_page() {
        let last = u32::MAX;
        assert_eq!(
            meta(last, last).page_links(),
            vec![Some(1), Some(2), None, Some(last - 2), Some(last - 1), Some(last)]
        );
        assert_eq!(meta(1, last).page_links().last(), Some(&Some(last)));
    }

    #[test]
    fn payload_converts_into_snapshot() {
        let payload = PagePayload {
            data: vec![1, 2, 3],
            current_page: 2,
            last_page: 4,
            per_page: 3,
            total: 11,
        };
        let page = CollectionPage::from(payload);
        assert_eq!(page.items(), &[1, 2, 3]);
        assert_eq!(page.meta().current_page, 2);
        assert!(page.meta().has_next());
    }
}
