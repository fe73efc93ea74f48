//! Page window computation and paginator click handling.
//!
//! [`compute_window`] decides which page numbers a paginator shows. The first
//! two and last two pages are always visible, together with the current page
//! and its neighbours. A neighbour is dropped when it would duplicate one of
//! the fixed pages; [`window_slots`] marks the gaps between them.

use std::collections::BTreeSet;
use std::fmt::Write;

/// Returns the page numbers to display, ascending and unique.
///
/// Every element lies in `[1, total_pages]` and page `1` is always present.
/// A `total_pages` of 0 is treated as 1.
///
/// # Example
///
/// ```
/// use dashboard_lib::pagination::compute_window;
///
/// assert_eq!(compute_window(5, 10), vec![1, 2, 4, 5, 6, 9, 10]);
/// assert_eq!(compute_window(1, 10), vec![1, 2, 9, 10]);
/// ```
pub fn compute_window(current_page: u32, total_pages: u32) -> Vec<u32> {
    let total = total_pages.max(1);
    let current = current_page;
    let mut pages = BTreeSet::new();

    pages.insert(1);
    if total > 1 {
        pages.insert(2);
    }

    if current > 2 {
        pages.insert(current - 1);
    }
    pages.insert(current);
    if current < total - 1 {
        pages.insert(current + 1);
    }

    if total > 2 {
        pages.insert(total - 1);
    }
    if total > 1 {
        pages.insert(total);
    }

    // Out-of-range current pages can only produce values outside [1, total].
    pages.into_iter().filter(|p| (1..=total).contains(p)).collect()
}

/// One slot of a rendered paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page { number: u32, current: bool },
    Gap,
}

/// Returns the window with a [`PageSlot::Gap`] wherever consecutive page
/// numbers are not adjacent.
pub fn window_slots(current_page: u32, total_pages: u32) -> Vec<PageSlot> {
    let mut slots = Vec::new();
    let mut previous: Option<u32> = None;
    for number in compute_window(current_page, total_pages) {
        if previous.is_some_and(|p| number - p > 1) {
            slots.push(PageSlot::Gap);
        }
        slots.push(PageSlot::Page {
            number,
            current: number == current_page,
        });
        previous = Some(number);
    }
    slots
}

/// Number of pages needed for `total_items`, never less than 1.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Paginator over a `(current_page, total_pages)` pair.
///
/// Page-change requests outside `[1, total_pages]` or for the current page
/// are rejected without invoking the callback.
pub struct Paginator<'a> {
    current_page: u32,
    total_pages: u32,
    on_page_change: Box<dyn FnMut(u32) + 'a>,
}

impl<'a> Paginator<'a> {
    pub fn new(current_page: u32, total_pages: u32, on_page_change: impl FnMut(u32) + 'a) -> Self {
        Self {
            current_page,
            total_pages: total_pages.max(1),
            on_page_change: Box::new(on_page_change),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// The previous button is disabled on the first page.
    pub fn can_previous(&self) -> bool {
        self.current_page != 1
    }

    /// The next button is disabled on the last page.
    pub fn can_next(&self) -> bool {
        self.current_page != self.total_pages
    }

    /// Requests a change to `page`. Returns whether the callback ran.
    pub fn request_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages || page == self.current_page {
            log::debug!(
                "Ignoring page request {} (current {}, total {})",
                page,
                self.current_page,
                self.total_pages
            );
            return false;
        }
        (self.on_page_change)(page);
        true
    }

    pub fn previous(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.request_page(page),
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        match self.current_page.checked_add(1) {
            Some(page) => self.request_page(page),
            None => false,
        }
    }

    pub fn slots(&self) -> Vec<PageSlot> {
        window_slots(self.current_page, self.total_pages)
    }

    /// Renders the paginator as a single line, e.g. `‹ 1 2 … 4 [5] 6 … 9 10 ›`.
    ///
    /// Disabled arrows are rendered as spaces.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push(if self.can_previous() { '‹' } else { ' ' });
        for slot in self.slots() {
            match slot {
                PageSlot::Page { number, current: true } => {
                    let _ = write!(out, " [{}]", number);
                }
                PageSlot::Page { number, .. } => {
                    let _ = write!(out, " {}", number);
                }
                PageSlot::Gap => out.push_str(" …"),
            }
        }
        out.push(' ');
        out.push(if self.can_next() { '›' } else { ' ' });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_scenarios() {
        assert_eq!(compute_window(1, 1), vec![1]);
        assert_eq!(compute_window(2, 3), vec![1, 2, 3]);
        assert_eq!(compute_window(5, 10), vec![1, 2, 4, 5, 6, 9, 10]);
        assert_eq!(compute_window(1, 10), vec![1, 2, 9, 10]);
    }

    #[test]
    fn test_window_first_page_adds_no_extra_neighbour() {
        assert_eq!(compute_window(1, 4), vec![1, 2, 3, 4]);
        assert_eq!(compute_window(1, 5), vec![1, 2, 4, 5]);
        assert_eq!(compute_window(1, 6), vec![1, 2, 5, 6]);
        assert_eq!(compute_window(1, 7), vec![1, 2, 6, 7]);
        assert_eq!(compute_window(1, 8), vec![1, 2, 7, 8]);
        assert_eq!(compute_window(2, 8), vec![1, 2, 3, 7, 8]);
    }

    #[test]
    fn test_window_single_page_ignores_current() {
        assert_eq!(compute_window(1, 1), vec![1]);
        assert_eq!(compute_window(3, 1), vec![1]);
    }

    #[test]
    fn test_window_last_page() {
        assert_eq!(compute_window(10, 10), vec![1, 2, 9, 10]);
        assert_eq!(compute_window(9, 10), vec![1, 2, 8, 9, 10]);
    }

    #[test]
    fn test_window_invariants() {
        for total in 1..=40u32 {
            for current in 1..=total {
                let window = compute_window(current, total);
                assert!(window.windows(2).all(|w| w[0] < w[1]), "{current}/{total}");
                assert!(window.iter().all(|p| (1..=total).contains(p)));
                assert!(window.contains(&1));
                assert!(window.contains(&current));
                if total > 1 {
                    assert!(window.contains(&total));
                }
            }
        }
    }

    #[test]
    fn test_window_out_of_range_is_deterministic() {
        assert_eq!(compute_window(0, 5), vec![1, 2, 4, 5]);
        assert_eq!(compute_window(12, 5), vec![1, 2, 4, 5]);
        assert_eq!(compute_window(12, 5), compute_window(12, 5));
        assert_eq!(compute_window(1, 0), vec![1]);
    }

    #[test]
    fn test_slots_insert_gaps() {
        let slots = window_slots(5, 10);
        let rendered: Vec<String> = slots
            .iter()
            .map(|s| match s {
                PageSlot::Page { number, current } if *current => format!("[{}]", number),
                PageSlot::Page { number, .. } => number.to_string(),
                PageSlot::Gap => "…".to_string(),
            })
            .collect();
        assert_eq!(rendered, vec!["1", "2", "…", "4", "[5]", "6", "…", "9", "10"]);

        assert!(!window_slots(2, 3).contains(&PageSlot::Gap));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(5, 0), 1);
    }

    #[test]
    fn test_paginator_rejects_invalid_requests() {
        let mut requested = Vec::new();
        {
            let mut paginator = Paginator::new(1, 3, |p| requested.push(p));
            assert!(!paginator.can_previous());
            assert!(paginator.can_next());
            assert!(!paginator.previous());
            assert!(!paginator.request_page(1));
            assert!(!paginator.request_page(0));
            assert!(!paginator.request_page(4));
            assert!(paginator.request_page(3));
            assert!(paginator.next());
        }
        assert_eq!(requested, vec![3, 2]);
    }

    #[test]
    fn test_paginator_last_page() {
        let mut calls = 0;
        {
            let mut paginator = Paginator::new(4, 4, |_| calls += 1);
            assert!(!paginator.can_next());
            assert!(!paginator.next());
            assert!(paginator.previous());
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_paginator_render_text() {
        let paginator = Paginator::new(5, 10, |_| {});
        assert_eq!(paginator.render_text(), "‹ 1 2 … 4 [5] 6 … 9 10 ›");

        let single = Paginator::new(1, 1, |_| {});
        assert_eq!(single.render_text(), "  [1]  ");
    }
}
