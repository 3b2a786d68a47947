//! A fixed-size page window over a list.

use serde::Serialize;

/// The number of rows per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("Page {page} does not exist, there are {total} pages")]
    OutOfRange { page: usize, total: usize },
    #[error("There is nothing to page through")]
    Empty,
}

/// Holds a list and the 1-based index of the page being shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator<T> {
    page_size: usize,
    current: usize,
    items: Vec<T>,
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<T> Paginator<T> {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
            items: Vec::new(),
        }
    }

    /// Replaces the list and goes back to page 1.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.current = 1;
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(len / page_size)`, zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// The items of page `page` (1-based), or `None` when there is no such page.
    pub fn page(&self, page: usize) -> Option<&[T]> {
        if page == 0 || page > self.total_pages() {
            return None;
        }
        let start = self.page_size * (page - 1);
        let end = (self.page_size * page).min(self.items.len());
        Some(&self.items[start..end])
    }

    /// Makes `page` the current page.
    pub fn select(&mut self, page: usize) -> Result<&[T], PageError> {
        let total = self.total_pages();
        if total == 0 {
            return Err(PageError::Empty);
        }
        if page == 0 || page > total {
            return Err(PageError::OutOfRange { page, total });
        }
        self.current = page;
        Ok(self.current_items())
    }

    /// The items of the current page, empty when the list is empty.
    pub fn current_items(&self) -> &[T] {
        self.page(self.current).unwrap_or(&[])
    }

    /// The page after the current one, `None` on the last page.
    pub fn next_page(&self) -> Option<usize> {
        (!self.is_last()).then_some(self.current + 1)
    }

    /// The page before the current one, `None` on the first page.
    pub fn previous_page(&self) -> Option<usize> {
        (!self.is_first()).then_some(self.current - 1)
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current >= self.total_pages()
    }
}
