pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current-page cursor over a list whose length can change underneath it.
/// `current_page` is 1-based and always within `1..=max(total_pages, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    total_items: usize,
    current_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Paginator {
    pub fn new(page_size: usize, total_items: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            total_items,
            current_page: 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    fn last_page(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Clamps into the valid range; zero and negatives land on page 1.
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.last_page() as i64;
        self.current_page = page.clamp(1, last) as usize;
    }

    pub fn next(&mut self) {
        if self.current_page < self.last_page() {
            self.current_page += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Free-form page entry. Anything that is not a page number in range is ignored and
    /// the current page stays put. Returns whether the page was accepted.
    pub fn jump(&mut self, input: &str) -> bool {
        match input.trim().parse::<usize>() {
            Ok(page) if page >= 1 && page <= self.total_pages() => {
                self.current_page = page;
                true
            }
            _ => false,
        }
    }

    /// Call whenever the underlying list changes (e.g. a new search); the cursor is pulled
    /// back inside the new page range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        let last = self.last_page();
        if self.current_page > last {
            self.current_page = last;
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page_slice(items, self.current_page, self.page_size)
    }

    /// Index of the first item on the current page, 0-based.
    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    pub fn meta(&self) -> PageMeta {
        let total_pages = self.total_pages();
        PageMeta {
            page: self.current_page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages,
            has_next: self.current_page < total_pages,
            has_prev: self.current_page > 1,
        }
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// `items[(page-1)*size .. page*size]`, clipped to the slice bounds.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    &items[start..end]
}
