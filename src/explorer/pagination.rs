/// Previous/Next controls derived from the current page and page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self {
            page,
            total_pages: total_pages.max(1),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page the Previous control moves to, or None when it is disabled.
    pub fn previous(&self) -> Option<u32> {
        if self.has_previous() {
            Some((self.page - 1).clamp(1, self.total_pages))
        } else {
            None
        }
    }

    pub fn next(&self) -> Option<u32> {
        if self.has_next() {
            Some((self.page + 1).clamp(1, self.total_pages))
        } else {
            None
        }
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}
