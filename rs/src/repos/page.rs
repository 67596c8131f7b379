/*
 * Responsibility
 * - Offset pagination shared by every listing query
 */
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Zero-based page of `size` rows, ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort_dir: SortDir,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_dir: SortDir::default(),
        }
    }
}

impl PageRequest {
    /// Saturates instead of overflowing; requests built from query
    /// parameters are already bounded by `PageParams::into_request`.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, req: PageRequest, total_elements: i64) -> Self {
        let total_pages = if req.size > 0 {
            (total_elements + req.size - 1) / req.size
        } else {
            0
        };

        Self {
            content,
            page: req.page,
            size: req.size,
            total_elements,
            total_pages,
        }
    }

    pub fn empty(req: PageRequest) -> Self {
        Self::new(Vec::new(), req, 0)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
