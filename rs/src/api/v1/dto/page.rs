use serde::Deserialize;

use crate::repos::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, SortDir};

/// `?page=0&size=10&sort_dir=desc`
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_dir: Option<String>,
}

impl PageParams {
    pub fn into_request(self) -> Result<PageRequest, &'static str> {
        let page = self.page.unwrap_or(0);
        if page < 0 {
            return Err("page must be >= 0");
        }

        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err("size must be between 1 and 100");
        }

        if page.checked_mul(size).is_none() {
            return Err("page is out of range");
        }

        let sort_dir = match self.sort_dir.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("desc") => SortDir::Desc,
            Some("asc") => SortDir::Asc,
            Some(_) => return Err("sort_dir must be asc or desc"),
        };

        Ok(PageRequest {
            page,
            size,
            sort_dir,
        })
    }
}
