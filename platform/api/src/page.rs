use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 200;

/// Raw pagination fields as clients send them. `per_page` is accepted as an
/// alias of `pageSize`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, alias = "per_page", alias = "page_size")]
    pub page_size: Option<i64>,
}

impl PageRequest {
    /// Pages past the largest representable SQL offset are clamped to it.
    pub fn params(&self) -> PageParams {
        let page_size = self
            .page_size
            .map(|size| size.max(1) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let last_page = i64::MAX as u64 / page_size;
        let page = (self.page.unwrap_or(1).max(1) as u64).min(last_page);
        PageParams { page, page_size }
    }
}

/// Normalized, 1-based pagination.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub page_size: u64,
}

impl PageParams {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
            total_pages: params.total_pages(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_size_are_floored_at_one() {
        let params = PageRequest {
            page: Some(-3),
            page_size: Some(0),
        }
        .params();
        assert_eq!(params, PageParams { page: 1, page_size: 1 });
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn huge_page_numbers_keep_the_offset_in_range() {
        let params = PageRequest {
            page: Some(i64::MAX),
            page_size: Some(10),
        }
        .params();
        assert_eq!(params.page, i64::MAX as u64 / 10);
        assert!(params.offset() <= i64::MAX as u64);

        let manual = PageParams { page: u64::MAX, page_size: 200 };
        assert_eq!(manual.offset(), u64::MAX);
    }

    #[test]
    fn total_pages_uses_ceiling_division() {
        let params = PageParams { page: 2, page_size: 10 };
        assert_eq!(params.total_pages(0), 0);
        assert_eq!(params.total_pages(10), 1);
        assert_eq!(params.total_pages(11), 2);
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn page_size_is_capped() {
        let request: PageRequest = serde_json::from_str(r#"{"pageSize": 5000}"#).unwrap();
        assert_eq!(request.params(), PageParams { page: 1, page_size: MAX_PAGE_SIZE });
        assert_eq!(request.params().total_pages(401), 3);
    }

    #[test]
    fn per_page_alias_is_accepted() {
        let request: PageRequest = serde_json::from_str(r#"{"page": 3, "per_page": 25}"#).unwrap();
        assert_eq!(request.params(), PageParams { page: 3, page_size: 25 });
    }
}
