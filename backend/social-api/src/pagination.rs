/// Page filter parameters and paged-result metadata
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters accepted by every paginated list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Filter {
    /// Page number clamped to >= 1.
    pub fn page(&self) -> i64 {
        self.page_number.max(1)
    }

    /// Page size clamped to 1..=100.
    pub fn size(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.size()
    }
}

/// A page of results plus paging metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub results: Vec<T>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl<T> PagedResult<T> {
    pub fn new(results: Vec<T>, filter: &Filter, total_count: i64) -> Self {
        let page_size = filter.size();
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        };

        Self {
            results,
            page_index: filter.page(),
            page_size,
            total_count,
            total_pages,
            lower_bound: filter.page(),
            upper_bound: total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unspecified() {
        let filter = Filter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn page_and_size_are_clamped() {
        let filter = Filter {
            page_number: 0,
            page_size: 5_000,
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let filter = Filter {
            page_number: 3,
            page_size: 10,
        };
        assert_eq!(filter.offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let filter = Filter {
            page_number: 1,
            page_size: 10,
        };
        let page: PagedResult<i32> = PagedResult::new(vec![], &filter, 41);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.upper_bound, 5);
        assert_eq!(page.lower_bound, 1);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let filter = Filter::default();
        let page: PagedResult<i32> = PagedResult::new(vec![], &filter, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let filter = Filter {
            page_number: 2,
            page_size: 5,
        };
        let page = PagedResult::new(vec![1, 2, 3], &filter, 13);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageIndex"], 2);
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["totalCount"], 13);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["lowerBound"], 2);
        assert_eq!(json["upperBound"], 3);
    }
}
