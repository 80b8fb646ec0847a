//! Paged list envelope returned by every list endpoint.

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// One page of items plus the pagination metadata the client needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub items_per_page: i64,
    pub page_index: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> ListResponse<T> {
    /// Builds a page from the fetched items, the unpaged total and the
    /// `Params` the query ran with.
    pub fn new(items: Vec<T>, total_items: i64, params: &Params) -> Self {
        Self {
            items,
            items_per_page: params.limit,
            page_index: params.page_index,
            total_pages: total_pages(total_items, params.limit),
            total_items,
        }
    }
}

/// `ceil(total / per_page)`, or 0 when the page size is not positive.
pub fn total_pages(total_items: i64, items_per_page: i64) -> i64 {
    if items_per_page <= 0 || total_items <= 0 {
        return 0;
    }
    total_items / items_per_page + i64::from(total_items % items_per_page != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }

    #[test]
    fn total_pages_is_zero_without_page_size() {
        assert_eq!(total_pages(42, 0), 0);
        assert_eq!(total_pages(42, -5), 0);
    }

    #[test]
    fn total_pages_handles_huge_page_size() {
        assert_eq!(total_pages(2, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, 1), i64::MAX);
        assert_eq!(total_pages(i64::MAX, 2), i64::MAX / 2 + 1);
    }

    #[test]
    fn list_response_with_max_limit() {
        let params = Params {
            limit: i64::MAX,
            ..Params::default()
        };
        let page: ListResponse<i64> = ListResponse::new(vec![], 2, &params);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items_per_page, i64::MAX);
    }

    #[test]
    fn list_response_serializes_camel_case() {
        let params = Params {
            limit: 10,
            page_index: 2,
            offset: 10,
            ..Params::default()
        };
        let page = ListResponse::new(vec![1, 2, 3], 13, &params);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["itemsPerPage"], 10);
        assert_eq!(json["pageIndex"], 2);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalItems"], 13);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}
