//! Query-building helpers shared by the list queries.

use sqlx::{Postgres, QueryBuilder};

use crate::params::Params;
use crate::store::StoreError;

/// Reject a page that starts past the end of a non-empty result set.
pub(crate) fn ensure_offset(total: i64, params: &Params) -> Result<(), StoreError> {
    if total > 0 && params.offset >= total {
        return Err(StoreError::OffsetExceedsTotal);
    }
    Ok(())
}

/// Append `ORDER BY`, `LIMIT` and `OFFSET` for `params`.
///
/// `fallback_order` keeps pages stable when the client gave no sort. The
/// client's keys are whitelisted by the normalizer before they get here.
pub(crate) fn push_order_and_page(
    query: &mut QueryBuilder<'_, Postgres>,
    params: &Params,
    fallback_order: &str,
) {
    query.push(" ORDER BY ");
    match params.order_by() {
        Some(order_by) => query.push(order_by),
        None => query.push(fallback_order),
    };
    if params.is_bounded() {
        query.push(" LIMIT ").push_bind(params.limit);
    }
    query.push(" OFFSET ").push_bind(params.offset.max(0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_past_the_end_is_rejected() {
        let params = Params {
            limit: 10,
            offset: 10,
            page_index: 2,
            ..Params::default()
        };
        assert!(matches!(
            ensure_offset(10, &params),
            Err(StoreError::OffsetExceedsTotal)
        ));
        assert!(ensure_offset(11, &params).is_ok());
    }

    #[test]
    fn empty_results_never_overflow() {
        let params = Params {
            limit: 10,
            offset: 40,
            page_index: 5,
            ..Params::default()
        };
        assert!(ensure_offset(0, &params).is_ok());
    }

    #[test]
    fn unbounded_limit_skips_limit_clause() {
        let params = Params {
            limit: 0,
            ..Params::default()
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT id FROM tables");
        push_order_and_page(&mut query, &params, "id");
        assert_eq!(query.sql(), "SELECT id FROM tables ORDER BY id OFFSET $1");
    }

    #[test]
    fn client_order_replaces_fallback() {
        let params = Params {
            order: Some("name,capacity".into()),
            order_direction: Some(crate::params::OrderDirection::Asc),
            limit: 20,
            ..Params::default()
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT id FROM tables");
        push_order_and_page(&mut query, &params, "id");
        assert_eq!(
            query.sql(),
            "SELECT id FROM tables ORDER BY name,capacity ASC LIMIT $1 OFFSET $2"
        );
    }
}
