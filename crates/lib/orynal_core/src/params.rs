//! Query parameter normalizer.
//!
//! Every list endpoint turns its raw query string into a [`Params`] by running
//! a fixed sequence of [`Step`]s over it. Each endpoint family has its own
//! sequence (and its own sort-key whitelist), exposed as one function per
//! family: [`restaurants_search`], [`tables_search`] and so on.
//!
//! A failing step stops the sequence. Steps that already ran keep their
//! effect on the `Params` passed to [`apply`].

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Raw query parameters as extracted by the HTTP layer.
pub type RawQuery = HashMap<String, String>;

/// Page size used when `limit` is absent.
pub const DEFAULT_LIMIT: i64 = 20;

/// Format of the `date` parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Sort keys accepted by table listings.
pub const TABLE_ORDER_KEYS: &[&str] = &["id", "name", "type", "capacity"];

/// Sort keys accepted by user (owner/client) listings.
pub const USER_ORDER_KEYS: &[&str] = &["id", "name", "surname", "email"];

/// Sort keys accepted by order listings.
pub const ORDER_ORDER_KEYS: &[&str] = &["id", "date", "status", "total_sum"];

/// Parameter normalization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A sort key or direction outside what the endpoint accepts.
    #[error("{0} param is not accepted")]
    UnacceptedParam(String),

    #[error("order param must be a JSON array of strings: {0}")]
    MalformedOrder(String),

    #[error("{param} must be an integer, got {value:?}")]
    InvalidInteger { param: &'static str, value: String },

    #[error("date must look like 2006-01-02T15:04:05, got {0:?}")]
    InvalidDate(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        })
    }
}

/// Normalized search, sort and pagination request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Params {
    /// Free-text query (`q`), passed through verbatim.
    pub query: Option<String>,
    /// Comma-joined, whitelisted sort keys.
    pub order: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub date: Option<NaiveDateTime>,
    pub limit: i64,
    pub offset: i64,
    pub page_index: i64,
}

impl Params {
    /// Lowercased `%query%` pattern for `LIKE` filters, if a query is set.
    pub fn like_pattern(&self) -> Option<String> {
        self.query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.to_lowercase()))
    }

    /// `ORDER BY` body, present only when both keys and direction were
    /// given. The direction applies to the last key.
    pub fn order_by(&self) -> Option<String> {
        match (&self.order, self.order_direction) {
            (Some(order), Some(direction)) if !order.is_empty() => {
                Some(format!("{order} {}", direction.as_sql()))
            }
            _ => None,
        }
    }

    /// Whether the page size bounds the result set. Non-positive limits
    /// mean "everything".
    pub fn is_bounded(&self) -> bool {
        self.limit > 0
    }
}

/// One normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `q` passthrough.
    Search,
    /// `order` JSON array checked against the given whitelist.
    Order(&'static [&'static str]),
    /// `order_vector`: `asc` or `desc`.
    OrderVector,
    /// `limit`, defaulting to [`DEFAULT_LIMIT`].
    Limit,
    /// `page`, turned into `offset` and `page_index`.
    PageIndex,
    /// `date` in [`DATE_FORMAT`].
    Date,
}

pub const RESTAURANTS: &[Step] = &[Step::Search, Step::Limit, Step::PageIndex];
pub const REVIEWS: &[Step] = &[Step::Limit, Step::PageIndex];
pub const TABLES: &[Step] = &[
    Step::Order(TABLE_ORDER_KEYS),
    Step::OrderVector,
    Step::Limit,
    Step::Search,
    Step::PageIndex,
    Step::Date,
];
pub const USERS: &[Step] = &[
    Step::Search,
    Step::Order(USER_ORDER_KEYS),
    Step::OrderVector,
    Step::Limit,
    Step::PageIndex,
];
pub const ORDERS: &[Step] = &[
    Step::Order(ORDER_ORDER_KEYS),
    Step::OrderVector,
    Step::Limit,
    Step::PageIndex,
];
pub const MENU: &[Step] = &[Step::Search, Step::Limit, Step::PageIndex];

/// Run `steps` in order over `params`, stopping at the first failure.
pub fn apply(steps: &[Step], params: &mut Params, raw: &RawQuery) -> Result<(), ParamsError> {
    for step in steps {
        match step {
            Step::Search => search_format(params, raw),
            Step::Order(whitelist) => order_format(params, raw, whitelist)?,
            Step::OrderVector => order_vector_format(params, raw)?,
            Step::Limit => limit_format(params, raw)?,
            Step::PageIndex => page_index_format(params, raw)?,
            Step::Date => date_format(params, raw)?,
        }
    }
    Ok(())
}

fn run(steps: &[Step], mut params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    apply(steps, &mut params, raw)?;
    Ok(params)
}

pub fn restaurants_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(RESTAURANTS, params, raw)
}

pub fn reviews_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(REVIEWS, params, raw)
}

pub fn tables_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(TABLES, params, raw)
}

pub fn users_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(USERS, params, raw)
}

pub fn orders_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(ORDERS, params, raw)
}

pub fn menu_search(params: Params, raw: &RawQuery) -> Result<Params, ParamsError> {
    run(MENU, params, raw)
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn present<'a>(raw: &'a RawQuery, key: &str) -> Option<&'a str> {
    raw.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn parse_int(param: &'static str, value: &str) -> Result<i64, ParamsError> {
    value.parse().map_err(|_| ParamsError::InvalidInteger {
        param,
        value: value.to_string(),
    })
}

pub fn search_format(params: &mut Params, raw: &RawQuery) {
    if let Some(q) = present(raw, "q") {
        params.query = Some(q.to_string());
    }
}

pub fn order_format(
    params: &mut Params,
    raw: &RawQuery,
    whitelist: &[&str],
) -> Result<(), ParamsError> {
    let Some(order) = present(raw, "order") else {
        return Ok(());
    };
    let keys: Vec<String> =
        serde_json::from_str(order).map_err(|e| ParamsError::MalformedOrder(e.to_string()))?;
    if let Some(rejected) = keys.iter().find(|k| !whitelist.contains(&k.as_str())) {
        return Err(ParamsError::UnacceptedParam(rejected.clone()));
    }
    if !keys.is_empty() {
        params.order = Some(keys.join(","));
    }
    Ok(())
}

pub fn order_vector_format(params: &mut Params, raw: &RawQuery) -> Result<(), ParamsError> {
    match present(raw, "order_vector") {
        None => Ok(()),
        Some("asc") => {
            params.order_direction = Some(OrderDirection::Asc);
            Ok(())
        }
        Some("desc") => {
            params.order_direction = Some(OrderDirection::Desc);
            Ok(())
        }
        Some(_) => Err(ParamsError::UnacceptedParam("your order_vector".into())),
    }
}

/// Any integer is accepted; see DESIGN.md on limit bounds.
pub fn limit_format(params: &mut Params, raw: &RawQuery) -> Result<(), ParamsError> {
    params.limit = match present(raw, "limit") {
        None => DEFAULT_LIMIT,
        Some(value) => parse_int("limit", value)?,
    };
    Ok(())
}

pub fn page_index_format(params: &mut Params, raw: &RawQuery) -> Result<(), ParamsError> {
    let page = match present(raw, "page") {
        None => 1,
        Some(value) => parse_int("page", value)?,
    };
    if page <= 1 {
        params.offset = 0;
        params.page_index = 1;
    } else {
        params.offset = (page - 1).saturating_mul(params.limit);
        params.page_index = page;
    }
    Ok(())
}

pub fn date_format(params: &mut Params, raw: &RawQuery) -> Result<(), ParamsError> {
    if let Some(value) = present(raw, "date") {
        let date = NaiveDateTime::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| ParamsError::InvalidDate(value.to_string()))?;
        params.date = Some(date);
    }
    Ok(())
}
