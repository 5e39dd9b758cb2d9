//! Translation of catalog listing parameters into a store query.
//!
//! The raw query string is normalized once into a [`CatalogQuery`]; both
//! storage backends consume that value, the Mongo backend through
//! [`CatalogQuery::filter`] / [`CatalogQuery::sort`] and the in-memory one
//! through [`CatalogQuery::matches`] / [`SortOption::compare`], so the two
//! agree on what a page contains.

use std::cmp::Ordering;

use bson::{doc, Document};
use serde::Deserialize;

use crate::dto::bill_dto::Page;
use crate::model::bill::Bill;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 8;
pub const MAX_LIMIT: u64 = 100;

/// Raw parameters as they arrive on `GET /bills`. Numbers are kept as text so
/// that garbage falls back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    PriceLow,
    PriceHigh,
    DateNew,
    DateOld,
    TitleAz,
    TitleZa,
}

impl SortOption {
    /// Unknown keys yield `None`, meaning store order.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "priceLow" => Some(SortOption::PriceLow),
            "priceHigh" => Some(SortOption::PriceHigh),
            "dateNew" => Some(SortOption::DateNew),
            "dateOld" => Some(SortOption::DateOld),
            "titleAZ" => Some(SortOption::TitleAz),
            "titleZA" => Some(SortOption::TitleZa),
            _ => None,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            SortOption::PriceLow | SortOption::PriceHigh => "amount",
            SortOption::DateNew | SortOption::DateOld => "date",
            SortOption::TitleAz | SortOption::TitleZa => "title",
        }
    }

    pub fn direction(&self) -> i32 {
        match self {
            SortOption::PriceLow | SortOption::DateOld | SortOption::TitleAz => 1,
            SortOption::PriceHigh | SortOption::DateNew | SortOption::TitleZa => -1,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.field(), self.direction());
        sort
    }

    /// Orders two bills on this key. Ties compare equal so that a stable sort
    /// keeps insertion order.
    pub fn compare(&self, a: &Bill, b: &Bill) -> Ordering {
        let ordering = match self.field() {
            "amount" => a.amount.total_cmp(&b.amount),
            "date" => a.date.cmp(&b.date),
            _ => a.title.cmp(&b.title),
        };
        if self.direction() < 0 {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// One page of a listing: `[(page - 1) * limit, page * limit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        PageWindow {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageWindow {
    /// Non-numeric or non-positive values fall back to the defaults and the
    /// limit is capped at [`MAX_LIMIT`].
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        PageWindow { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .map(|v| v as u64)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalized catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortOption>,
    pub window: PageWindow,
}

pub const SEARCH_FIELDS: [&str; 3] = ["title", "category", "location"];

impl CatalogQuery {
    pub fn from_params(params: &CatalogParams) -> Self {
        CatalogQuery {
            category: non_blank(params.category.as_deref()),
            search: non_blank(params.search.as_deref()),
            sort: params.sort.as_deref().map(str::trim).and_then(SortOption::parse),
            window: PageWindow::from_raw(params.page.as_deref(), params.limit.as_deref()),
        }
    }

    /// Store filter: exact category AND a case-insensitive substring match on
    /// any of the search fields. User input is regex-escaped.
    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        if let Some(category) = &self.category {
            filter.insert("category", category.clone());
        }
        if let Some(search) = &self.search {
            let pattern = regex::escape(search);
            let alternatives: Vec<Document> = SEARCH_FIELDS
                .iter()
                .map(|field| {
                    let mut clause = Document::new();
                    clause.insert(*field, doc! { "$regex": pattern.clone(), "$options": "i" });
                    clause
                })
                .collect();
            filter.insert("$or", alternatives);
        }
        filter
    }

    pub fn sort(&self) -> Option<Document> {
        self.sort.map(|s| s.to_document())
    }

    /// In-process equivalent of [`CatalogQuery::filter`].
    pub fn matches(&self, bill: &Bill) -> bool {
        if let Some(category) = &self.category {
            if &bill.category != category {
                return false;
            }
        }
        match &self.search {
            Some(search) => {
                let needle = search.to_lowercase();
                [Some(&bill.title), Some(&bill.category), bill.location.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|value| value.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    pub fn page<T>(&self, items: Vec<T>, total: u64) -> Page<T> {
        Page {
            items,
            total,
            total_pages: self.window.total_pages(total),
            current_page: self.window.page,
        }
    }
}
