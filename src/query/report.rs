//! Revenue and activity rollups over paid bills.
//!
//! Each rollup exists twice: as an aggregation pipeline for MongoDB and as a
//! plain function over records for the in-memory store. Amounts go through
//! the same lenient parsing in both (`$convert` with `onError: 0` on the
//! server, [`parse_amount`](crate::model::field::parse_amount) here).

use std::collections::BTreeMap;
use std::str::FromStr;

use bson::{doc, Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::dto::stats_dto::{CategoryRevenue, DailyCount, UserStats};
use crate::model::paid_bill::PaidBill;

pub const RECENT_BILLS_LIMIT: usize = 5;

/// Which end of the day histogram `recentTransactions` keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayOrder {
    /// Sort days ascending and keep the first N (the N earliest days).
    #[default]
    Earliest,
    /// Keep the N most recent days, still reported in ascending order.
    Latest,
}

impl FromStr for DayOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" | "asc" => Ok(DayOrder::Earliest),
            "latest" | "desc" => Ok(DayOrder::Latest),
            other => Err(format!("unknown day order: {other}")),
        }
    }
}

impl DayOrder {
    fn direction(&self) -> i32 {
        match self {
            DayOrder::Earliest => 1,
            DayOrder::Latest => -1,
        }
    }
}

/// Calendar day (`YYYY-MM-DD`, UTC) of a stored date. Accepts RFC 3339
/// timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` and bare dates.
pub fn day_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.format("%Y-%m-%d").to_string());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn amount_expr() -> Bson {
    Bson::Document(doc! {
        "$convert": { "input": "$amount", "to": "double", "onError": 0.0, "onNull": 0.0 }
    })
}

pub fn total_revenue_pipeline() -> Vec<Document> {
    vec![doc! { "$group": { "_id": Bson::Null, "total": { "$sum": amount_expr() } } }]
}

pub fn revenue_by_category_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$category", "total": { "$sum": amount_expr() } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

pub fn daily_counts_pipeline(order: DayOrder, limit: i64) -> Vec<Document> {
    vec![
        doc! { "$project": { "day": { "$dateToString": {
            "format": "%Y-%m-%d",
            "date": { "$convert": { "input": "$date", "to": "date", "onError": Bson::Null, "onNull": Bson::Null } },
        } } } },
        doc! { "$match": { "day": { "$ne": Bson::Null } } },
        doc! { "$group": { "_id": "$day", "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": order.direction() } },
        doc! { "$limit": limit },
    ]
}

/// Restores ascending day order after a descending limit.
pub fn finish_daily_counts(mut counts: Vec<DailyCount>, order: DayOrder) -> Vec<DailyCount> {
    if order == DayOrder::Latest {
        counts.reverse();
    }
    counts
}

pub fn total_revenue<'a>(bills: impl IntoIterator<Item = &'a PaidBill>) -> f64 {
    bills.into_iter().map(|b| b.amount).sum()
}

pub fn revenue_by_category<'a>(bills: impl IntoIterator<Item = &'a PaidBill>) -> Vec<CategoryRevenue> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for bill in bills {
        *totals.entry(bill.category.as_str()).or_insert(0.0) += bill.amount;
    }
    totals
        .into_iter()
        .map(|(category, total)| CategoryRevenue {
            category: category.to_string(),
            total,
        })
        .collect()
}

pub fn daily_counts<'a>(
    bills: impl IntoIterator<Item = &'a PaidBill>,
    order: DayOrder,
    limit: usize,
) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<String, u64> = BTreeMap::new();
    for day in bills.into_iter().filter_map(|b| b.date.as_deref().and_then(day_key)) {
        *per_day.entry(day).or_insert(0) += 1;
    }
    let counts: Vec<DailyCount> = per_day
        .into_iter()
        .map(|(day, count)| DailyCount { day, count })
        .collect();
    match order {
        DayOrder::Earliest => counts.into_iter().take(limit).collect(),
        DayOrder::Latest => {
            let skip = counts.len().saturating_sub(limit);
            counts.into_iter().skip(skip).collect()
        }
    }
}

/// Per-user rollup. `bills` must be in insertion order; "recent" means the
/// last inserted, newest first.
pub fn user_stats(bills: Vec<PaidBill>) -> UserStats {
    let transaction_count = bills.len() as u64;
    let total_spent = total_revenue(&bills);
    let recent_bills = bills.into_iter().rev().take(RECENT_BILLS_LIMIT).collect();
    UserStats {
        transaction_count,
        total_spent,
        recent_bills,
    }
}

/// Reads a numeric aggregation output field regardless of its BSON width.
pub fn bson_number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid(category: &str, amount: f64, date: &str) -> PaidBill {
        PaidBill {
            id: None,
            email: "payer@bills.io".to_string(),
            title: format!("{category} bill"),
            category: category.to_string(),
            amount,
            date: Some(date.to_string()),
            location: None,
            extra: Document::new(),
        }
    }

    #[test]
    fn test_day_key_formats() {
        assert_eq!(day_key("2025-03-04").as_deref(), Some("2025-03-04"));
        assert_eq!(day_key("2025-03-04T10:20:30").as_deref(), Some("2025-03-04"));
        assert_eq!(day_key("2025-03-04T23:30:00-02:00").as_deref(), Some("2025-03-05"));
        assert_eq!(day_key("2025-03-04T10:20:30.123Z").as_deref(), Some("2025-03-04"));
        assert_eq!(day_key("yesterday"), None);
        assert_eq!(day_key(""), None);
    }

    #[test]
    fn test_revenue_by_category_matches_independent_sums() {
        let amounts = [10.0, 20.0, 5.0, 7.5, 12.0, 3.0, 40.0, 1.5, 9.0, 2.0];
        let bills: Vec<PaidBill> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| paid(if i % 3 == 0 { "A" } else { "B" }, *a, "2025-01-01"))
            .collect();
        let expected_a: f64 = bills.iter().filter(|b| b.category == "A").map(|b| b.amount).sum();
        let expected_b: f64 = bills.iter().filter(|b| b.category == "B").map(|b| b.amount).sum();

        let rollup = revenue_by_category(&bills);
        assert_eq!(
            rollup,
            vec![
                CategoryRevenue { category: "A".to_string(), total: expected_a },
                CategoryRevenue { category: "B".to_string(), total: expected_b },
            ]
        );
        assert_eq!(total_revenue(&bills), amounts.iter().sum::<f64>());
    }

    #[test]
    fn test_daily_counts_earliest_keeps_first_days() {
        let bills: Vec<PaidBill> = (1..=9)
            .flat_map(|d| {
                let date = format!("2025-01-{d:02}");
                vec![paid("A", 1.0, &date), paid("A", 1.0, &date)]
            })
            .chain(std::iter::once(paid("A", 1.0, "not a date")))
            .collect();
        let counts = daily_counts(&bills, DayOrder::Earliest, 7);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[0], DailyCount { day: "2025-01-01".to_string(), count: 2 });
        assert_eq!(counts[6].day, "2025-01-07");
    }

    #[test]
    fn test_daily_counts_latest_keeps_last_days_ascending() {
        let bills: Vec<PaidBill> = (1..=9).map(|d| paid("A", 1.0, &format!("2025-01-{d:02}"))).collect();
        let counts = daily_counts(&bills, DayOrder::Latest, 7);
        let days: Vec<&str> = counts.iter().map(|c| c.day.as_str()).collect();
        assert_eq!(days.first(), Some(&"2025-01-03"));
        assert_eq!(days.last(), Some(&"2025-01-09"));
    }

    #[test]
    fn test_finish_daily_counts_reverses_latest() {
        let desc = vec![
            DailyCount { day: "2025-01-09".to_string(), count: 1 },
            DailyCount { day: "2025-01-08".to_string(), count: 4 },
        ];
        let asc = finish_daily_counts(desc, DayOrder::Latest);
        assert_eq!(asc[0].day, "2025-01-08");
    }

    #[test]
    fn test_user_stats_recent_is_last_inserted_first() {
        let bills: Vec<PaidBill> = (1..=7).map(|i| paid("A", i as f64, "2025-01-01")).collect();
        let stats = user_stats(bills);
        assert_eq!(stats.transaction_count, 7);
        assert_eq!(stats.total_spent, 28.0);
        let recent: Vec<f64> = stats.recent_bills.iter().map(|b| b.amount).collect();
        assert_eq!(recent, vec![7.0, 6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_pipelines_shape() {
        let daily = daily_counts_pipeline(DayOrder::Latest, 7);
        assert_eq!(daily.len(), 5);
        assert_eq!(daily[3], doc! { "$sort": { "_id": -1 } });
        assert_eq!(daily[4], doc! { "$limit": 7_i64 });
        let by_category = revenue_by_category_pipeline();
        let group = by_category[0].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$category");
        assert_eq!(total_revenue_pipeline().len(), 1);
    }

    #[test]
    fn test_day_order_parse() {
        assert_eq!("latest".parse::<DayOrder>().unwrap(), DayOrder::Latest);
        assert_eq!("Earliest".parse::<DayOrder>().unwrap(), DayOrder::Earliest);
        assert!("sideways".parse::<DayOrder>().is_err());
    }

    #[test]
    fn test_bson_number_widths() {
        let d = doc! { "a": 1_i32, "b": 2_i64, "c": 2.5, "d": "x" };
        assert_eq!(bson_number(&d, "a"), 1.0);
        assert_eq!(bson_number(&d, "b"), 2.0);
        assert_eq!(bson_number(&d, "c"), 2.5);
        assert_eq!(bson_number(&d, "d"), 0.0);
    }
}
