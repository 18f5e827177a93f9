//! Read-only summaries derived from the records.
//!
//! Everything here is a pure function of its input and is recomputed from scratch on each call.
//! Records whose stored date does not parse are left out of every date-based summary.

use crate::error::Res;
use crate::model::{Amount, Category, ExpenseRecord};
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month such as `Jan 2024`. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthLabel {
    year: i32,
    month: u32,
}

impl MonthLabel {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for MonthLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = MONTH_ABBREVIATIONS[(self.month - 1) as usize];
        write!(f, "{} {}", name, self.year)
    }
}

impl FromStr for MonthLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Res<Self> {
        let date = NaiveDate::parse_from_str(&format!("01 {}", s.trim()), "%d %b %Y")
            .with_context(|| format!("Invalid month '{s}', expected e.g. 'Jan 2024'"))?;
        Ok(Self::of(date))
    }
}

impl Serialize for MonthLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: MonthLabel,
    pub total: Amount,
}

/// The summaries shown next to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateView {
    /// The month the `monthly_total` refers to.
    pub reference: MonthLabel,
    /// The total of the current view within `reference`.
    pub monthly_total: Amount,
    /// Totals per category over the whole ledger, in order of first appearance.
    pub category_totals: Vec<CategoryTotal>,
    /// Totals per month over the whole ledger, in calendar order.
    pub monthly_totals: Vec<MonthTotal>,
}

impl AggregateView {
    /// Computes every summary. `view` is the currently displayed subset of `all`; `today` picks
    /// the reference month.
    pub fn compute<'a, A, V>(all: A, view: V, today: NaiveDate) -> Self
    where
        A: IntoIterator<Item = &'a ExpenseRecord> + Clone,
        V: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let reference = MonthLabel::of(today);
        Self {
            reference,
            monthly_total: monthly_total(view, reference.month, reference.year),
            category_totals: category_totals(all.clone()),
            monthly_totals: monthly_totals(all),
        }
    }
}

/// Sums the amounts of the records dated within `month` of `year`.
pub fn monthly_total<'a, I>(records: I, month: u32, year: i32) -> Amount
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| r.date().month_year() == Some((month, year)))
        .map(|r| r.amount())
        .sum()
}

/// Sums the amounts per category. Categories appear in the order they are first seen; categories
/// without records are absent.
pub fn category_totals<'a, I>(records: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&Category, usize> = HashMap::new();
    for record in records {
        match index.get(record.category()) {
            Some(&i) => totals[i].total += record.amount(),
            None => {
                index.insert(record.category(), totals.len());
                totals.push(CategoryTotal {
                    category: record.category().clone(),
                    total: record.amount(),
                });
            }
        }
    }
    totals
}

/// Sums the amounts per calendar month, earliest month first.
pub fn monthly_totals<'a, I>(records: I) -> Vec<MonthTotal>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut totals: BTreeMap<MonthLabel, Amount> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date().naive() {
            *totals.entry(MonthLabel::of(date)).or_insert(Amount::ZERO) += record.amount();
        }
    }
    totals
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expense, ExpenseDate};
    use crate::store::RecordStore;
    use rust_decimal::Decimal;

    fn store(rows: &[(&str, Category, &str)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (date, category, amount) in rows {
            store.append(Expense {
                date: ExpenseDate::from_stored(*date),
                category: category.clone(),
                amount: amount.parse().unwrap(),
                note: String::new(),
            });
        }
        store
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_two_expenses() {
        let store = store(&[
            ("01/15/24", Category::Food, "250"),
            ("02/01/24", Category::Transport, "80"),
        ]);
        let feb = monthly_total(store.records(), 2, 2024);
        assert_eq!(feb.to_fixed(), "80.00");
        assert_eq!(
            category_totals(store.records()),
            vec![
                CategoryTotal {
                    category: Category::Food,
                    total: amount("250")
                },
                CategoryTotal {
                    category: Category::Transport,
                    total: amount("80")
                },
            ]
        );
    }

    #[test]
    fn test_monthly_totals_calendar_order() {
        let store = store(&[
            ("03/05/24", Category::Food, "1"),
            ("01/10/24", Category::Food, "2"),
            ("02/20/23", Category::Food, "3"),
            ("01/11/24", Category::Other, "4"),
        ]);
        let totals = monthly_totals(store.records());
        let labels: Vec<String> = totals.iter().map(|t| t.month.to_string()).collect();
        assert_eq!(labels, vec!["Feb 2023", "Jan 2024", "Mar 2024"]);
        assert_eq!(totals[1].total.value(), Decimal::from(6));
    }

    #[test]
    fn test_unparseable_dates_are_skipped() {
        let store = store(&[
            ("sometime", Category::Food, "100"),
            ("02/01/24", Category::Food, "5"),
        ]);
        assert_eq!(monthly_totals(store.records()).len(), 1);
        assert_eq!(monthly_total(store.records(), 2, 2024), amount("5"));
        // still counted per category
        assert_eq!(category_totals(store.records())[0].total, amount("105"));
    }

    #[test]
    fn test_category_first_appearance_order() {
        let store = store(&[
            ("01/01/24", Category::Shopping, "1"),
            ("01/02/24", Category::Food, "1"),
            ("01/03/24", Category::Shopping, "1"),
        ]);
        let order: Vec<Category> = category_totals(store.records())
            .into_iter()
            .map(|t| t.category)
            .collect();
        assert_eq!(order, vec![Category::Shopping, Category::Food]);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<ExpenseRecord> = Vec::new();
        assert!(monthly_total(&records, 1, 2024).is_zero());
        assert!(category_totals(&records).is_empty());
        assert!(monthly_totals(&records).is_empty());
    }

    #[test]
    fn test_compute_uses_view_for_monthly_total() {
        let store = store(&[
            ("02/01/24", Category::Food, "10"),
            ("02/02/24", Category::Transport, "20"),
        ]);
        let view: Vec<&ExpenseRecord> = store
            .records()
            .iter()
            .filter(|r| *r.category() == Category::Food)
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let agg = AggregateView::compute(store.records(), view, today);
        assert_eq!(agg.reference.to_string(), "Feb 2024");
        assert_eq!(agg.monthly_total, amount("10"));
        assert_eq!(agg.category_totals.len(), 2);
        assert_eq!(agg.monthly_totals[0].total, amount("30"));
    }

    #[test]
    fn test_month_label_parse_and_order() {
        let jan: MonthLabel = "Jan 2024".parse().unwrap();
        let dec: MonthLabel = "dec 2023".parse().unwrap();
        assert!(dec < jan);
        assert_eq!(dec.to_string(), "Dec 2023");
        assert!("Smarch 2024".parse::<MonthLabel>().is_err());
        assert_eq!(MonthLabel::new(13, 2024), None);
    }
}
