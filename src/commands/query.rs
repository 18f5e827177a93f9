//! Read-only command handlers: `list`, `total` and `analytics`.

use crate::aggregate::{self, CategoryTotal, MonthLabel, MonthTotal};
use crate::args::{ListArgs, LoginArgs, TotalArgs};
use crate::commands::{with_session, Out};
use crate::error::{Error, ErrorType};
use crate::model::Amount;
use crate::view::{DisplayRow, Filter};
use crate::{Config, Result};
use serde::Serialize;

/// The rows of `expense list` and the total of the current month over those rows.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub filter: Filter,
    pub rows: Vec<DisplayRow>,
    pub month: MonthLabel,
    pub monthly_total: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTotal {
    pub month: MonthLabel,
    pub total: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub category_totals: Vec<CategoryTotal>,
    pub monthly_totals: Vec<MonthTotal>,
}

/// Lists the expenses that match the filter, in ledger order, followed by the total of the
/// current month over the listed expenses.
pub fn list(config: &Config, args: &ListArgs) -> Result<Out<Listing>> {
    let filter = args.filter();
    let listing = with_session(config, args.login(), |controller| {
        controller.set_filter(filter.clone())?;
        let session = controller.session()?;
        let aggregates = session.aggregates();
        Ok(Listing {
            filter,
            rows: session.rows().to_vec(),
            month: aggregates.reference,
            monthly_total: aggregates.monthly_total,
        })
    })?;

    let mut message = if listing.rows.is_empty() {
        format!("No expenses found for {}\n", listing.filter)
    } else {
        render_table(&listing.rows)
    };
    message.push_str(&format!(
        "\nThis Month's Total ({}): {}",
        listing.month,
        listing.monthly_total.to_currency(config.currency())
    ));
    Ok(Out::new(message, listing))
}

/// Shows the total of one month over the whole ledger. Without `--month` and `--year` the
/// current month is used.
pub fn total(config: &Config, args: &TotalArgs) -> Result<Out<MonthlyTotal>> {
    let month_year = match args.month_year() {
        Some((month, year)) => Some(MonthLabel::new(month, year).ok_or_else(|| {
            Error::msg(
                ErrorType::Validation,
                format!("Invalid month {month}, expected 1 to 12"),
            )
        })?),
        None => None,
    };
    let monthly = with_session(config, args.login(), |controller| {
        let session = controller.session()?;
        Ok(match month_year {
            Some(month) => MonthlyTotal {
                month,
                total: aggregate::monthly_total(session.records(), month.month(), month.year()),
            },
            None => MonthlyTotal {
                month: session.aggregates().reference,
                total: session.aggregates().monthly_total,
            },
        })
    })?;
    Ok(Out::new(
        format!(
            "Total for {}: {}",
            monthly.month,
            monthly.total.to_currency(config.currency())
        ),
        monthly,
    ))
}

/// Shows the totals per category, in order of first appearance, and per month, in calendar order.
pub fn analytics(config: &Config, login: &LoginArgs) -> Result<Out<Analytics>> {
    let analytics = with_session(config, login, |controller| {
        let aggregates = controller.session()?.aggregates();
        Ok(Analytics {
            category_totals: aggregates.category_totals.clone(),
            monthly_totals: aggregates.monthly_totals.clone(),
        })
    })?;
    if analytics.category_totals.is_empty() {
        return Ok(Out::new("No expenses recorded yet", analytics));
    }

    let currency = config.currency();
    let mut message = String::from("Spending by category:\n");
    for CategoryTotal { category, total } in &analytics.category_totals {
        message.push_str(&format!(
            "  {:<18} {:>14}\n",
            category,
            total.to_currency(currency)
        ));
    }
    message.push_str("\nSpending by month:");
    for MonthTotal { month, total } in &analytics.monthly_totals {
        message.push_str(&format!(
            "\n  {:<18} {:>14}",
            month,
            total.to_currency(currency)
        ));
    }
    Ok(Out::new(message, analytics))
}

fn render_table(rows: &[DisplayRow]) -> String {
    let id_width = rows
        .iter()
        .map(|r| r.id.to_string().len())
        .max()
        .unwrap_or_default()
        .max(2);
    let mut table = format!(
        "{:>iw$}  {:<8}  {:<18}  {:>12}  Note\n",
        "ID",
        "Date",
        "Category",
        "Amount",
        iw = id_width
    );
    for row in rows {
        let line = format!(
            "{:>iw$}  {:<8}  {:<18}  {:>12}  {}",
            row.id.to_string(),
            row.date,
            row.category,
            row.amount,
            row.note,
            iw = id_width
        );
        table.push_str(line.trim_end());
        table.push('\n');
    }
    table
}
