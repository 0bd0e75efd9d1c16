//! Dashboard KPI aggregation.
//!
//! All figures are relative to a calendar "today" in UTC. Month and year
//! bounds are pushed to storage as inclusive ranges on ISO date strings;
//! per-month bucketing uses the parsed dates.

use indexmap::IndexMap;
use medtour_storage::{DynStorage, Filter};
use serde::Serialize;
use time::Date;
use tracing::instrument;

use crate::error::Result;
use crate::models::{Invoice, InvoiceStatus, Patient};
use crate::repository::Repository;
use crate::time::{MONTH_ABBREVIATIONS, format_date, month_bounds, year_bounds};

/// Number of countries reported in `topCountries`.
pub const TOP_COUNTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub monthly_patients: u64,
    pub monthly_revenue: f64,
    pub top_countries: Vec<CountryCount>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: &'static str,
    pub revenue: f64,
}

fn date_range(field: &str, from: Date, to: Date) -> Result<Filter> {
    Ok(Filter::between(field, format_date(from)?, format_date(to)?))
}

fn paid_between(from: Date, to: Date) -> Result<Filter> {
    let paid = Filter::equals("status", InvoiceStatus::Paid.as_str());
    Ok(paid.and(date_range("issuedDate", from, to)?))
}

/// Computes the dashboard KPIs as of `today`.
///
/// The four figures are fetched concurrently; any storage failure fails the
/// whole computation.
#[instrument(skip(storage))]
pub async fn compute(storage: &DynStorage, today: Date) -> Result<Kpi> {
    let patients = Repository::<Patient>::new(storage.clone());
    let invoices = Repository::<Invoice>::new(storage.clone());

    let (month_start, month_end) = month_bounds(today)?;
    let (year_start, year_end) = year_bounds(today.year())?;

    let monthly_patients_filter = date_range("treatmentDate", month_start, month_end)?;
    let monthly_paid_filter = paid_between(month_start, month_end)?;
    let yearly_paid_filter = paid_between(year_start, year_end)?;

    let (monthly_patients, monthly_invoices, all_patients, yearly_invoices) = tokio::try_join!(
        patients.count(Some(&monthly_patients_filter)),
        invoices.find(Some(&monthly_paid_filter)),
        patients.find(None),
        invoices.find(Some(&yearly_paid_filter)),
    )?;

    Ok(Kpi {
        monthly_patients,
        monthly_revenue: monthly_invoices.iter().map(|i| i.amount).sum(),
        top_countries: top_countries(&all_patients, TOP_COUNTRIES),
        revenue_by_month: revenue_by_month(&yearly_invoices),
    })
}

/// Countries by patient count, descending. Ties keep first-seen order.
pub fn top_countries(patients: &[Patient], limit: usize) -> Vec<CountryCount> {
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for patient in patients {
        *counts.entry(patient.country.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<CountryCount> = counts
        .into_iter()
        .map(|(name, value)| CountryCount {
            name: name.to_string(),
            value,
        })
        .collect();
    // stable
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked.truncate(limit);
    ranked
}

/// Paid revenue per calendar month, always twelve entries from January.
pub fn revenue_by_month(invoices: &[Invoice]) -> Vec<MonthlyRevenue> {
    let mut totals = [0.0_f64; 12];
    for invoice in invoices {
        let index = usize::from(u8::from(invoice.issued_date.month())) - 1;
        totals[index] += invoice.amount;
    }

    MONTH_ABBREVIATIONS
        .into_iter()
        .zip(totals)
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}
