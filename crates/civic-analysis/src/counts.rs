//! Count roll-ups: per-priority tallies, open/closed status and filing rates

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use civic_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::complaint::{Complaint, Priority};

/// One value per priority tier, serialized as `csr1`, `csr2`, `csr3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ByPriority<T> {
    pub csr1: T,
    pub csr2: T,
    pub csr3: T,
}

impl<T> ByPriority<T> {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Priority) -> T,
    {
        Self {
            csr1: f(Priority::Hazard),
            csr2: f(Priority::High),
            csr3: f(Priority::Normal),
        }
    }

    #[must_use]
    pub fn get(&self, priority: Priority) -> &T {
        match priority {
            Priority::Hazard => &self.csr1,
            Priority::High => &self.csr2,
            Priority::Normal => &self.csr3,
        }
    }
}

/// Number of complaints in each priority tier.
pub type PriorityCounts = ByPriority<usize>;

impl PriorityCounts {
    /// Tallies complaints by tier; complaints without a priority are not counted.
    pub fn from_complaints<'a, I>(complaints: I) -> Self
    where
        I: IntoIterator<Item = &'a Complaint>,
    {
        let mut counts = Self::default();
        for priority in complaints.into_iter().filter_map(|c| c.priority) {
            match priority {
                Priority::Hazard => counts.csr1 += 1,
                Priority::High => counts.csr2 += 1,
                Priority::Normal => counts.csr3 += 1,
            }
        }
        counts
    }
}

/// Open/closed tallies of a group of complaints at a cutoff date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub total_complaints: usize,
    pub open_complaints: usize,
    pub closed_complaints: usize,
    /// Still open after more than a year
    pub open_over_one_year: usize,
    /// Closed, but only after more than a year
    pub closed_over_one_year: usize,
    /// Open or closed, went unresolved for more than a year
    pub total_unresolved_after_one_year: usize,
    /// `total_unresolved_after_one_year` as a percentage of the total
    pub percent_over_one_year_to_response: Option<f64>,
    /// Naive average of days to closure, closed complaints only
    pub avg_days_to_response: Option<f64>,
}

impl StatusCounts {
    #[expect(clippy::cast_precision_loss)]
    pub fn from_complaints<'a, I>(complaints: I, cutoff: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Complaint>,
    {
        let mut counts = Self::default();
        let mut response_days = vec![];

        for complaint in complaints {
            let over_one_year = complaint.more_than_one_year(cutoff);
            counts.total_complaints += 1;
            if complaint.is_closed() {
                counts.closed_complaints += 1;
                counts.closed_over_one_year += usize::from(over_one_year);
                response_days.push(complaint.days_since_complaint(cutoff) as f64);
            } else {
                counts.open_complaints += 1;
                counts.open_over_one_year += usize::from(over_one_year);
            }
        }

        counts.total_unresolved_after_one_year =
            counts.open_over_one_year + counts.closed_over_one_year;
        if counts.total_complaints > 0 {
            counts.percent_over_one_year_to_response = Some(
                100.0 * counts.total_unresolved_after_one_year as f64
                    / counts.total_complaints as f64,
            );
        }
        counts.avg_days_to_response = DescriptiveStats::new(response_days).map(|s| s.mean);
        counts
    }
}

/// Years covered by the data: from January 1 of the earliest receipt year
/// up to the cutoff, in 365-day years.
///
/// `None` when there are no complaints or the span is not positive.
///
/// ```
/// # use chrono::NaiveDate;
/// # use civic_analysis::{complaint::Complaint, counts::filing_span_years};
/// let complaints: Vec<Complaint> = serde_json::from_str(
///     r#"[{"csr": 1, "date_received": "2011-03-04"}, {"csr": 2, "date_received": "2014-01-01"}]"#,
/// ).unwrap();
/// let cutoff = NaiveDate::from_ymd_opt(2014, 7, 13).unwrap();
/// let years = filing_span_years(&complaints, cutoff).unwrap();
/// assert!((years - 3.5315).abs() < 1e-4);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn filing_span_years<'a, I>(complaints: I, cutoff: NaiveDate) -> Option<f64>
where
    I: IntoIterator<Item = &'a Complaint>,
{
    let earliest = complaints.into_iter().map(|c| c.date_received).min()?;
    let start = NaiveDate::from_ymd_opt(earliest.year(), 1, 1)?;
    let days = (cutoff - start).num_days();
    (days > 0).then(|| days as f64 / 365.0)
}

/// Average number of complaints filed per year over a span of years.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_filed_per_year(count: usize, span_years: Option<f64>) -> Option<f64> {
    span_years.map(|years| count as f64 / years)
}

/// Most frequent problem types, most frequent first (ties by name).
#[must_use]
pub fn top_problem_types<'a, I>(complaints: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Complaint>,
{
    let mut counts = BTreeMap::<&str, usize>::new();
    for problem_type in complaints
        .into_iter()
        .filter_map(|c| c.problem_type.as_deref())
    {
        *counts.entry(problem_type).or_default() += 1;
    }

    let mut counts = counts.into_iter().collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
        .into_iter()
        .take(limit)
        .map(|(name, count)| (name.to_owned(), count))
        .collect()
}
