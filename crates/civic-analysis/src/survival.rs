//! Response-time survival statistics for slices of the complaint population
//!
//! Every estimate in the reports goes through the same three steps:
//!
//! 1. **Slice**: select complaints with a [`ComplaintFilter`] or split them by
//!    a group key ([`Dimension`] or any closure)
//! 2. **Fit**: turn each complaint into an observation (days open, closed?)
//!    and fit a Kaplan-Meier curve to the slice
//! 3. **Summarize**: keep counts, naive means and the KM median / restricted
//!    mean next to the curve in a [`SurvivalSummary`]
//!
//! # Right-Censored Data
//!
//! A complaint still open at the cutoff is right-censored: it has been open
//! for at least the recorded number of days, but its true response time is
//! unknown.
//!
//! ```text
//! Closed:  |----x          (closed after 40 days)
//! Open:    |-------------> (open for 400 days at the cutoff, true time unknown)
//! ```
//!
//! Naive averages ignore this and understate response times, most of all in
//! slices with many long-open cases. The Kaplan-Meier estimates account for
//! it.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use civic_analysis::{
//!     complaint::Complaint, dimension::Dimension, filter::ComplaintFilter,
//!     survival::{SurvivalSummary, SurvivalSummaryMap},
//! };
//!
//! let complaints: Vec<Complaint> = serde_json::from_str(r#"[
//!     {"csr": 1, "date_received": "2014-01-01", "date_closed": "2014-01-11", "area_planning_commission": "Harbor"},
//!     {"csr": 2, "date_received": "2014-01-01", "area_planning_commission": "Harbor"},
//!     {"csr": 3, "date_received": "2014-01-01", "date_closed": "2014-01-21", "area_planning_commission": "Central"}
//! ]"#).unwrap();
//! let cutoff = NaiveDate::from_ymd_opt(2014, 7, 13).unwrap();
//!
//! let harbor = SurvivalSummary::from_slice(&complaints, cutoff, &ComplaintFilter::default().region("Harbor"))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(harbor.count, 2);
//! assert_eq!(harbor.median_km, Some(10.0));
//!
//! let by_region = SurvivalSummaryMap::collect_by_dimension(&complaints, cutoff, Dimension::Region).unwrap();
//! assert_eq!(by_region.map["Central"].median_km, Some(20.0));
//! ```

use std::{collections::BTreeMap, panic, thread};

use chrono::NaiveDate;
use civic_stats::{
    descriptive::DescriptiveStats,
    survival::{InvalidInputError, KaplanMeierCurve, Observation},
};
use serde::Serialize;

use crate::{complaint::Complaint, dimension::Dimension, filter::ComplaintFilter};

/// Survival statistics for a group of observations
#[derive(Debug, Clone, Serialize)]
pub struct SurvivalSummary {
    /// Total number of observations
    pub count: usize,
    /// Number of closed complaints (events observed)
    pub closed_count: usize,
    /// Number of complaints still open at the cutoff
    pub censored_count: usize,
    /// Naive mean of closed complaints only
    pub mean_closed: Option<f64>,
    /// Naive mean over all observations, open ones counted up to the cutoff
    pub mean_all: f64,
    /// Kaplan-Meier median time to response
    pub median_km: Option<f64>,
    /// Kaplan-Meier mean time to response, restricted to the longest observation
    pub restricted_mean_km: f64,
    /// Kaplan-Meier survival curve
    #[serde(skip)]
    pub km_curve: KaplanMeierCurve,
}

impl SurvivalSummary {
    /// Fits the curve and computes the summary for a set of observations.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidInputError`] on an empty input or an invalid
    /// duration.
    pub fn from_observations(data: &[Observation]) -> Result<Self, InvalidInputError> {
        let km_curve = KaplanMeierCurve::fit(data.iter().copied())?;
        let mean_all = DescriptiveStats::new(data.iter().map(|obs| obs.duration))
            .map_or(0.0, |stats| stats.mean);
        let mean_closed = DescriptiveStats::new(
            data.iter()
                .filter(|obs| obs.event_observed)
                .map(|obs| obs.duration),
        )
        .map(|stats| stats.mean);

        Ok(Self {
            count: km_curve.num_observations(),
            closed_count: km_curve.num_events(),
            censored_count: km_curve.num_censored(),
            mean_closed,
            mean_all,
            median_km: km_curve.median(),
            restricted_mean_km: km_curve.restricted_mean(),
            km_curve,
        })
    }

    /// Summarizes the given complaints.
    ///
    /// Complaints with a negative duration are skipped. Returns `Ok(None)`
    /// when nothing is left to estimate from.
    pub fn from_complaints<'a, I>(
        complaints: I,
        cutoff: NaiveDate,
    ) -> Result<Option<Self>, InvalidInputError>
    where
        I: IntoIterator<Item = &'a Complaint>,
    {
        let data = complaints
            .into_iter()
            .filter_map(|complaint| complaint.observation(cutoff))
            .collect::<Vec<_>>();
        if data.is_empty() {
            return Ok(None);
        }
        Self::from_observations(&data).map(Some)
    }

    /// Summarizes the complaints matching `filter`.
    pub fn from_slice(
        complaints: &[Complaint],
        cutoff: NaiveDate,
        filter: &ComplaintFilter,
    ) -> Result<Option<Self>, InvalidInputError> {
        Self::from_complaints(filter.apply(complaints, cutoff), cutoff)
    }

    /// Share of open complaints, in percent.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn censoring_rate(&self) -> f64 {
        100.0 * self.censored_count as f64 / self.count as f64
    }
}

/// Survival summaries keyed by group, in key order.
#[derive(Debug, Clone)]
pub struct SurvivalSummaryMap<K> {
    pub map: BTreeMap<K, SurvivalSummary>,
}

impl<K> SurvivalSummaryMap<K> {
    /// Groups complaints by a custom key and fits each group independently.
    ///
    /// Complaints for which `group` returns `None`, and complaints with a
    /// negative duration, are left out. Groups are fitted in parallel; the
    /// result does not depend on scheduling.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::NaiveDate;
    /// # use civic_analysis::{complaint::Complaint, survival::SurvivalSummaryMap};
    /// # let complaints: Vec<Complaint> = vec![];
    /// # let cutoff = NaiveDate::from_ymd_opt(2014, 7, 13).unwrap();
    /// // Group by priority tier
    /// let stats = SurvivalSummaryMap::collect_by_group(&complaints, cutoff, |c| c.priority).unwrap();
    ///
    /// for (priority, summary) in &stats.map {
    ///     if let Some(median) = summary.median_km {
    ///         println!("Priority {priority}: KM median = {median:.1} days");
    ///     }
    /// }
    /// ```
    pub fn collect_by_group<'a, I, F>(
        complaints: I,
        cutoff: NaiveDate,
        mut group: F,
    ) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = &'a Complaint>,
        F: FnMut(&Complaint) -> Option<K>,
        K: Ord,
    {
        let mut data_map: BTreeMap<K, Vec<Observation>> = BTreeMap::new();

        for complaint in complaints {
            let Some(observation) = complaint.observation(cutoff) else {
                continue;
            };
            if let Some(key) = group(complaint) {
                data_map.entry(key).or_default().push(observation);
            }
        }

        let groups = data_map.len();
        let map = fit_groups(data_map)?;
        tracing::debug!(groups, "fitted survival curves");
        Ok(Self { map })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SurvivalSummaryMap<String> {
    /// Groups complaints by one of the standard reporting dimensions.
    pub fn collect_by_dimension<'a, I>(
        complaints: I,
        cutoff: NaiveDate,
        dimension: Dimension,
    ) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = &'a Complaint>,
    {
        Self::collect_by_group(complaints, cutoff, |complaint| dimension.key(complaint))
    }
}

/// Fits every group on its own scoped thread and collects in key order.
fn fit_groups<K>(
    groups: BTreeMap<K, Vec<Observation>>,
) -> Result<BTreeMap<K, SurvivalSummary>, InvalidInputError>
where
    K: Ord,
{
    thread::scope(|s| {
        let handles = groups
            .into_iter()
            .map(|(key, data)| {
                let handle = s.spawn(move || SurvivalSummary::from_observations(&data));
                (key, handle)
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|(key, handle)| {
                let summary = handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))?;
                Ok((key, summary))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::{
        Priority,
        tests::{complaint, date},
    };

    fn cutoff() -> NaiveDate {
        date("2014-07-13")
    }

    fn sample_complaints() -> Vec<Complaint> {
        let specs = [
            (1, "2014-01-01", Some("2014-01-03"), "Harbor", Priority::Hazard),
            (2, "2014-01-01", None, "Harbor", Priority::Normal),
            (3, "2014-01-01", Some("2014-01-06"), "Harbor", Priority::Hazard),
            (4, "2014-01-01", Some("2014-01-04"), "Central", Priority::Normal),
            (5, "2014-01-01", Some("2014-01-09"), "Central", Priority::High),
            (6, "2014-08-01", None, "Central", Priority::High),
        ];
        specs
            .into_iter()
            .map(|(csr, received, closed, region, priority)| {
                let mut c = complaint(csr, received, closed);
                c.area_planning_commission = Some(region.into());
                c.priority = Some(priority);
                c
            })
            .collect()
    }

    #[test]
    fn test_summary_from_observations() {
        let data = [
            Observation::event(2.0),
            Observation::censored(3.0),
            Observation::event(5.0),
            Observation::censored(8.0),
        ];
        let summary = SurvivalSummary::from_observations(&data).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.closed_count, 2);
        assert_eq!(summary.censored_count, 2);
        assert_eq!(summary.mean_closed, Some(3.5));
        assert_eq!(summary.mean_all, 4.5);
        assert_eq!(summary.median_km, Some(5.0));
        assert_eq!(summary.restricted_mean_km, 5.375);
        assert_eq!(summary.censoring_rate(), 50.0);
    }

    #[test]
    fn test_summary_without_closed_complaints() {
        let data = [Observation::censored(10.0), Observation::censored(20.0)];
        let summary = SurvivalSummary::from_observations(&data).unwrap();
        assert_eq!(summary.mean_closed, None);
        assert_eq!(summary.median_km, None);
        assert_eq!(summary.restricted_mean_km, 20.0);
    }

    #[test]
    fn test_empty_slice_is_no_data() {
        let complaints = sample_complaints();
        let filter = ComplaintFilter::default().region("West Los Angeles");
        assert!(
            SurvivalSummary::from_slice(&complaints, cutoff(), &filter)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_negative_durations_are_skipped() {
        let complaints = sample_complaints();
        // csr 6 was received after the cutoff
        let central = ComplaintFilter::default().region("Central");
        let summary = SurvivalSummary::from_slice(&complaints, cutoff(), &central)
            .unwrap()
            .unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.censored_count, 0);
        assert_eq!(summary.median_km, Some(3.0));
        assert_eq!(summary.restricted_mean_km, 3.0 + 5.0 * 0.5);
    }

    #[test]
    fn test_grouped_fits_match_independent_slices() {
        let complaints = sample_complaints();
        let by_region =
            SurvivalSummaryMap::collect_by_dimension(&complaints, cutoff(), Dimension::Region)
                .unwrap();
        assert_eq!(
            by_region.map.keys().collect::<Vec<_>>(),
            ["Central", "Harbor"]
        );

        for (region, summary) in &by_region.map {
            let filter = ComplaintFilter::default().region(region.clone());
            let independent = SurvivalSummary::from_slice(&complaints, cutoff(), &filter)
                .unwrap()
                .unwrap();
            assert_eq!(summary.km_curve, independent.km_curve);
            assert_eq!(summary.median_km, independent.median_km);
        }
    }

    #[test]
    fn test_collect_by_priority() {
        let complaints = sample_complaints();
        let by_priority =
            SurvivalSummaryMap::collect_by_group(&complaints, cutoff(), |c| c.priority).unwrap();
        assert_eq!(by_priority.len(), 3);
        let hazard = &by_priority.map[&Priority::Hazard];
        assert_eq!(hazard.count, 2);
        assert_eq!(hazard.median_km, Some(2.0));
        assert_eq!(hazard.restricted_mean_km, 2.0 + 3.0 * 0.5);
        // the open Normal complaint keeps that group's median defined by the closed one
        let normal = &by_priority.map[&Priority::Normal];
        assert_eq!(normal.censored_count, 1);
        assert_eq!(normal.median_km, Some(3.0));
    }

    #[test]
    fn test_summary_serializes_without_curve() {
        let summary =
            SurvivalSummary::from_observations(&[Observation::censored(4.0)]).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["median_km"], serde_json::Value::Null);
        assert_eq!(value["restricted_mean_km"], 4.0);
        assert!(value.get("km_curve").is_none());
    }
}
