//! Report assembly
//!
//! Every report is built from a [`Population`]: the complaints of a
//! collection whose durations are consistent at the cutoff. Each report row
//! is one slice of that population run through the
//! [`survival`](crate::survival) pipeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use civic_stats::{descriptive::DescriptiveStats, survival::InvalidInputError};
use serde::Serialize;

use crate::{
    complaint::{Complaint, ComplaintCollection},
    counts::{self, ByPriority, PriorityCounts, StatusCounts},
    dimension::Dimension,
    filter::{CaseState, ComplaintFilter},
    survival::{SurvivalSummary, SurvivalSummaryMap},
};

/// Complaints usable for reporting at a cutoff date.
///
/// Records whose closing date or cutoff precedes the receipt date are
/// excluded from every report.
#[derive(Debug, Clone)]
pub struct Population<'a> {
    complaints: Vec<&'a Complaint>,
    cutoff: NaiveDate,
    excluded: usize,
}

impl<'a> Population<'a> {
    #[must_use]
    pub fn new(collection: &'a ComplaintCollection) -> Self {
        Self::from_complaints(&collection.complaints, collection.cutoff)
    }

    #[must_use]
    pub fn from_complaints(complaints: &'a [Complaint], cutoff: NaiveDate) -> Self {
        let (complaints, excluded): (Vec<_>, Vec<_>) = complaints
            .iter()
            .partition(|c| c.days_since_complaint(cutoff) >= 0);
        if !excluded.is_empty() {
            tracing::warn!(
                excluded = excluded.len(),
                %cutoff,
                "skipping complaints closed or received after the cutoff date"
            );
        }
        Self {
            complaints,
            cutoff,
            excluded: excluded.len(),
        }
    }

    #[must_use]
    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    /// Number of records left out for inconsistent dates.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.complaints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.complaints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Complaint> + '_ {
        self.complaints.iter().copied()
    }

    /// Complaints matching `filter`.
    pub fn select<'f>(
        &'f self,
        filter: &'f ComplaintFilter,
    ) -> impl Iterator<Item = &'a Complaint> + 'f {
        self.iter()
            .filter(move |complaint| filter.matches(complaint, self.cutoff))
    }

    /// Distinct values of a dimension, in order.
    #[must_use]
    pub fn keys(&self, dimension: Dimension) -> Vec<String> {
        let mut keys = self
            .iter()
            .filter_map(|c| dimension.key(c))
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Slice, fit and summarize.
    pub fn summarize(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Option<SurvivalSummary>, InvalidInputError> {
        SurvivalSummary::from_complaints(self.select(filter), self.cutoff)
    }

    /// KM median per priority tier within a slice.
    pub fn median_by_priority(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<ByPriority<Option<f64>>, InvalidInputError> {
        let by_priority =
            SurvivalSummaryMap::collect_by_group(self.select(filter), self.cutoff, |c| c.priority)?;
        Ok(ByPriority::from_fn(|p| {
            by_priority.map.get(&p).and_then(|s| s.median_km)
        }))
    }

    /// Other complaints filed at the same street address as `complaint`.
    ///
    /// A complaint without an address has no related complaints.
    pub fn related_complaints<'s>(
        &'s self,
        complaint: &'s Complaint,
    ) -> impl Iterator<Item = &'a Complaint> + 's {
        let address = complaint.full_address();
        self.iter().filter(move |other| {
            !address.is_empty() && other.csr != complaint.csr && other.full_address() == address
        })
    }

    /// One summary per value of `dimension`.
    pub fn group_reports(
        &self,
        dimension: Dimension,
    ) -> Result<Vec<GroupReport>, InvalidInputError> {
        let summaries =
            SurvivalSummaryMap::collect_by_dimension(self.iter(), self.cutoff, dimension)?;
        Ok(summaries
            .map
            .into_iter()
            .map(|(key, summary)| GroupReport { key, summary })
            .collect())
    }
}

/// Summary of one group of a dimension.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub key: String,
    #[serde(flatten)]
    pub summary: SurvivalSummary,
}

/// A complaint count split by priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub total: usize,
    #[serde(flatten)]
    pub by_priority: PriorityCounts,
}

impl CountRow {
    fn from_complaints<'a, I>(complaints: I) -> Self
    where
        I: IntoIterator<Item = &'a Complaint>,
    {
        let complaints = complaints.into_iter().collect::<Vec<_>>();
        Self {
            total: complaints.len(),
            by_priority: PriorityCounts::from_complaints(complaints),
        }
    }
}

/// Citywide overview with one row per region.
#[derive(Debug, Clone, Serialize)]
pub struct OverallReport {
    pub cutoff: NaiveDate,
    /// Records left out for inconsistent dates
    pub excluded: usize,
    pub total: CountRow,
    pub open: CountRow,
    pub closed: CountRow,
    pub open_over_one_year: CountRow,
    pub closed_over_one_year: CountRow,
    pub median_wait: Option<f64>,
    pub median_wait_by_priority: ByPriority<Option<f64>>,
    pub regions: Vec<RegionReport>,
}

/// Response times within one area planning commission.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub name: String,
    pub total: usize,
    pub avg_complaints_per_year: Option<f64>,
    pub median_wait: Option<f64>,
    pub median_wait_by_priority: ByPriority<Option<f64>>,
    /// Complaints open, or that took, more than a year
    pub gt_year: usize,
}

impl OverallReport {
    pub fn build(population: &Population<'_>) -> Result<Self, InvalidInputError> {
        let cutoff = population.cutoff();
        let all = ComplaintFilter::default();
        let open = all.clone().state(CaseState::Open);
        let closed = all.clone().state(CaseState::Closed);
        let over_one_year = |state| {
            ComplaintFilter::default()
                .state(state)
                .older_than_days(crate::status::ONE_YEAR_DAYS)
        };

        let span_years = counts::filing_span_years(population.iter(), cutoff);
        let regions = population
            .keys(Dimension::Region)
            .into_iter()
            .map(|name| RegionReport::build(population, name, span_years))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cutoff,
            excluded: population.excluded(),
            total: CountRow::from_complaints(population.select(&all)),
            open: CountRow::from_complaints(population.select(&open)),
            closed: CountRow::from_complaints(population.select(&closed)),
            open_over_one_year: CountRow::from_complaints(
                population.select(&over_one_year(CaseState::Open)),
            ),
            closed_over_one_year: CountRow::from_complaints(
                population.select(&over_one_year(CaseState::Closed)),
            ),
            median_wait: population.summarize(&all)?.and_then(|s| s.median_km),
            median_wait_by_priority: population.median_by_priority(&all)?,
            regions,
        })
    }
}

impl RegionReport {
    fn build(
        population: &Population<'_>,
        name: String,
        span_years: Option<f64>,
    ) -> Result<Self, InvalidInputError> {
        let filter = ComplaintFilter::default().region(name.clone());
        let total = population.select(&filter).count();
        let gt_year = population
            .select(&filter)
            .filter(|c| c.more_than_one_year(population.cutoff()))
            .count();

        Ok(Self {
            name,
            total,
            avg_complaints_per_year: counts::average_filed_per_year(total, span_years),
            median_wait: population.summarize(&filter)?.and_then(|s| s.median_km),
            median_wait_by_priority: population.median_by_priority(&filter)?,
            gt_year,
        })
    }
}

/// Complaint volume and response times of one inspection district.
#[derive(Debug, Clone, Serialize)]
pub struct DistrictReport {
    pub district_number: String,
    pub complaints: usize,
    pub complaints_by_priority: PriorityCounts,
    pub median_wait: Option<f64>,
    pub median_wait_by_priority: ByPriority<Option<f64>>,
    /// KM mean restricted to the longest observed wait
    pub mean_wait: Option<f64>,
}

impl DistrictReport {
    /// One row per district, over complaints received on or after `received_since`.
    pub fn build_all(
        population: &Population<'_>,
        received_since: Option<NaiveDate>,
    ) -> Result<Vec<Self>, InvalidInputError> {
        let window = ComplaintFilter {
            received_since,
            ..ComplaintFilter::default()
        };

        population
            .keys(Dimension::District)
            .into_iter()
            .map(|district_number| -> Result<Self, InvalidInputError> {
                let filter = window.clone().inspection_district(district_number.clone());
                let summary = population.summarize(&filter)?;
                Ok(Self {
                    complaints: population.select(&filter).count(),
                    complaints_by_priority: PriorityCounts::from_complaints(
                        population.select(&filter),
                    ),
                    median_wait: summary.as_ref().and_then(|s| s.median_km),
                    median_wait_by_priority: population.median_by_priority(&filter)?,
                    mean_wait: summary.as_ref().map(|s| s.restricted_mean_km),
                    district_number,
                })
            })
            // districts with no complaints in the window are not reported
            .filter(|report| !matches!(report, Ok(r) if r.complaints == 0))
            .collect()
    }
}

/// Status roll-up of one neighborhood.
#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodReport {
    pub name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub kmf_median_days_to_response: Option<f64>,
}

impl NeighborhoodReport {
    pub fn build_all(population: &Population<'_>) -> Result<Vec<Self>, InvalidInputError> {
        let medians = SurvivalSummaryMap::collect_by_dimension(
            population.iter(),
            population.cutoff(),
            Dimension::Neighborhood,
        )?;

        let mut grouped = BTreeMap::<String, Vec<&Complaint>>::new();
        for complaint in population.iter() {
            if let Some(name) = Dimension::Neighborhood.key(complaint) {
                grouped.entry(name).or_default().push(complaint);
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(name, complaints)| {
                tracing::debug!(neighborhood = %name, "aggregating neighborhood statistics");
                Self {
                    counts: StatusCounts::from_complaints(complaints, population.cutoff()),
                    kmf_median_days_to_response: medians
                        .map
                        .get(&name)
                        .and_then(|s| s.median_km),
                    name,
                }
            })
            .collect())
    }
}

/// A problem type and how often it was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemTypeCount {
    pub problem_type: String,
    pub count: usize,
}

/// Most frequent problem types of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemTypeBreakdown {
    pub region: String,
    pub types: Vec<ProblemTypeCount>,
}

impl ProblemTypeBreakdown {
    #[must_use]
    pub fn build_all(population: &Population<'_>, limit: usize) -> Vec<Self> {
        population
            .keys(Dimension::Region)
            .into_iter()
            .map(|region| {
                let filter = ComplaintFilter::default().region(region.clone());
                let types = counts::top_problem_types(population.select(&filter), limit)
                    .into_iter()
                    .map(|(problem_type, count)| ProblemTypeCount {
                        problem_type,
                        count,
                    })
                    .collect();
                Self { region, types }
            })
            .collect()
    }
}

/// Sanity check of the interval between receipt and due date.
#[derive(Debug, Clone, PartialEq)]
pub struct DueDateSummary {
    /// Statistics of days from receipt to due date; `None` without due dates
    pub stats: Option<DescriptiveStats>,
    /// Number of complaints per days-to-due value
    pub frequencies: BTreeMap<i64, usize>,
}

impl DueDateSummary {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn build(population: &Population<'_>) -> Self {
        let days_to_due = population
            .iter()
            .filter_map(|c| Some((c.date_due? - c.date_received).num_days()))
            .collect::<Vec<_>>();

        let mut frequencies = BTreeMap::new();
        for days in &days_to_due {
            *frequencies.entry(*days).or_default() += 1;
        }

        Self {
            stats: DescriptiveStats::new(days_to_due.iter().map(|d| *d as f64)),
            frequencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::{
        Priority,
        tests::{complaint, date},
    };

    fn collection() -> ComplaintCollection {
        let specs = [
            (1, "2012-01-01", None, "Harbor", "1101", Priority::Hazard),
            (2, "2014-01-01", Some("2014-01-03"), "Harbor", "1101", Priority::Hazard),
            (3, "2014-01-01", Some("2014-01-11"), "Harbor", "1102", Priority::Normal),
            (4, "2013-08-01", Some("2013-08-05"), "Central", "2201", Priority::High),
            (5, "2013-08-01", Some("2013-08-07"), "Central", "2201", Priority::High),
            (6, "2015-01-01", None, "Central", "2201", Priority::High),
        ];
        let complaints = specs
            .into_iter()
            .map(|(csr, received, closed, region, district, priority)| {
                let mut c = complaint(csr, received, closed);
                c.area_planning_commission = Some(region.into());
                c.inspection_district = Some(district.into());
                c.neighborhood = Some(format!("{region} Heights"));
                c.priority = Some(priority);
                c
            })
            .collect();
        ComplaintCollection {
            cutoff: date("2014-07-13"),
            complaints,
        }
    }

    #[test]
    fn test_population_excludes_inconsistent_dates() {
        let collection = collection();
        let population = Population::new(&collection);
        assert_eq!(population.len(), 5);
        assert_eq!(population.excluded(), 1);
        assert_eq!(population.keys(Dimension::Region), ["Central", "Harbor"]);
    }

    #[test]
    fn test_overall_report() {
        let collection = collection();
        let report = OverallReport::build(&Population::new(&collection)).unwrap();
        assert_eq!(report.total.total, 5);
        assert_eq!(report.open.total, 1);
        assert_eq!(report.closed.total, 4);
        assert_eq!(report.open_over_one_year.by_priority.csr1, 1);
        assert_eq!(report.closed_over_one_year.total, 0);
        // durations: 924 (open), 2, 10, 4, 6
        assert_eq!(report.median_wait, Some(6.0));
        assert_eq!(report.median_wait_by_priority.csr1, Some(2.0));
        assert_eq!(report.median_wait_by_priority.csr2, Some(4.0));
        assert_eq!(report.median_wait_by_priority.csr3, Some(10.0));

        let harbor = &report.regions[1];
        assert_eq!(harbor.name, "Harbor");
        assert_eq!(harbor.total, 3);
        assert_eq!(harbor.gt_year, 1);
        assert_eq!(harbor.median_wait, Some(10.0));
        assert!(harbor.avg_complaints_per_year.unwrap() > 0.0);
    }

    #[test]
    fn test_district_report_window() {
        let collection = collection();
        let population = Population::new(&collection);

        let all = DistrictReport::build_all(&population, None).unwrap();
        assert_eq!(
            all.iter().map(|d| d.district_number.as_str()).collect::<Vec<_>>(),
            ["1101", "1102", "2201"]
        );
        let d1101 = &all[0];
        assert_eq!(d1101.complaints, 2);
        assert_eq!(d1101.complaints_by_priority.csr1, 2);
        // one closed after 2 days, one open for 924 days
        assert_eq!(d1101.median_wait, Some(2.0));
        assert_eq!(d1101.mean_wait, Some(2.0 + 922.0 * 0.5));

        let recent = DistrictReport::build_all(&population, Some(date("2013-07-13"))).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].complaints, 1);
        assert_eq!(recent[0].median_wait, Some(2.0));

        let latest = DistrictReport::build_all(&population, Some(date("2014-01-01"))).unwrap();
        assert_eq!(
            latest.iter().map(|d| d.district_number.as_str()).collect::<Vec<_>>(),
            ["1101", "1102"]
        );
    }

    #[test]
    fn test_neighborhood_report() {
        let collection = collection();
        let reports = NeighborhoodReport::build_all(&Population::new(&collection)).unwrap();
        assert_eq!(reports.len(), 2);
        let harbor = &reports[1];
        assert_eq!(harbor.name, "Harbor Heights");
        assert_eq!(harbor.counts.total_complaints, 3);
        assert_eq!(harbor.counts.open_over_one_year, 1);
        assert_eq!(harbor.kmf_median_days_to_response, Some(10.0));

        let value = serde_json::to_value(harbor).unwrap();
        assert_eq!(value["open_complaints"], 1);
        assert_eq!(value["kmf_median_days_to_response"], 10.0);
    }

    #[test]
    fn test_group_reports_by_year() {
        let collection = collection();
        let reports = Population::new(&collection)
            .group_reports(Dimension::Year)
            .unwrap();
        let years = reports.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
        assert_eq!(years, ["2012", "2013", "2014"]);
        assert_eq!(reports[1].summary.median_km, Some(4.0));
        assert_eq!(reports[0].summary.median_km, None);
    }

    #[test]
    fn test_problem_type_breakdown() {
        let mut collection = collection();
        for (c, kind) in collection
            .complaints
            .iter_mut()
            .zip(["Noise", "Noise", "Fence", "Permit", "Permit", "Permit"])
        {
            c.problem_type = Some(kind.into());
        }
        let breakdown = ProblemTypeBreakdown::build_all(&Population::new(&collection), 1);
        assert_eq!(breakdown[0].region, "Central");
        // csr 6 is excluded, leaving two permits
        assert_eq!(
            breakdown[0].types,
            [ProblemTypeCount {
                problem_type: "Permit".into(),
                count: 2
            }]
        );
        assert_eq!(breakdown[1].types[0].problem_type, "Noise");
    }

    #[test]
    fn test_padded_keys_select_their_complaints() {
        let mut collection = collection();
        for c in &mut collection.complaints {
            c.inspection_district = c.inspection_district.take().map(|d| format!("{d} "));
            c.area_planning_commission =
                c.area_planning_commission.take().map(|r| format!(" {r} "));
        }
        let population = Population::new(&collection);

        let districts = DistrictReport::build_all(&population, None).unwrap();
        assert_eq!(
            districts
                .iter()
                .map(|d| (d.district_number.as_str(), d.complaints))
                .collect::<Vec<_>>(),
            [("1101", 2), ("1102", 1), ("2201", 2)]
        );

        let report = OverallReport::build(&population).unwrap();
        let by_region = population.group_reports(Dimension::Region).unwrap();
        assert_eq!(report.regions.len(), by_region.len());
        for (region, group) in report.regions.iter().zip(&by_region) {
            assert_eq!(region.name, group.key);
            assert_eq!(region.total, group.summary.count);
            assert_eq!(region.median_wait, group.summary.median_km);
        }
        assert_eq!(report.regions[1].median_wait, Some(10.0));
    }

    #[test]
    fn test_related_complaints_share_an_address() {
        let mut collection = collection();
        for c in &mut collection.complaints[..3] {
            c.address.house_number = Some("1200".into());
            c.address.street_name = Some("MAIN".into());
        }
        collection.complaints[3].address.street_name = Some("ELM".into());
        let population = Population::new(&collection);

        let related = |i: usize| {
            population
                .related_complaints(&collection.complaints[i])
                .map(|c| c.csr)
                .collect::<Vec<_>>()
        };
        assert_eq!(related(0), [2, 3]);
        assert_eq!(related(2), [1, 2]);
        assert_eq!(related(3), Vec::<u32>::new());
        // no address at all
        assert_eq!(related(4), Vec::<u32>::new());
    }

    #[test]
    fn test_due_date_summary() {
        let mut collection = collection();
        collection.complaints[0].date_due = Some(date("2012-01-31"));
        collection.complaints[1].date_due = Some(date("2014-01-31"));
        collection.complaints[2].date_due = Some(date("2014-01-11"));
        let summary = DueDateSummary::build(&Population::new(&collection));
        let stats = summary.stats.unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.median, 30.0);
        assert_eq!(summary.frequencies, BTreeMap::from([(10, 1), (30, 2)]));
    }
}
