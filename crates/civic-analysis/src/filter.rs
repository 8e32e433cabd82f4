//! Predicates selecting a slice of the complaint population

use chrono::NaiveDate;

use crate::complaint::{Complaint, Priority};

/// Whether a complaint was closed by the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum CaseState {
    Open,
    Closed,
}

/// Conjunction of optional conditions; an empty filter matches everything.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use civic_analysis::{complaint::Priority, filter::ComplaintFilter};
///
/// let filter = ComplaintFilter::default()
///     .region("Harbor")
///     .priority(Priority::Hazard)
///     .received_since(NaiveDate::from_ymd_opt(2013, 7, 13).unwrap());
/// assert_eq!(filter.region.as_deref(), Some("Harbor"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Received on or after this date
    pub received_since: Option<NaiveDate>,
    /// Received on or before this date
    pub received_until: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub region: Option<String>,
    pub inspection_district: Option<String>,
    pub neighborhood: Option<String>,
    pub state: Option<CaseState>,
    /// Open (or took) strictly longer than this many days
    pub older_than_days: Option<i64>,
}

impl ComplaintFilter {
    #[must_use]
    pub fn received_since(mut self, date: NaiveDate) -> Self {
        self.received_since = Some(date);
        self
    }

    #[must_use]
    pub fn received_until(mut self, date: NaiveDate) -> Self {
        self.received_until = Some(date);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn inspection_district(mut self, district: impl Into<String>) -> Self {
        self.inspection_district = Some(district.into());
        self
    }

    #[must_use]
    pub fn neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: CaseState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn older_than_days(mut self, days: i64) -> Self {
        self.older_than_days = Some(days);
        self
    }

    #[must_use]
    pub fn matches(&self, complaint: &Complaint, cutoff: NaiveDate) -> bool {
        // padding is ignored on both sides, as in `Dimension::key`
        fn eq_opt(want: Option<&str>, have: Option<&str>) -> bool {
            want.is_none_or(|want| have.map(str::trim) == Some(want.trim()))
        }

        self.received_since
            .is_none_or(|since| complaint.date_received >= since)
            && self
                .received_until
                .is_none_or(|until| complaint.date_received <= until)
            && self
                .priority
                .is_none_or(|p| complaint.priority == Some(p))
            && eq_opt(
                self.region.as_deref(),
                complaint.area_planning_commission.as_deref(),
            )
            && eq_opt(
                self.inspection_district.as_deref(),
                complaint.inspection_district.as_deref(),
            )
            && eq_opt(
                self.neighborhood.as_deref(),
                complaint.neighborhood.as_deref(),
            )
            && self.state.is_none_or(|state| match state {
                CaseState::Open => !complaint.is_closed(),
                CaseState::Closed => complaint.is_closed(),
            })
            && self
                .older_than_days
                .is_none_or(|days| complaint.days_since_complaint(cutoff) > days)
    }

    /// Iterates over the complaints matching this filter.
    pub fn apply<'a>(
        &'a self,
        complaints: &'a [Complaint],
        cutoff: NaiveDate,
    ) -> impl Iterator<Item = &'a Complaint> + 'a {
        complaints
            .iter()
            .filter(move |complaint| self.matches(complaint, cutoff))
    }
}
