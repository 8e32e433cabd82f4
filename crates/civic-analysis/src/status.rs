//! Derived status fields of a complaint at a given cutoff date
//!
//! Every derived value depends on the cutoff: a complaint still open at the
//! cutoff is aged up to that date, a closed one up to its closing date.
//!
//! ```text
//! received          closed                     cutoff
//!    |----------------x                           |     closed: event observed
//!    |------------------------------------------->|     open: censored at cutoff
//! ```

use chrono::NaiveDate;
use civic_stats::survival::Observation;
use serde::Serialize;

use crate::complaint::Complaint;

/// Age thresholds (in days) reported as `gt_<n>_days` flags.
pub const AGE_THRESHOLDS: [i64; 3] = [30, 90, 180];

/// Age (in days) past which a complaint counts as "more than one year" old.
pub const ONE_YEAR_DAYS: i64 = 365;

impl Complaint {
    /// Closing date, or the cutoff for complaints still open.
    #[must_use]
    pub fn end_date(&self, cutoff: NaiveDate) -> NaiveDate {
        self.date_closed.unwrap_or(cutoff)
    }

    /// Days from receipt until closure, or until the cutoff if still open.
    ///
    /// Negative when the record is inconsistent (closed, or received, after
    /// the cutoff or before it was received).
    #[must_use]
    pub fn days_since_complaint(&self, cutoff: NaiveDate) -> i64 {
        (self.end_date(cutoff) - self.date_received).num_days()
    }

    /// Days past the due date at closure (or at the cutoff), if overdue.
    #[must_use]
    pub fn days_past_due(&self, cutoff: NaiveDate) -> Option<i64> {
        let due = self.date_due?;
        let days = (self.end_date(cutoff) - due).num_days();
        (days > 0).then_some(days)
    }

    /// Whether the complaint has been (or was) open for more than a year.
    #[must_use]
    pub fn more_than_one_year(&self, cutoff: NaiveDate) -> bool {
        self.days_since_complaint(cutoff) > ONE_YEAR_DAYS
    }

    /// Time-to-resolution observation for survival analysis.
    ///
    /// `None` for records with a negative duration; those are data entry
    /// errors and are left out of every estimate.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn observation(&self, cutoff: NaiveDate) -> Option<Observation> {
        let days = self.days_since_complaint(cutoff);
        (days >= 0).then(|| Observation::new(days as f64, self.is_closed()))
    }
}

/// Status fields derived from a complaint and the cutoff date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplaintStatus {
    pub days_since_complaint: i64,
    pub is_closed: bool,
    pub gt_30_days: bool,
    pub gt_90_days: bool,
    pub gt_180_days: bool,
    pub more_than_one_year: bool,
    pub past_due_date: bool,
    pub days_past_due_date: Option<i64>,
}

impl ComplaintStatus {
    #[must_use]
    pub fn new(complaint: &Complaint, cutoff: NaiveDate) -> Self {
        let days = complaint.days_since_complaint(cutoff);
        let [gt_30_days, gt_90_days, gt_180_days] = AGE_THRESHOLDS.map(|n| days > n);
        let days_past_due_date = complaint.days_past_due(cutoff);
        Self {
            days_since_complaint: days,
            is_closed: complaint.is_closed(),
            gt_30_days,
            gt_90_days,
            gt_180_days,
            more_than_one_year: days > ONE_YEAR_DAYS,
            past_due_date: days_past_due_date.is_some(),
            days_past_due_date,
        }
    }
}

/// A complaint serialized together with its derived status.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedComplaint<'a> {
    #[serde(flatten)]
    pub complaint: &'a Complaint,
    pub full_address: String,
    #[serde(flatten)]
    pub status: ComplaintStatus,
    /// CSR numbers of other complaints at the same address, when looked up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_complaints: Option<Vec<u32>>,
}

impl<'a> AnnotatedComplaint<'a> {
    #[must_use]
    pub fn new(complaint: &'a Complaint, cutoff: NaiveDate) -> Self {
        Self {
            complaint,
            full_address: complaint.full_address(),
            status: ComplaintStatus::new(complaint, cutoff),
            related_complaints: None,
        }
    }

    #[must_use]
    pub fn with_related_complaints(mut self, csrs: Vec<u32>) -> Self {
        self.related_complaints = Some(csrs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::tests::{complaint, date};

    #[test]
    fn test_open_complaint_is_aged_to_cutoff() {
        let c = complaint(1, "2013-07-13", None);
        let status = ComplaintStatus::new(&c, date("2014-07-13"));
        assert_eq!(status.days_since_complaint, 365);
        assert!(!status.is_closed);
        assert!(status.gt_30_days && status.gt_90_days && status.gt_180_days);
        // strictly greater than 365 days
        assert!(!status.more_than_one_year);
    }

    #[test]
    fn test_closed_complaint_uses_closing_date() {
        let c = complaint(1, "2013-01-01", Some("2013-03-02"));
        let status = ComplaintStatus::new(&c, date("2014-07-13"));
        assert_eq!(status.days_since_complaint, 60);
        assert!(status.is_closed);
        assert!(status.gt_30_days);
        assert!(!status.gt_90_days);
        assert_eq!(
            c.observation(date("2014-07-13")),
            Some(Observation::event(60.0))
        );
    }

    #[test]
    fn test_past_due() {
        let mut c = complaint(1, "2014-01-01", Some("2014-02-10"));
        c.date_due = Some(date("2014-01-31"));
        let status = ComplaintStatus::new(&c, date("2014-07-13"));
        assert!(status.past_due_date);
        assert_eq!(status.days_past_due_date, Some(10));

        c.date_closed = Some(date("2014-01-31"));
        assert_eq!(c.days_past_due(date("2014-07-13")), None);

        c.date_closed = None;
        assert_eq!(c.days_past_due(date("2014-02-05")), Some(5));
    }

    #[test]
    fn test_negative_duration_has_no_observation() {
        let c = complaint(1, "2014-08-01", None);
        let cutoff = date("2014-07-13");
        assert!(c.days_since_complaint(cutoff) < 0);
        assert_eq!(c.observation(cutoff), None);

        let open = complaint(2, "2014-07-01", None);
        assert_eq!(open.observation(cutoff), Some(Observation::censored(12.0)));
    }

    #[test]
    fn test_annotated_complaint_flattens_status() {
        let c = complaint(7, "2014-07-01", None);
        let value = serde_json::to_value(AnnotatedComplaint::new(&c, date("2014-07-13"))).unwrap();
        assert_eq!(value["csr"], 7);
        assert_eq!(value["days_since_complaint"], 12);
        assert_eq!(value["is_closed"], false);
        assert_eq!(value["days_past_due_date"], serde_json::Value::Null);
        assert!(value.get("related_complaints").is_none());

        let with_related = AnnotatedComplaint::new(&c, date("2014-07-13"))
            .with_related_complaints(vec![3, 9]);
        let value = serde_json::to_value(with_related).unwrap();
        assert_eq!(value["related_complaints"], serde_json::json!([3, 9]));
    }
}
