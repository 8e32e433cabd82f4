//! Grouping dimensions for sliced reports

use crate::complaint::Complaint;

/// Attribute used to split the complaint population into groups.
///
/// Parses case-insensitively from its variant name, e.g. `"district"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::FromStr, derive_more::Display,
)]
pub enum Dimension {
    /// Area planning commission
    Region,
    /// Inspection district number
    District,
    Neighborhood,
    /// Priority tier
    Priority,
    /// Year the complaint was received
    Year,
    /// Problem type as recorded by the department
    Problem,
}

impl Dimension {
    /// Group key of `complaint`, or `None` when the attribute is missing.
    ///
    /// ```
    /// # use civic_analysis::{complaint::Complaint, dimension::Dimension};
    /// let complaint: Complaint = serde_json::from_str(
    ///     r#"{"csr": 1, "date_received": "2013-05-01", "priority": "HAZ"}"#,
    /// ).unwrap();
    /// assert_eq!(Dimension::Year.key(&complaint).as_deref(), Some("2013"));
    /// assert_eq!(Dimension::Priority.key(&complaint).as_deref(), Some("1"));
    /// assert_eq!(Dimension::Region.key(&complaint), None);
    /// ```
    #[must_use]
    pub fn key(self, complaint: &Complaint) -> Option<String> {
        match self {
            Self::Region => complaint.area_planning_commission.clone(),
            Self::District => complaint.inspection_district.clone(),
            Self::Neighborhood => complaint.neighborhood.clone(),
            Self::Priority => complaint.priority.map(|p| p.to_string()),
            Self::Year => Some(complaint.year_received().to_string()),
            Self::Problem => complaint.problem_type.clone(),
        }
        .map(|key| key.trim().to_owned())
        .filter(|key| !key.is_empty())
    }

    /// Column header used in tables and CSV exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Region => "Region",
            Self::District => "District",
            Self::Neighborhood => "Neighborhood",
            Self::Priority => "Priority",
            Self::Year => "Year",
            Self::Problem => "Problem type",
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

    #[test]
    fn test_blank_keys_are_missing() {
        let mut c = complaint(1, "2014-01-01", None);
        c.inspection_district = Some("  ".into());
        c.neighborhood = Some(" Venice ".into());
        assert_eq!(Dimension::District.key(&c), None);
        assert_eq!(Dimension::Neighborhood.key(&c).as_deref(), Some("Venice"));
    }

    #[test]
    fn test_priority_and_year_keys() {
        let mut c = complaint(1, "2012-12-31", Some("2013-01-02"));
        c.priority = Some(Priority::Normal);
        assert_eq!(Dimension::Priority.key(&c).as_deref(), Some("3"));
        assert_eq!(Dimension::Year.key(&c).as_deref(), Some("2012"));
        assert_eq!(c.date_received, date("2012-12-31"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("district".parse::<Dimension>().unwrap(), Dimension::District);
        assert_eq!("YEAR".parse::<Dimension>().unwrap(), Dimension::Year);
        assert!("county".parse::<Dimension>().is_err());
    }
}
