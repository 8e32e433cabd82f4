//! Complaint records filed with the building and safety department
//!
//! A [`ComplaintCollection`] is the unit of input for every report: the
//! complaint records plus the date the data was pulled (the *cutoff*). Cases
//! still open at the cutoff are right-censored when response times are
//! estimated.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "cutoff": "2014-07-13",
//!   "complaints": [
//!     {
//!       "csr": 123456,
//!       "inspection_district": "1101",
//!       "address": { "house_number": "1200", "street_name": "MAIN", "street_suffix": "ST" },
//!       "date_received": "2013-02-01",
//!       "date_closed": "2013-03-15",
//!       "priority": "HIGH",
//!       "problem_type": "Building without permit",
//!       "area_planning_commission": "Central",
//!       "neighborhood": "Downtown"
//!     }
//!   ]
//! }
//! ```
//!
//! Priorities accept both the tier number (`"1"`, `"2"`, `"3"`) and the
//! department's labels (`"HAZ"`, `"HIGH"`, `"NORM"`).

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

/// Complaint priority tier. Tier 1 is the most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Priority {
    /// Hazardous condition (tier 1)
    #[serde(rename = "1", alias = "HAZ")]
    #[display("1")]
    Hazard,
    /// High priority (tier 2)
    #[serde(rename = "2", alias = "HIGH")]
    #[display("2")]
    High,
    /// Quality-of-life nuisance (tier 3)
    #[serde(rename = "3", alias = "NORM")]
    #[display("3")]
    Normal,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Hazard, Self::High, Self::Normal];

    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Hazard => 1,
            Self::High => 2,
            Self::Normal => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hazard => "Hazard",
            Self::High => "High",
            Self::Normal => "Normal",
        }
    }
}

/// Street address components as recorded by the department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub house_number: Option<String>,
    pub house_fraction: Option<String>,
    pub street_direction: Option<String>,
    pub street_name: Option<String>,
    pub street_suffix: Option<String>,
    pub street_suffix_direction: Option<String>,
    pub zip: Option<String>,
}

impl Address {
    /// Joins the non-blank components into a single line (zip excluded).
    ///
    /// ```
    /// # use civic_analysis::complaint::Address;
    /// let address = Address {
    ///     house_number: Some("1200".into()),
    ///     house_fraction: Some(" ".into()),
    ///     street_direction: Some("W".into()),
    ///     street_name: Some("MAIN".into()),
    ///     street_suffix: Some("ST".into()),
    ///     ..Address::default()
    /// };
    /// assert_eq!(address.full_address(), "1200 W MAIN ST");
    /// ```
    #[must_use]
    pub fn full_address(&self) -> String {
        [
            &self.house_number,
            &self.house_fraction,
            &self.street_direction,
            &self.street_name,
            &self.street_suffix,
            &self.street_suffix_direction,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A single customer service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Customer service record number
    pub csr: u32,
    pub inspection_district: Option<String>,
    #[serde(default)]
    pub address: Address,
    pub date_received: NaiveDate,
    pub date_closed: Option<NaiveDate>,
    pub date_due: Option<NaiveDate>,
    #[serde(default)]
    pub case_flag: bool,
    pub priority: Option<Priority>,
    /// Parcel identification number
    pub parcel_pin: Option<String>,
    pub problem_type: Option<String>,
    /// Area planning commission, the region used in the regional reports
    pub area_planning_commission: Option<String>,
    pub related_case_number: Option<String>,
    pub neighborhood: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Complaint {
    /// A complaint counts as closed once it has a closing date.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.date_closed.is_some()
    }

    #[must_use]
    pub fn full_address(&self) -> String {
        self.address.full_address()
    }

    #[must_use]
    pub fn year_received(&self) -> i32 {
        self.date_received.year()
    }

    /// `(lon, lat)` when both coordinates are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lon?, self.lat?))
    }
}

/// Complaints together with the date the data was pulled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintCollection {
    /// Observation cutoff: open cases are censored at this date
    pub cutoff: NaiveDate,
    pub complaints: Vec<Complaint>,
}

impl ComplaintCollection {
    /// Replaces the cutoff when an override is given.
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: Option<NaiveDate>) -> Self {
        if let Some(cutoff) = cutoff {
            self.cutoff = cutoff;
        }
        self
    }
}
