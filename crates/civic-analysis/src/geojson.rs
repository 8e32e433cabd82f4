//! GeoJSON export of long-running complaints for map display

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    complaint::{Complaint, Priority},
    filter::{CaseState, ComplaintFilter},
    report::Population,
    status::ONE_YEAR_DAYS,
};

const DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Point,
    pub properties: FeatureProperties,
}

/// `[lon, lat]` position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Point {
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    pub address: String,
    pub csr: u32,
    /// Receipt date, e.g. `"July 4, 2013"`
    pub date: String,
    /// Closing date in the same format; `null` while open
    pub closed: Option<String>,
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
    pub priority: Option<Priority>,
}

impl Feature {
    /// `None` for complaints without coordinates.
    #[must_use]
    pub fn from_complaint(complaint: &Complaint) -> Option<Self> {
        let (lon, lat) = complaint.coordinates()?;
        Some(Self {
            geometry: Point {
                coordinates: [lon, lat],
            },
            properties: FeatureProperties {
                address: complaint.full_address(),
                csr: complaint.csr,
                date: format_date(complaint.date_received),
                closed: complaint.date_closed.map(format_date),
                problem_type: complaint.problem_type.clone(),
                priority: complaint.priority,
            },
        })
    }
}

impl FeatureCollection {
    /// Complaints in `state` that went more than a year without resolution.
    #[must_use]
    pub fn older_than_one_year(population: &Population<'_>, state: CaseState) -> Self {
        let filter = ComplaintFilter::default()
            .state(state)
            .older_than_days(ONE_YEAR_DAYS);
        let features = population
            .select(&filter)
            .filter_map(Feature::from_complaint)
            .collect::<Vec<_>>();
        tracing::debug!(features = features.len(), %state, "built feature collection");
        Self { features }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::{
        ComplaintCollection,
        tests::{complaint, date},
    };

    #[test]
    fn test_feature_wire_format() {
        let mut c = complaint(31, "2013-07-04", Some("2014-07-10"));
        c.lat = Some(34.05);
        c.lon = Some(-118.25);
        c.problem_type = Some("Fence".into());
        c.priority = Some(Priority::Normal);
        c.address.house_number = Some("10".into());
        c.address.street_name = Some("ELM".into());

        let value = serde_json::to_value(Feature::from_complaint(&c).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-118.25, 34.05] },
                "properties": {
                    "address": "10 ELM",
                    "csr": 31,
                    "date": "July 4, 2013",
                    "closed": "July 10, 2014",
                    "type": "Fence",
                    "priority": "3"
                }
            })
        );
    }

    #[test]
    fn test_collection_selects_old_cases_with_coordinates() {
        let located = |mut c: Complaint| {
            c.lat = Some(34.0);
            c.lon = Some(-118.0);
            c
        };
        let collection = ComplaintCollection {
            cutoff: date("2014-07-13"),
            complaints: vec![
                located(complaint(1, "2012-01-01", None)),
                located(complaint(2, "2014-01-01", None)),
                complaint(3, "2012-01-01", None),
                located(complaint(4, "2012-01-01", Some("2013-06-01"))),
            ],
        };
        let population = Population::new(&collection);

        let open = FeatureCollection::older_than_one_year(&population, CaseState::Open);
        assert_eq!(open.features.len(), 1);
        assert_eq!(open.features[0].properties.csr, 1);
        assert_eq!(open.features[0].properties.closed, None);

        let closed = FeatureCollection::older_than_one_year(&population, CaseState::Closed);
        assert_eq!(closed.features.len(), 1);
        assert_eq!(closed.features[0].properties.csr, 4);

        let value = serde_json::to_value(&closed).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
    }
}
