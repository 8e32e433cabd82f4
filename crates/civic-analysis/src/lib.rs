//! Response-time analysis of building and safety complaints
//!
//! This crate turns a [`complaint::ComplaintCollection`] (complaint records
//! plus the date the data was pulled) into the report rows shown by the
//! `civic` command line tool.
//!
//! # Overview
//!
//! ## Complaint Status
//!
//! Derived per-complaint fields at the cutoff date:
//!
//! 1. **Load Complaints** ([`complaint::ComplaintCollection`]): records and cutoff
//! 2. **Derive Status** ([`status::ComplaintStatus`]): days open, age flags,
//!    days past due
//!
//! ## Response-Time Reports
//!
//! Open complaints are right-censored, so response times are estimated with
//! Kaplan-Meier curves rather than naive averages:
//!
//! 1. **Select Population** ([`report::Population`]): drop records with
//!    inconsistent dates
//! 2. **Slice** ([`filter::ComplaintFilter`], [`dimension::Dimension`]): pick a
//!    region, district, priority tier or receipt window
//! 3. **Fit and Summarize** ([`survival::SurvivalSummary`],
//!    [`survival::SurvivalSummaryMap`]): KM median and restricted mean per slice
//! 4. **Assemble** ([`report`]): overall, regional, district, neighborhood and
//!    per-year rows; [`counts`] supplies the plain tallies
//!
//! ## Map Export
//!
//! [`geojson::FeatureCollection`] lists complaints unresolved for more than a
//! year, with their coordinates.
//!
//! # Examples
//!
//! ```
//! use civic_analysis::{
//!     complaint::ComplaintCollection,
//!     report::{OverallReport, Population},
//! };
//!
//! let collection: ComplaintCollection = serde_json::from_str(r#"{
//!     "cutoff": "2014-07-13",
//!     "complaints": [
//!         {"csr": 1, "date_received": "2014-01-01", "date_closed": "2014-01-11", "priority": "HAZ", "area_planning_commission": "Harbor"},
//!         {"csr": 2, "date_received": "2014-01-01", "priority": "NORM", "area_planning_commission": "Harbor"}
//!     ]
//! }"#).unwrap();
//!
//! let report = OverallReport::build(&Population::new(&collection)).unwrap();
//! assert_eq!(report.total.total, 2);
//! assert_eq!(report.open.by_priority.csr3, 1);
//! assert_eq!(report.median_wait, Some(10.0));
//! assert_eq!(report.regions[0].name, "Harbor");
//! ```

pub mod complaint;
pub mod counts;
pub mod dimension;
pub mod filter;
pub mod geojson;
pub mod report;
pub mod status;
pub mod survival;
