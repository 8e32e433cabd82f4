//! Statistical building blocks for complaint response-time reporting.
//!
//! - [`survival`]: Kaplan-Meier estimation for right-censored durations, with
//!   median and restricted mean survival times
//! - [`descriptive`]: plain descriptive statistics (mean, median, spread)
//!
//! Both modules are pure: every call works on its own input and returns an
//! owned result, so independent fits can run on separate threads freely.
//!
//! # Examples
//!
//! ## Fitting a survival curve
//!
//! ```
//! use civic_stats::survival::KaplanMeierCurve;
//!
//! // (days open, closed?)
//! let data = [(10.0, true), (20.0, false), (30.0, true)];
//! let curve = KaplanMeierCurve::fit(data).unwrap();
//! assert_eq!(curve.median(), Some(30.0));
//! ```
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use civic_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
pub mod survival;
