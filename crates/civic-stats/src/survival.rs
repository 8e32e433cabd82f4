//! Kaplan-Meier survival estimation for right-censored durations.
//!
//! An [`Observation`] is a duration paired with a flag telling whether the end
//! event was witnessed. Observations whose end event was not witnessed are
//! right-censored: the true duration is only known to be at least as long as
//! the recorded one.
//!
//! [`KaplanMeierCurve::fit`] validates a population of observations and
//! computes the product-limit estimate of the survival function. The curve
//! then answers the usual questions: the survival probability at a time, the
//! median survival time and the restricted mean survival time.
//!
//! ```text
//! S(t)
//! 1.0 |-----+
//!     |     |
//! 0.75|     +--------+
//!     |              |
//! 0.375              +-------...
//!     +-----+--------+-------+--> t
//!     0     2        5       8 (horizon)
//! ```
//!
//! # Examples
//!
//! ```
//! use civic_stats::survival::{KaplanMeierCurve, Observation};
//!
//! let curve = KaplanMeierCurve::fit([
//!     Observation::event(2.0),
//!     Observation::censored(3.0),
//!     Observation::event(5.0),
//!     Observation::censored(8.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(curve.survival_at(4.0), 0.75);
//! assert_eq!(curve.median(), Some(5.0));
//! assert_eq!(curve.restricted_mean(), 5.375);
//! ```

/// Slack used when comparing a survival level against a threshold.
///
/// Running products such as `2/3 * 3/4` land one ulp away from the exact
/// value; the threshold comparison must not depend on that rounding.
const SURVIVAL_TOLERANCE: f64 = 1e-12;

/// A single time-to-event observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Elapsed time from the start event to the end event or to the cutoff.
    pub duration: f64,
    /// `true` if the end event was witnessed, `false` if right-censored.
    pub event_observed: bool,
}

impl Observation {
    #[must_use]
    pub const fn new(duration: f64, event_observed: bool) -> Self {
        Self {
            duration,
            event_observed,
        }
    }

    /// An observation whose end event was witnessed at `duration`.
    #[must_use]
    pub const fn event(duration: f64) -> Self {
        Self::new(duration, true)
    }

    /// An observation still open at `duration` (right-censored).
    #[must_use]
    pub const fn censored(duration: f64) -> Self {
        Self::new(duration, false)
    }
}

impl From<(f64, bool)> for Observation {
    fn from((duration, event_observed): (f64, bool)) -> Self {
        Self::new(duration, event_observed)
    }
}

/// Error returned when a population cannot be fitted.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidInputError {
    #[display("cannot fit a survival curve to an empty sample")]
    EmptySample,
    #[display("observation #{index} has a negative duration ({duration})")]
    NegativeDuration { index: usize, duration: f64 },
    #[display("observation #{index} has a non-finite duration ({duration})")]
    NonFiniteDuration { index: usize, duration: f64 },
}

/// A validated, duration-ordered population of observations.
///
/// Construction is the only place where observations are checked; a `Sample`
/// is never empty and holds only finite, non-negative durations.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    observations: Vec<Observation>,
}

impl Sample {
    /// Validates and sorts observations.
    ///
    /// Observations sharing a duration are grouped by value, so the input
    /// order never influences the fitted curve.
    pub fn new<I, O>(observations: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Observation>,
    {
        let mut observations = observations
            .into_iter()
            .map(Into::into)
            .collect::<Vec<Observation>>();
        if observations.is_empty() {
            return Err(InvalidInputError::EmptySample);
        }

        for (index, obs) in observations.iter_mut().enumerate() {
            let duration = obs.duration;
            if !duration.is_finite() {
                return Err(InvalidInputError::NonFiniteDuration { index, duration });
            }
            if duration < 0.0 {
                return Err(InvalidInputError::NegativeDuration { index, duration });
            }
            // fold -0.0 into 0.0 so both land in the same tie group
            obs.duration = duration + 0.0;
        }

        observations.sort_by(|a, b| a.duration.total_cmp(&b.duration));
        Ok(Self { observations })
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the sample holds no observations; `false` for any sample
    /// returned by [`Sample::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Largest observed duration, event or censored.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.observations.last().map_or(0.0, |obs| obs.duration)
    }
}

/// One drop of the survival step function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Distinct duration at which at least one event was observed.
    pub time: f64,
    /// Survival probability from this time up to the next breakpoint.
    pub survival: f64,
    /// Observations with duration `>= time`.
    pub at_risk: usize,
    /// Events observed exactly at `time`.
    pub events: usize,
    /// Censored observations recorded exactly at `time`.
    pub censored: usize,
}

/// Kaplan-Meier estimate of a survival function.
///
/// The curve is a right-continuous step function: `S(t) = 1.0` before the
/// first breakpoint, the breakpoint's survival level from its time up to the
/// next breakpoint, and the last level beyond the final breakpoint. It never
/// extrapolates below the last level, even when the longest observation is
/// censored.
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    breakpoints: Vec<Breakpoint>,
    horizon: f64,
    num_observations: usize,
    num_events: usize,
}

impl KaplanMeierCurve {
    /// Validates the observations and fits the product-limit estimator.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if there are no observations or if any
    /// duration is negative, NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use civic_stats::survival::{InvalidInputError, KaplanMeierCurve, Observation};
    /// let curve = KaplanMeierCurve::fit([(5.0, true)]).unwrap();
    /// assert_eq!(curve.breakpoints().len(), 1);
    /// assert_eq!(curve.median(), Some(5.0));
    ///
    /// let empty: [Observation; 0] = [];
    /// assert_eq!(KaplanMeierCurve::fit(empty), Err(InvalidInputError::EmptySample));
    /// ```
    pub fn fit<I, O>(observations: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Observation>,
    {
        Ok(Self::from_sample(&Sample::new(observations)?))
    }

    /// Fits the product-limit estimator over an already validated sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sample(sample: &Sample) -> Self {
        let data = sample.observations();
        let mut breakpoints = vec![];
        let mut current_survival = 1.0;
        let mut at_risk = data.len();
        let mut num_events = 0;

        for group in data.chunk_by(|a, b| a.duration.total_cmp(&b.duration).is_eq()) {
            let events = group.iter().filter(|obs| obs.event_observed).count();
            let censored = group.len() - events;

            if events > 0 {
                // subtract in integers first so that d == n gives exactly 0.0
                current_survival *= (at_risk - events) as f64 / at_risk as f64;
                breakpoints.push(Breakpoint {
                    time: group[0].duration,
                    survival: current_survival,
                    at_risk,
                    events,
                    censored,
                });
                num_events += events;
            }

            at_risk -= group.len();
        }

        Self {
            breakpoints,
            horizon: sample.horizon(),
            num_observations: data.len(),
            num_events,
        }
    }

    /// Drops of the step function, ordered by time.
    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Largest observed duration in the fitted sample.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    #[must_use]
    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.num_events
    }

    #[must_use]
    pub fn num_censored(&self) -> usize {
        self.num_observations - self.num_events
    }

    /// Survival level after the last breakpoint (`1.0` if no event was observed).
    #[must_use]
    pub fn final_survival(&self) -> f64 {
        self.breakpoints.last().map_or(1.0, |bp| bp.survival)
    }

    /// Returns the survival probability at `time`.
    ///
    /// `1.0` before the first event, the last level after the final event.
    ///
    /// # Examples
    ///
    /// ```
    /// # use civic_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::fit([(10.0, true), (20.0, true)]).unwrap();
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0);
    /// assert_eq!(curve.survival_at(10.0), 0.5);
    /// assert_eq!(curve.survival_at(25.0), 0.0);
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        let idx = self.breakpoints.partition_point(|bp| bp.time <= time);
        match idx {
            0 => 1.0,
            _ => self.breakpoints[idx - 1].survival,
        }
    }

    /// Returns the smallest breakpoint time at which survival is `<= level`.
    ///
    /// `None` if the curve never drops that far within the observed data.
    #[must_use]
    pub fn time_at_survival(&self, level: f64) -> Option<f64> {
        let threshold = level + SURVIVAL_TOLERANCE;
        let idx = self
            .breakpoints
            .partition_point(|bp| bp.survival > threshold);
        self.breakpoints.get(idx).map(|bp| bp.time)
    }

    /// Returns the median survival time.
    ///
    /// This is the smallest time at which the survival probability is at or
    /// below 50%. When heavy censoring keeps survival above 50% up to the
    /// horizon the median is undefined and `None` is returned; callers must
    /// not treat that as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use civic_stats::survival::KaplanMeierCurve;
    /// let all_open = KaplanMeierCurve::fit([(10.0, false), (20.0, false)]).unwrap();
    /// assert_eq!(all_open.median(), None);
    /// ```
    #[must_use]
    pub fn median(&self) -> Option<f64> {
        self.time_at_survival(0.5)
    }

    /// Returns the restricted mean survival time.
    ///
    /// The area under the step function from `t = 0` up to the horizon (the
    /// longest observed duration), accumulated as a left Riemann sum: every
    /// interval contributes its width times the level holding at its left
    /// end. Nothing is extrapolated past the horizon, so the value
    /// understates the true mean whenever the curve does not reach zero.
    ///
    /// A sample whose durations are all zero has no area and yields `0.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use civic_stats::survival::KaplanMeierCurve;
    /// let single = KaplanMeierCurve::fit([(5.0, true)]).unwrap();
    /// assert_eq!(single.restricted_mean(), 5.0);
    ///
    /// let all_open = KaplanMeierCurve::fit([(10.0, false), (20.0, false), (30.0, false)]).unwrap();
    /// assert_eq!(all_open.restricted_mean(), 30.0);
    /// ```
    #[must_use]
    pub fn restricted_mean(&self) -> f64 {
        let (area, last_time, last_survival) = self.breakpoints.iter().fold(
            (0.0, 0.0, 1.0),
            |(area, prev_time, prev_survival), bp| {
                (
                    area + (bp.time - prev_time) * prev_survival,
                    bp.time,
                    bp.survival,
                )
            },
        );
        area + (self.horizon - last_time) * last_survival
    }
}
