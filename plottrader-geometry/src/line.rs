use chrono::{DateTime, Utc};

use crate::error::GeometryError;
use crate::point::{Point, time_to_f64};

/// A straight line through two points, `price = slope * t + intercept`,
/// optionally bounded to a `[left_limit, right_limit)` domain (either side
/// may be unbounded). Queries outside the domain return
/// [`GeometryError::OutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    p0: Point,
    p1: Point,
    slope: f64,
    intercept: f64,
    left_limit: Option<DateTime<Utc>>,
    right_limit: Option<DateTime<Utc>>,
}

impl Line {
    pub fn new(
        p0: Point,
        p1: Point,
        left_limit: Option<DateTime<Utc>>,
        right_limit: Option<DateTime<Utc>>,
    ) -> Result<Self, GeometryError> {
        if p0.date == p1.date {
            return Err(GeometryError::EqualEndpoints);
        }
        let (x0, x1) = (time_to_f64(p0.date), time_to_f64(p1.date));
        let slope = (p1.price - p0.price) / (x1 - x0);
        let intercept = p0.price - slope * x0;
        Ok(Self { p0, p1, slope, intercept, left_limit, right_limit })
    }

    pub fn p0(&self) -> Point {
        self.p0
    }

    pub fn p1(&self) -> Point {
        self.p1
    }

    pub fn left_limit(&self) -> Option<DateTime<Utc>> {
        self.left_limit
    }

    pub fn right_limit(&self) -> Option<DateTime<Utc>> {
        self.right_limit
    }

    fn in_domain(&self, t: DateTime<Utc>) -> bool {
        if let Some(left) = self.left_limit {
            if t < left {
                return false;
            }
        }
        if let Some(right) = self.right_limit {
            if t >= right {
                return false;
            }
        }
        true
    }

    pub fn at(&self, t: DateTime<Utc>) -> Result<f64, GeometryError> {
        if !self.in_domain(t) {
            return Err(GeometryError::OutOfRange);
        }
        Ok(self.slope * time_to_f64(t) + self.intercept)
    }
}

/// A log-linear (constant percentage growth) curve through two points with
/// strictly positive prices: `ln(price)` is linear in `t`. Used to peg a
/// value that compounds at a fixed rate rather than moving by a fixed
/// absolute amount per unit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLine {
    p0: Point,
    p1: Point,
    slope: f64,
    intercept: f64,
    left_limit: Option<DateTime<Utc>>,
    right_limit: Option<DateTime<Utc>>,
}

impl LogLine {
    pub fn new(
        p0: Point,
        p1: Point,
        left_limit: Option<DateTime<Utc>>,
        right_limit: Option<DateTime<Utc>>,
    ) -> Result<Self, GeometryError> {
        if p0.date == p1.date {
            return Err(GeometryError::EqualEndpoints);
        }
        if p0.price <= 0.0 || p1.price <= 0.0 {
            return Err(GeometryError::NonPositivePrice);
        }
        let (x0, x1) = (time_to_f64(p0.date), time_to_f64(p1.date));
        let (y0, y1) = (p0.price.ln(), p1.price.ln());
        let slope = (y1 - y0) / (x1 - x0);
        let intercept = y0 - slope * x0;
        Ok(Self { p0, p1, slope, intercept, left_limit, right_limit })
    }

    pub fn p0(&self) -> Point {
        self.p0
    }

    pub fn p1(&self) -> Point {
        self.p1
    }

    pub fn left_limit(&self) -> Option<DateTime<Utc>> {
        self.left_limit
    }

    pub fn right_limit(&self) -> Option<DateTime<Utc>> {
        self.right_limit
    }

    fn in_domain(&self, t: DateTime<Utc>) -> bool {
        if let Some(left) = self.left_limit {
            if t < left {
                return false;
            }
        }
        if let Some(right) = self.right_limit {
            if t >= right {
                return false;
            }
        }
        true
    }

    pub fn at(&self, t: DateTime<Utc>) -> Result<f64, GeometryError> {
        if !self.in_domain(t) {
            return Err(GeometryError::OutOfRange);
        }
        Ok((self.slope * time_to_f64(t) + self.intercept).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn line_interpolates_and_extrapolates() {
        let line = Line::new(Point::new(d(0), 100.0), Point::new(d(100), 200.0), None, None).unwrap();
        assert!((line.at(d(50)).unwrap() - 150.0).abs() < 1e-9);
        assert!((line.at(d(200)).unwrap() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn line_rejects_equal_endpoints() {
        assert_eq!(
            Line::new(Point::new(d(0), 1.0), Point::new(d(0), 2.0), None, None).unwrap_err(),
            GeometryError::EqualEndpoints
        );
    }

    #[test]
    fn line_respects_domain_bounds() {
        // Domain is half-open, [left_limit, right_limit), matching Schedule's
        // own [since, until) convention.
        let line = Line::new(Point::new(d(0), 100.0), Point::new(d(100), 200.0), Some(d(0)), Some(d(100))).unwrap();
        assert!(line.at(d(-1)).is_err());
        assert!(line.at(d(100)).is_err());
        assert!(line.at(d(101)).is_err());
        assert!(line.at(d(0)).is_ok());
        assert!(line.at(d(99)).is_ok());
    }

    #[test]
    fn log_line_compounds_at_constant_rate() {
        let log_line = LogLine::new(Point::new(d(0), 100.0), Point::new(d(100), 200.0), None, None).unwrap();
        let mid = log_line.at(d(50)).unwrap();
        assert!((mid - (100.0 * 200.0f64).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn log_line_rejects_non_positive_prices() {
        assert_eq!(
            LogLine::new(Point::new(d(0), 0.0), Point::new(d(1), 1.0), None, None).unwrap_err(),
            GeometryError::NonPositivePrice
        );
        assert_eq!(
            LogLine::new(Point::new(d(0), -5.0), Point::new(d(1), 1.0), None, None).unwrap_err(),
            GeometryError::NonPositivePrice
        );
    }
}
