use chrono::{DateTime, Utc};

use crate::error::GeometryError;
use crate::line::{Line, LogLine};
use crate::point::Point;

/// A composable price-over-time curve.
///
/// Plots are a tagged sum type rather than a trait object hierarchy: every
/// way of combining curves (offsetting, gating by schedule, taking the
/// envelope of several) is a variant here, and `Plot::at` walks the tree.
/// That keeps the representation serializable and avoids a vtable for what
/// is, in practice, a closed set of combinators.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Line(Line),
    LogLine(LogLine),
    AbsoluteOffset { value: f64, child: Box<Plot> },
    PercentageOffset { value: f64, child: Box<Plot> },
    Schedule { since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>, child: Box<Plot> },
    Min(Vec<Plot>),
    Max(Vec<Plot>),
}

impl Plot {
    pub fn line(
        p0: Point,
        p1: Point,
        left_limit: Option<DateTime<Utc>>,
        right_limit: Option<DateTime<Utc>>,
    ) -> Result<Self, GeometryError> {
        Ok(Self::Line(Line::new(p0, p1, left_limit, right_limit)?))
    }

    pub fn log_line(
        p0: Point,
        p1: Point,
        left_limit: Option<DateTime<Utc>>,
        right_limit: Option<DateTime<Utc>>,
    ) -> Result<Self, GeometryError> {
        Ok(Self::LogLine(LogLine::new(p0, p1, left_limit, right_limit)?))
    }

    pub fn absolute_offset(value: f64, child: Plot) -> Self {
        Self::AbsoluteOffset { value, child: Box::new(child) }
    }

    pub fn percentage_offset(value: f64, child: Plot) -> Self {
        Self::PercentageOffset { value, child: Box::new(child) }
    }

    pub fn schedule(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>, child: Plot) -> Self {
        Self::Schedule { since, until, child: Box::new(child) }
    }

    pub fn min(children: Vec<Plot>) -> Result<Self, GeometryError> {
        if children.is_empty() {
            return Err(GeometryError::EmptyChildren);
        }
        Ok(Self::Min(children))
    }

    pub fn max(children: Vec<Plot>) -> Result<Self, GeometryError> {
        if children.is_empty() {
            return Err(GeometryError::EmptyChildren);
        }
        Ok(Self::Max(children))
    }

    /// Builds a sequence of connected line segments through `points`,
    /// lowering to [`Plot::Min`] over per-segment bounded [`Plot::Line`]s.
    ///
    /// Segment domains only overlap at the shared knot between two
    /// consecutive segments, where both lines evaluate to the same price by
    /// construction, so taking the min (or max, equivalently) of the
    /// in-range segments always yields the single matching segment's value.
    /// This is a deliberate simplification over carrying a dedicated `Shape`
    /// variant: the points are consumed at construction time and never
    /// round-trip through the declarative JSON form.
    pub fn shape(points: Vec<Point>, extend_left: bool, extend_right: bool) -> Result<Self, GeometryError> {
        Self::build_shape(points, extend_left, extend_right, false)
    }

    /// As [`Plot::shape`] but connects points with [`LogLine`] segments.
    pub fn log_shape(points: Vec<Point>, extend_left: bool, extend_right: bool) -> Result<Self, GeometryError> {
        Self::build_shape(points, extend_left, extend_right, true)
    }

    fn build_shape(
        mut points: Vec<Point>,
        extend_left: bool,
        extend_right: bool,
        logarithmic: bool,
    ) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }
        points.sort_by_key(|p| p.date);

        let n = points.len();
        let mut segments = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let left_limit = if i == 0 && extend_left { None } else { Some(points[i].date) };
            let right_limit = if i == n - 2 && extend_right { None } else { Some(points[i + 1].date) };
            let segment = if logarithmic {
                Plot::log_line(points[i], points[i + 1], left_limit, right_limit)?
            } else {
                Plot::line(points[i], points[i + 1], left_limit, right_limit)?
            };
            segments.push(segment);
        }
        Plot::min(segments)
    }

    fn in_schedule(t: DateTime<Utc>, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> bool {
        let after_since = since.map(|s| t >= s).unwrap_or(true);
        let before_until = until.map(|u| t < u).unwrap_or(true);
        after_since && before_until
    }

    /// Evaluates the curve at `t`, returning [`GeometryError::OutOfRange`] if
    /// no leaf in the tree has a value there.
    pub fn at(&self, t: DateTime<Utc>) -> Result<f64, GeometryError> {
        match self {
            Plot::Line(line) => line.at(t),
            Plot::LogLine(log_line) => log_line.at(t),
            Plot::AbsoluteOffset { value, child } => child.at(t).map(|v| v + value),
            Plot::PercentageOffset { value, child } => child.at(t).map(|v| v * (1.0 + value)),
            Plot::Schedule { since, until, child } => {
                if Self::in_schedule(t, *since, *until) {
                    child.at(t)
                } else {
                    Err(GeometryError::OutOfRange)
                }
            }
            Plot::Min(children) => fold_children(children, t, f64::min),
            Plot::Max(children) => fold_children(children, t, f64::max),
        }
    }
}

fn fold_children(children: &[Plot], t: DateTime<Utc>, combine: fn(f64, f64) -> f64) -> Result<f64, GeometryError> {
    let mut acc: Option<f64> = None;
    for child in children {
        if let Ok(v) = child.at(t) {
            acc = Some(match acc {
                Some(cur) => combine(cur, v),
                None => v,
            });
        }
    }
    acc.ok_or(GeometryError::OutOfRange)
}
