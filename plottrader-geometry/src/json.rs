//! Declarative (de)serialization of [`Plot`] trees.
//!
//! Each node is a `{type, args}` envelope: `type` names the combinator
//! (`line`, `log_line`, `absolute_offset`, `percentage_offset`, `schedule`,
//! `min`, `max`) and `args` carries that combinator's fields, with nested
//! plots recursing through the same envelope shape. `Shape`/`LogShape` are
//! builder-only constructs (see [`Plot::shape`]) and never appear as a
//! `type`: they are lowered to `min` trees of `line`/`log_line` nodes
//! before this module ever sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::GeometryError;
use crate::plot::Plot;
use crate::point::Point;

const KEY_LINE: &str = "line";
const KEY_LOG_LINE: &str = "log_line";
const KEY_ABSOLUTE_OFFSET: &str = "absolute_offset";
const KEY_PERCENTAGE_OFFSET: &str = "percentage_offset";
const KEY_SCHEDULE: &str = "schedule";
const KEY_MIN: &str = "min";
const KEY_MAX: &str = "max";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointDto {
    date: DateTime<Utc>,
    price: f64,
}

impl From<Point> for PointDto {
    fn from(p: Point) -> Self {
        Self { date: p.date, price: p.price }
    }
}

impl From<PointDto> for Point {
    fn from(p: PointDto) -> Self {
        Point::new(p.date, p.price)
    }
}

/// The wire envelope every plot node is wrapped in: `{"type": ..., "args": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineBody {
    p0: PointDto,
    p1: PointDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left_limit: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    right_limit: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OffsetBody {
    value: f64,
    plot: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<DateTime<Utc>>,
    plot: Value,
}

fn err(msg: impl Into<String>) -> GeometryError {
    GeometryError::Json(msg.into())
}

fn envelope(tag: &str, args: Value) -> Value {
    json!({ "type": tag, "args": args })
}

/// Recursively parses a single `{type, args}` plot node.
pub fn parse_plot(value: &Value) -> Result<Plot, GeometryError> {
    let envelope: Envelope = serde_json::from_value(value.clone()).map_err(|e| err(e.to_string()))?;
    let args = envelope.args;
    match envelope.tag.as_str() {
        KEY_LINE => {
            let body: LineBody = serde_json::from_value(args).map_err(|e| err(e.to_string()))?;
            Plot::line(body.p0.into(), body.p1.into(), body.left_limit, body.right_limit)
        }
        KEY_LOG_LINE => {
            let body: LineBody = serde_json::from_value(args).map_err(|e| err(e.to_string()))?;
            Plot::log_line(body.p0.into(), body.p1.into(), body.left_limit, body.right_limit)
        }
        KEY_ABSOLUTE_OFFSET => {
            let body: OffsetBody = serde_json::from_value(args).map_err(|e| err(e.to_string()))?;
            let child = parse_plot(&body.plot)?;
            Ok(Plot::absolute_offset(body.value, child))
        }
        KEY_PERCENTAGE_OFFSET => {
            let body: OffsetBody = serde_json::from_value(args).map_err(|e| err(e.to_string()))?;
            let child = parse_plot(&body.plot)?;
            Ok(Plot::percentage_offset(body.value, child))
        }
        KEY_SCHEDULE => {
            let body: ScheduleBody = serde_json::from_value(args).map_err(|e| err(e.to_string()))?;
            let child = parse_plot(&body.plot)?;
            Ok(Plot::schedule(body.since, body.until, child))
        }
        KEY_MIN => {
            let items = args.as_array().ok_or_else(|| err("min requires an array"))?;
            let children = items.iter().map(parse_plot).collect::<Result<Vec<_>, _>>()?;
            Plot::min(children)
        }
        KEY_MAX => {
            let items = args.as_array().ok_or_else(|| err("max requires an array"))?;
            let children = items.iter().map(parse_plot).collect::<Result<Vec<_>, _>>()?;
            Plot::max(children)
        }
        other => Err(GeometryError::UnknownPlotTag(other.to_string())),
    }
}

/// Recursively encodes a plot tree back into its `{type, args}` envelope form.
pub fn plot_to_value(plot: &Plot) -> Value {
    match plot {
        Plot::Line(line) => {
            envelope(KEY_LINE, line_body(line.p0(), line.p1(), line.left_limit(), line.right_limit()))
        }
        Plot::LogLine(log_line) => {
            envelope(KEY_LOG_LINE, line_body(log_line.p0(), log_line.p1(), log_line.left_limit(), log_line.right_limit()))
        }
        Plot::AbsoluteOffset { value, child } => {
            envelope(KEY_ABSOLUTE_OFFSET, json!({ "value": value, "plot": plot_to_value(child) }))
        }
        Plot::PercentageOffset { value, child } => {
            envelope(KEY_PERCENTAGE_OFFSET, json!({ "value": value, "plot": plot_to_value(child) }))
        }
        Plot::Schedule { since, until, child } => {
            envelope(KEY_SCHEDULE, json!({ "since": since, "until": until, "plot": plot_to_value(child) }))
        }
        Plot::Min(children) => envelope(KEY_MIN, json!(children.iter().map(plot_to_value).collect::<Vec<_>>())),
        Plot::Max(children) => envelope(KEY_MAX, json!(children.iter().map(plot_to_value).collect::<Vec<_>>())),
    }
}

fn line_body(p0: Point, p1: Point, left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> Value {
    json!({
        "p0": PointDto::from(p0),
        "p1": PointDto::from(p1),
        "left_limit": left,
        "right_limit": right,
    })
}

pub fn from_str(s: &str) -> Result<Plot, GeometryError> {
    let value: Value = serde_json::from_str(s).map_err(|e| err(e.to_string()))?;
    parse_plot(&value)
}

pub fn to_string(plot: &Plot) -> Result<String, GeometryError> {
    serde_json::to_string(&plot_to_value(plot)).map_err(|e| err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn round_trips_a_line() {
        let plot = Plot::line(Point::new(d(0), 10.0), Point::new(d(100), 20.0), Some(d(0)), Some(d(100))).unwrap();
        let encoded = to_string(&plot).unwrap();
        let decoded = from_str(&encoded).unwrap();
        assert!((decoded.at(d(50)).unwrap() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn parses_nested_offset_and_schedule() {
        let raw = json!({
            "type": "schedule",
            "args": {
                "since": "2026-01-01T00:00:00Z",
                "until": "2026-02-01T00:00:00Z",
                "plot": {
                    "type": "absolute_offset",
                    "args": {
                        "value": 5.0,
                        "plot": {
                            "type": "line",
                            "args": {
                                "p0": { "date": "2026-01-01T00:00:00Z", "price": 10.0 },
                                "p1": { "date": "2026-01-02T00:00:00Z", "price": 20.0 }
                            }
                        }
                    }
                }
            }
        });
        let plot = parse_plot(&raw).unwrap();
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let v = plot.at(t).unwrap();
        assert!((v - 20.0).abs() < 1e-6);
    }

    #[test]
    fn parses_min_of_two_lines() {
        let raw = json!({
            "type": "min",
            "args": [
                {
                    "type": "line",
                    "args": {
                        "p0": { "date": "2026-01-01T00:00:00Z", "price": 10.0 },
                        "p1": { "date": "2026-01-02T00:00:00Z", "price": 10.0 }
                    }
                },
                {
                    "type": "line",
                    "args": {
                        "p0": { "date": "2026-01-01T00:00:00Z", "price": 5.0 },
                        "p1": { "date": "2026-01-02T00:00:00Z", "price": 5.0 }
                    }
                }
            ]
        });
        let plot = parse_plot(&raw).unwrap();
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert!((plot.at(t).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_envelope_missing_type_or_args() {
        let missing_type = json!({ "args": {} });
        assert!(parse_plot(&missing_type).is_err());

        let missing_args = json!({ "type": "line" });
        assert!(parse_plot(&missing_args).is_err());
    }

    #[test]
    fn rejects_unknown_tags() {
        let raw = json!({ "type": "shape", "args": [] });
        assert!(matches!(parse_plot(&raw).unwrap_err(), GeometryError::UnknownPlotTag(_)));
    }
}
