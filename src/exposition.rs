//! Prometheus-style text exposition parser.
//!
//! Handles the subset of the format needed to ship samples downstream:
//! `# HELP`, `# TYPE` and `name{k="v",...} value` / `name value` lines.
//! Help and type are tracked as a single running context for the whole blob,
//! not per metric family: a directive applies to every following sample until
//! the next directive of the same kind.
//!
//! Parsing never fails. Malformed lines degrade to a label-less record or are
//! skipped when they carry fewer than two fields.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::job::Job;

const DATE_FORMAT: &str = "%m-%d-%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A single `key="value"` pair from a sample's label block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One parsed sample line, stamped with its job and scrape time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Source type of the job that scraped the sample.
    #[serde(rename = "__type")]
    pub job_type: String,
    /// Name of the job that scraped the sample.
    #[serde(rename = "job")]
    pub job_name: String,
    /// Scrape time, `HH:MM:SS`.
    pub time: String,
    /// Scrape date, `MM-DD-YYYY`.
    pub date: String,
    pub metric: String,
    /// Labels in encounter order; repeated keys are kept.
    pub labels: Vec<Label>,
    /// Raw sample value, never parsed as a number.
    pub value: String,
    /// Most recent `# HELP` text seen before this sample.
    pub help: String,
    /// Most recent `# TYPE` seen before this sample.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Running `# HELP` / `# TYPE` state for one parse call.
#[derive(Debug, Default)]
struct ParseContext {
    help: String,
    kind: String,
}

/// Parse an exposition blob, stamping every record with the current local time.
pub fn parse(raw: &str, job: &Job) -> Vec<MetricRecord> {
    parse_at(raw, job, Local::now())
}

/// Parse an exposition blob, stamping every record with `now`.
///
/// Records are returned in line order.
pub fn parse_at<Tz>(raw: &str, job: &Job, now: DateTime<Tz>) -> Vec<MetricRecord>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let date = now.format(DATE_FORMAT).to_string();
    let time = now.format(TIME_FORMAT).to_string();

    let mut ctx = ParseContext::default();
    let mut records = Vec::new();

    for line in raw.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }

        match fields[1] {
            "HELP" => ctx.help = fields.get(3..).unwrap_or_default().join(" "),
            "TYPE" => ctx.kind = fields[fields.len() - 1].to_string(),
            _ => {
                let (metric, labels, value) =
                    split_labeled(line).unwrap_or_else(|| (fields[0], Vec::new(), fields[1]));

                records.push(MetricRecord {
                    job_type: job.kind.clone(),
                    job_name: job.name.clone(),
                    time: time.clone(),
                    date: date.clone(),
                    metric: metric.to_string(),
                    labels,
                    value: value.to_string(),
                    help: ctx.help.clone(),
                    kind: ctx.kind.clone(),
                });
            }
        }
    }

    records
}

/// Split `name{labels} value ...` into its parts.
///
/// The block spans from the first `{` to the last `}`. Returns `None` when the
/// braces are missing or unbalanced, or when no value follows the block.
fn split_labeled(line: &str) -> Option<(&str, Vec<Label>, &str)> {
    let open = line.find('{')?;
    let close = line.rfind('}')?;
    if close < open {
        return None;
    }

    let value = line[close + 1..].split_whitespace().next()?;
    let name = &line[..open];
    let labels = parse_labels(&line[open + 1..close]);

    Some((name, labels, value))
}

/// Parse the inside of a label block. Segments without `=` are dropped.
fn parse_labels(block: &str) -> Vec<Label> {
    block
        .split("\",")
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| Label::new(key, value.replace('"', "")))
        .collect()
}
