//! Map raw job-board payloads onto [`NewJobPosting`].
//!
//! Every source names its fields differently. Lookups here are lenient:
//! a missing key, a `null`, a non-string value or a blank string all
//! become `None`. Validation of the required fields happens at insert.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::models::NewJobPosting;

/// Normalize one raw posting fetched from `source`.
pub fn normalize_job(raw: &Value, source: &str) -> NewJobPosting {
    let mut job = match source {
        "adzuna" => normalize_adzuna(raw),
        "ziprecruiter" => normalize_ziprecruiter(raw),
        "usajobs" => normalize_usajobs(raw),
        "jobspikr" => normalize_jobspikr(raw),
        _ => normalize_generic(raw),
    };
    job.source = Some(source.to_string());
    job
}

fn normalize_adzuna(raw: &Value) -> NewJobPosting {
    NewJobPosting {
        title: text(raw, &["title"]).unwrap_or_default(),
        company: text(raw, &["company", "display_name"]).unwrap_or_default(),
        location: text(raw, &["location", "display_name"]),
        description: text(raw, &["description"]),
        url: text(raw, &["redirect_url"]),
        posting_date: date(raw, &["created"]),
        ..Default::default()
    }
}

fn normalize_ziprecruiter(raw: &Value) -> NewJobPosting {
    NewJobPosting {
        title: text(raw, &["name"]).unwrap_or_default(),
        company: text(raw, &["hiring_company", "name"]).unwrap_or_default(),
        location: text(raw, &["location"]),
        description: text(raw, &["snippet"]),
        url: text(raw, &["url"]),
        posting_date: date(raw, &["posted_time"]),
        ..Default::default()
    }
}

fn normalize_usajobs(raw: &Value) -> NewJobPosting {
    let descriptor = raw.get("MatchedObjectDescriptor").unwrap_or(raw);

    let description = text(descriptor, &["UserArea", "Details", "JobSummary"])
        .or_else(|| text(descriptor, &["QualificationSummary"]));

    NewJobPosting {
        title: text(descriptor, &["PositionTitle"]).unwrap_or_default(),
        company: text(descriptor, &["OrganizationName"])
            .or_else(|| text(descriptor, &["DepartmentName"]))
            .unwrap_or_default(),
        location: text(descriptor, &["PositionLocationDisplay"]),
        description,
        url: text(descriptor, &["PositionURI"]),
        posting_date: date(descriptor, &["PublicationStartDate"]),
        ..Default::default()
    }
}

fn normalize_jobspikr(raw: &Value) -> NewJobPosting {
    let location = text(raw, &["location"]).or_else(|| {
        let parts: Vec<String> = ["city", "state", "country"]
            .iter()
            .filter_map(|key| text(raw, &[*key]))
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    });

    NewJobPosting {
        title: text(raw, &["job_title"])
            .or_else(|| text(raw, &["title"]))
            .unwrap_or_default(),
        company: text(raw, &["company_name"])
            .or_else(|| text(raw, &["company"]))
            .unwrap_or_default(),
        location,
        description: text(raw, &["job_description"]).or_else(|| text(raw, &["description"])),
        url: text(raw, &["url"]),
        posting_date: date(raw, &["post_date"]).or_else(|| date(raw, &["posting_date"])),
        skills: skills(raw),
        ..Default::default()
    }
}

fn normalize_generic(raw: &Value) -> NewJobPosting {
    NewJobPosting {
        title: text(raw, &["title"]).unwrap_or_default(),
        company: text(raw, &["company"]).unwrap_or_default(),
        location: text(raw, &["location"]),
        description: text(raw, &["description"]),
        url: text(raw, &["url"]),
        posting_date: date(raw, &["posting_date"]),
        skills: skills(raw),
        ..Default::default()
    }
}

/// Parse a posting date in any of the formats the job boards emit.
///
/// Accepts RFC 3339 timestamps, naive ISO date-times (with or without
/// fractional seconds, `T` or space separated) and plain `YYYY-MM-DD`.
pub fn parse_posting_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |value, key| value.get(*key))
}

fn text(raw: &Value, path: &[&str]) -> Option<String> {
    lookup(raw, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date(raw: &Value, path: &[&str]) -> Option<NaiveDate> {
    lookup(raw, path)
        .and_then(Value::as_str)
        .and_then(parse_posting_date)
}

/// Skills given either as a JSON array of strings or a comma-separated string.
fn skills(raw: &Value) -> Option<Vec<String>> {
    let skills: Vec<String> = match raw.get("skills")? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };

    (!skills.is_empty()).then_some(skills)
}
