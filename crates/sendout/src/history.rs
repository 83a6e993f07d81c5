//! Message history reporting: filtering, grouping into sendouts, and export.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use whatsapp_api::MessageRecord;

/// Statuses shown in the per-status breakdown, in display order.
pub const STATUS_BUCKETS: [&str; 5] = ["sent", "delivered", "read", "pending", "failed"];

/// Default gap (seconds) that separates two sendouts.
pub const DEFAULT_GROUP_THRESHOLD_SECS: i64 = 60;

const CSV_HEADERS: [&str; 6] = ["Created", "Phone", "Status", "Type", "Template", "External ID"];

/// Parse a message timestamp. Accepts RFC 3339 and naive ISO timestamps
/// (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn created_at(record: &MessageRecord) -> Option<DateTime<Utc>> {
    record.created_at.as_deref().and_then(parse_timestamp)
}

fn lowercase_status(record: &MessageRecord) -> String {
    record.status.as_deref().unwrap_or_default().to_lowercase()
}

/// History filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Compared case-insensitively.
    pub status: Option<String>,
    /// Exact template name.
    pub template: Option<String>,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &MessageRecord) -> bool {
        if let Some(status) = &self.status {
            if lowercase_status(record) != status.to_lowercase() {
                return false;
            }
        }
        if let Some(template) = &self.template {
            if record.template_name.as_deref() != Some(template.as_str()) {
                return false;
            }
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        let Some(day) = created_at(record).map(|ts| ts.date_naive()) else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }

    pub fn apply(&self, records: &[MessageRecord]) -> Vec<MessageRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Sort newest first. Records without a readable timestamp go last.
pub fn sort_newest_first(records: &mut [MessageRecord]) {
    records.sort_by_cached_key(|r| std::cmp::Reverse(created_at(r)));
}

/// Count of records per known status.
pub fn status_buckets(records: &[MessageRecord]) -> IndexMap<&'static str, usize> {
    let mut buckets: IndexMap<&'static str, usize> =
        STATUS_BUCKETS.iter().map(|status| (*status, 0)).collect();
    for record in records {
        if let Some(count) = buckets.get_mut(lowercase_status(record).as_str()) {
            *count += 1;
        }
    }
    buckets
}

/// Distinct template names in first-seen order.
pub fn template_options(records: &[MessageRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.template_name.as_deref())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct lowercased statuses in first-seen order.
pub fn status_options(records: &[MessageRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.status.as_deref().is_some_and(|s| !s.is_empty()))
        .map(lowercase_status)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Messages sent close together, treated as one sendout.
#[derive(Debug, Clone, Serialize)]
pub struct SendoutGroup {
    /// Oldest message timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Newest message timestamp.
    pub end: Option<DateTime<Utc>>,
    pub unique_templates: Vec<String>,
    pub messages: Vec<MessageRecord>,
}

impl SendoutGroup {
    fn from_messages(messages: Vec<MessageRecord>) -> Self {
        Self {
            start: messages.last().and_then(created_at),
            end: messages.first().and_then(created_at),
            unique_templates: template_options(&messages),
            messages,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Group newest-first records: a message joins the current group when it is
/// at most `threshold_secs` away from the previous one.
pub fn group_sendouts(sorted: &[MessageRecord], threshold_secs: i64) -> Vec<SendoutGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<MessageRecord> = Vec::new();

    for record in sorted {
        let joins = current.last().is_some_and(|prev| {
            match (created_at(prev), created_at(record)) {
                (Some(a), Some(b)) => (a - b).num_seconds().abs() <= threshold_secs,
                _ => false,
            }
        });

        if !joins && !current.is_empty() {
            groups.push(SendoutGroup::from_messages(std::mem::take(&mut current)));
        }
        current.push(record.clone());
    }

    if !current.is_empty() {
        groups.push(SendoutGroup::from_messages(current));
    }
    groups
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render records as CSV with every field quoted.
pub fn to_csv(records: &[MessageRecord]) -> String {
    let header = CSV_HEADERS.map(csv_field).join(",");
    let rows = records.iter().map(|r| {
        [
            &r.created_at,
            &r.phone_number,
            &r.status,
            &r.message_type,
            &r.template_name,
            &r.external_message_id,
        ]
        .map(|field| csv_field(field.as_deref().unwrap_or_default()))
        .join(",")
    });

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render statistics and records as pretty JSON.
pub fn to_json(
    statistics: &serde_json::Value,
    records: &[MessageRecord],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "statistics": statistics,
        "messages": records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(created_at: &str, status: &str, template: &str) -> MessageRecord {
        MessageRecord {
            created_at: Some(created_at.to_string()),
            phone_number: Some("380733927425".to_string()),
            status: Some(status.to_string()),
            message_type: Some("template".to_string()),
            template_name: Some(template.to_string()),
            external_message_id: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2025-03-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2025-03-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_filter_status_case_insensitive() {
        let filter = HistoryFilter {
            status: Some("Delivered".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&record("2025-03-01T10:00:00Z", "DELIVERED", "promo")));
        assert!(!filter.matches(&record("2025-03-01T10:00:00Z", "read", "promo")));
    }

    #[test]
    fn test_filter_dates_inclusive() {
        let filter = HistoryFilter {
            from: Some(day("2025-03-01")),
            to: Some(day("2025-03-02")),
            ..Default::default()
        };
        assert!(filter.matches(&record("2025-03-01T00:00:00Z", "sent", "a")));
        assert!(filter.matches(&record("2025-03-02T23:59:59Z", "sent", "a")));
        assert!(!filter.matches(&record("2025-03-03T00:00:00Z", "sent", "a")));
        assert!(!filter.matches(&record("not a date", "sent", "a")));
    }

    #[test]
    fn test_unparseable_date_kept_without_bounds() {
        let filter = HistoryFilter {
            template: Some("a".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&record("not a date", "sent", "a")));
        assert!(!filter.matches(&record("not a date", "sent", "b")));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("2025-03-01T10:00:00Z", "sent", "a"),
            record("garbage", "sent", "a"),
            record("2025-03-02T10:00:00Z", "sent", "a"),
        ];
        sort_newest_first(&mut records);
        assert_eq!(records[0].created_at.as_deref(), Some("2025-03-02T10:00:00Z"));
        assert_eq!(records[1].created_at.as_deref(), Some("2025-03-01T10:00:00Z"));
        assert_eq!(records[2].created_at.as_deref(), Some("garbage"));
    }

    #[test]
    fn test_status_buckets_and_options() {
        let records = vec![
            record("2025-03-01T10:00:00Z", "Sent", "a"),
            record("2025-03-01T10:00:01Z", "read", "b"),
            record("2025-03-01T10:00:02Z", "sent", "a"),
            record("2025-03-01T10:00:03Z", "accepted", "c"),
        ];

        let buckets = status_buckets(&records);
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), STATUS_BUCKETS);
        assert_eq!(buckets["sent"], 2);
        assert_eq!(buckets["read"], 1);
        assert_eq!(buckets["failed"], 0);

        assert_eq!(template_options(&records), vec!["a", "b", "c"]);
        assert_eq!(status_options(&records), vec!["sent", "read", "accepted"]);
    }

    #[test]
    fn test_grouping_splits_on_gap() {
        let records = vec![
            record("2025-03-01T10:05:00Z", "sent", "b"),
            record("2025-03-01T10:04:30Z", "sent", "a"),
            record("2025-03-01T10:04:00Z", "sent", "a"),
            record("2025-03-01T10:00:00Z", "sent", "a"),
        ];

        let groups = group_sendouts(&records, 60);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].unique_templates, vec!["b", "a"]);
        assert_eq!(groups[0].start, parse_timestamp("2025-03-01T10:04:00Z"));
        assert_eq!(groups[0].end, parse_timestamp("2025-03-01T10:05:00Z"));
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_grouping_threshold_inclusive() {
        let records = vec![
            record("2025-03-01T10:01:00Z", "sent", "a"),
            record("2025-03-01T10:00:00Z", "sent", "a"),
        ];
        assert_eq!(group_sendouts(&records, 60).len(), 1);
        assert_eq!(group_sendouts(&records, 59).len(), 2);
        assert!(group_sendouts(&[], 60).is_empty());
    }

    #[test]
    fn test_csv_quoting() {
        let mut r = record("2025-03-01T10:00:00Z", "sent", "say \"hi\"");
        r.external_message_id = Some("wamid.1".to_string());
        let csv = to_csv(&[r]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"Created\",\"Phone\",\"Status\",\"Type\",\"Template\",\"External ID\""
        );
        assert_eq!(
            lines[1],
            "\"2025-03-01T10:00:00Z\",\"380733927425\",\"sent\",\"template\",\"say \"\"hi\"\"\",\"wamid.1\""
        );
    }

    #[test]
    fn test_json_export_shape() {
        let stats = serde_json::json!({"total": 1});
        let json = to_json(&stats, &[record("2025-03-01T10:00:00Z", "sent", "a")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["statistics"]["total"], 1);
        assert_eq!(value["messages"][0]["template_name"], "a");
    }
}
