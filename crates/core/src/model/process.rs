use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An absolute instant. Sub-millisecond precision is kept so very short
/// processes still get a measurable duration.
pub type Timestamp = DateTime<Utc>;

/// One traced process and the processes it spawned.
///
/// This is the input format written by `tracetree -f json`. Timestamps may be
/// RFC 3339 strings or numbers of milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub pid: i64,
    /// argv of the process; empty when the tracer never saw an exec.
    #[serde(default)]
    pub cmdline: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started: Timestamp,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub ended: Timestamp,
    #[serde(default)]
    pub children: Vec<ProcessNode>,
}

impl ProcessNode {
    /// Total number of processes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }
}

// The derived drop glue would recurse once per tree level.
impl Drop for ProcessNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    EpochMillis(f64),
    Text(String),
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::EpochMillis(ms) => from_epoch_millis(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
        RawTimestamp::Text(text) => parse_timestamp(&text)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {text:?}: {e}"))),
    }
}

/// Convert fractional epoch milliseconds into an instant, keeping
/// microsecond precision.
pub fn from_epoch_millis(ms: f64) -> Option<Timestamp> {
    if !ms.is_finite() {
        return None;
    }
    let micros = (ms * 1000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// Parse an RFC 3339 timestamp. A timestamp without an offset is read as UTC.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(t) => Ok(t.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_epoch_millis() {
        let json = r#"{
            "pid": 7,
            "cmdline": ["/bin/sh", "-c", "true"],
            "started": "2017-06-01T10:00:00Z",
            "ended": 1496311200250.5,
            "children": []
        }"#;
        let node: ProcessNode = serde_json::from_str(json).expect("parse");
        assert_eq!(node.pid, 7);
        assert_eq!(node.started.timestamp_millis(), 1_496_311_200_000);
        assert_eq!(node.ended.timestamp_micros(), 1_496_311_200_250_500);
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let t = parse_timestamp("2017-06-01T10:00:00.125").expect("parse");
        assert_eq!(t.timestamp_millis(), 1_496_311_200_125);
    }

    #[test]
    fn offsets_are_normalized() {
        let t = parse_timestamp("2017-06-01T12:00:00+02:00").expect("parse");
        assert_eq!(t, parse_timestamp("2017-06-01T10:00:00Z").expect("parse"));
    }

    #[test]
    fn missing_children_and_cmdline_default_to_empty() {
        let json = r#"{"pid": 1, "started": 0, "ended": 10}"#;
        let node: ProcessNode = serde_json::from_str(json).expect("parse");
        assert!(node.cmdline.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let json = r#"{"pid": 1, "started": "yesterday", "ended": 10}"#;
        assert!(serde_json::from_str::<ProcessNode>(json).is_err());
    }

    #[test]
    fn deep_chain_drops_without_recursing() {
        let leaf = |pid| ProcessNode {
            pid,
            cmdline: vec![],
            started: from_epoch_millis(0.0).expect("timestamp in range"),
            ended: from_epoch_millis(1.0).expect("timestamp in range"),
            children: vec![],
        };
        let mut tree = leaf(0);
        for pid in 1..200_000 {
            let mut parent = leaf(pid);
            parent.children.push(tree);
            tree = parent;
        }
        assert_eq!(tree.node_count(), 200_000);
        drop(tree);
    }

    #[test]
    fn node_count_includes_descendants() {
        let json = r#"{"pid": 1, "started": 0, "ended": 10, "children": [
            {"pid": 2, "started": 1, "ended": 2, "children": [
                {"pid": 3, "started": 1, "ended": 2}
            ]},
            {"pid": 4, "started": 3, "ended": 4}
        ]}"#;
        let node: ProcessNode = serde_json::from_str(json).expect("parse");
        assert_eq!(node.node_count(), 4);
    }
}
