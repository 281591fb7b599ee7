use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{ProcessNode, Timestamp};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid process tree JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("process {pid} ends ({ended}) before it starts ({started})")]
    EndBeforeStart {
        pid: i64,
        started: Timestamp,
        ended: Timestamp,
    },
}

/// Parse `tracetree -f json` output and check every process interval.
///
/// Each process nests two JSON levels deeper than its parent, so the usual
/// recursion limit is lifted and the stack grows on demand instead.
pub fn parse_process_tree(data: &[u8]) -> Result<ProcessNode, ParseError> {
    let mut de = serde_json::Deserializer::from_slice(data);
    de.disable_recursion_limit();
    let root = ProcessNode::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    validate(&root)?;
    debug!(processes = root.node_count(), "parsed process tree");
    Ok(root)
}

/// Check `started <= ended` for every process in the tree.
pub fn validate(root: &ProcessNode) -> Result<(), ParseError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.ended < node.started {
            return Err(ParseError::EndBeforeStart {
                pid: node.pid,
                started: node.started,
                ended: node.ended,
            });
        }
        stack.extend(&node.children);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_tree() {
        let data = br#"{
            "pid": 1, "cmdline": ["make"], "started": 0, "ended": 100,
            "children": [
                {"pid": 2, "cmdline": ["cc"], "started": 10, "ended": 20, "children": []}
            ]
        }"#;
        let root = parse_process_tree(data).expect("parse");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].pid, 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_process_tree(b"{\"pid\": 1,"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_process_tree(b"[]"),
            Err(ParseError::Json(_))
        ));
    }

    fn chain_json(depth: usize) -> String {
        let mut json = String::new();
        for pid in 0..depth {
            json.push_str(&format!(
                r#"{{"pid": {pid}, "cmdline": ["sh"], "started": 0, "ended": 1, "children": ["#
            ));
        }
        for _ in 0..depth {
            json.push_str("]}");
        }
        json
    }

    #[test]
    fn deep_trees_parse() {
        let root = parse_process_tree(chain_json(200).as_bytes()).expect("200 deep");
        assert_eq!(root.node_count(), 200);

        let root = parse_process_tree(chain_json(20_000).as_bytes()).expect("20000 deep");
        assert_eq!(root.node_count(), 20_000);
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(matches!(
            parse_process_tree(br#"{"pid": 1, "started": 0, "ended": 1} x"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn reversed_interval_is_rejected() {
        let data = br#"{
            "pid": 1, "started": 0, "ended": 100,
            "children": [{"pid": 9, "started": 50, "ended": 40}]
        }"#;
        match parse_process_tree(data) {
            Err(ParseError::EndBeforeStart { pid, .. }) => assert_eq!(pid, 9),
            other => unreachable!("unexpected result: {other:?}"),
        }
    }
}
