use crate::format::{elapsed_secs, millis_between};
use crate::model::{ProcessNode, Row};

/// Display name used when a process has no argv.
pub const UNKNOWN_CMD: &str = "<unknown>";

/// Flatten a process tree into rows, depth-first pre-order: the root first,
/// then each child's subtree in child order.
///
/// Uses an explicit stack, so arbitrarily deep trees are fine.
pub fn flatten(root: &ProcessNode) -> Vec<Row> {
    let mut rows = Vec::with_capacity(root.node_count());
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        rows.push(to_row(node));
        // Reversed so the first child is popped next.
        stack.extend(node.children.iter().rev());
    }
    rows
}

fn to_row(node: &ProcessNode) -> Row {
    Row {
        pid: node.pid,
        cmd: display_name(&node.cmdline),
        cmdline: node.cmdline.join(" "),
        start: node.started,
        end: node.ended,
        elapsed: elapsed_secs(millis_between(node.started, node.ended)),
    }
}

/// Final `/`-separated segment of argv[0].
pub fn display_name(cmdline: &[String]) -> String {
    cmdline
        .first()
        .and_then(|argv0| argv0.rsplit('/').next())
        .unwrap_or(UNKNOWN_CMD)
        .to_string()
}
