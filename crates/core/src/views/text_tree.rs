//! Plain-text rendering of a process tree, one tab-indented line per process:
//!
//! ```text
//! 100 make -j4 [2.000s]
//! 	101 sh -c cc a.c [0.500s]
//! 		102 cc a.c [0.450s]
//! ```

use std::fmt::Write;

use crate::flatten::display_name;
use crate::format::{elapsed_secs, millis_between};
use crate::model::ProcessNode;

pub fn render_text_tree(root: &ProcessNode) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let args = node.cmdline.get(1..).unwrap_or_default();
        let mut args = args.join(" ");
        if !args.is_empty() {
            args.push(' ');
        }
        let _ = writeln!(
            out,
            "{}{} {} {}[{}]",
            "\t".repeat(depth),
            node.pid,
            display_name(&node.cmdline),
            args,
            elapsed_secs(millis_between(node.started, node.ended)),
        );
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    out
}
