//! Diagnostic report tree.
//!
//! Every grammar rule invocation produces exactly one [`Report`], successful
//! or not. A rule's children are the reports of the sub-rules it attempted,
//! in the order it attempted them, so the tree of a single parse is a full
//! trace of the backtracking search, abandoned alternatives included.

use std::fmt;

use crate::position::Position;

/// The record of one rule invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Whether the rule matched.
    pub success: bool,
    /// Position after the attempt; for failures, where the rule gave up.
    pub position: Position,
    /// Grammar rule name, e.g. `"int"` or `"long string"`.
    pub rule: &'static str,
    /// Human-readable outcome, e.g. `"parsed 3 entries"`.
    pub message: String,
    /// Reports of the sub-rules attempted, in temporal order.
    pub children: Vec<Report>,
}

impl Report {
    pub fn success(
        rule: &'static str,
        position: Position,
        message: String,
        children: Vec<Report>,
    ) -> Self {
        Self {
            success: true,
            position,
            rule,
            message,
            children,
        }
    }

    pub fn failure(
        rule: &'static str,
        position: Position,
        message: String,
        children: Vec<Report>,
    ) -> Self {
        Self {
            success: false,
            position,
            rule,
            message,
            children,
        }
    }

    /// Pre-order traversal yielding `(depth, node)`, starting at depth 0.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![(0, self)],
        }
    }

    /// Number of nodes in this tree, including the root.
    pub fn count(&self) -> usize {
        self.nodes().count()
    }

    /// First node in pre-order with the given rule name.
    pub fn find(&self, rule: &str) -> Option<&Report> {
        self.nodes().map(|(_, r)| r).find(|r| r.rule == rule)
    }

    /// The failed node that got furthest into the input.
    ///
    /// Ties on position go to the shallower node, the outermost rule that
    /// gave up there.
    pub fn furthest_failure(&self) -> Option<&Report> {
        let mut best: Option<(usize, &Report)> = None;
        for (depth, node) in self.nodes().filter(|(_, r)| !r.success) {
            let better = match best {
                None => true,
                Some((best_depth, best_node)) => {
                    node.position.index > best_node.position.index
                        || (node.position.index == best_node.position.index && depth < best_depth)
                }
            };
            if better {
                best = Some((depth, node));
            }
        }
        best.map(|(_, node)| node)
    }

    /// The single line describing this node.
    pub fn summary(&self) -> String {
        format!(
            "{} to parse {} at line {}, column {}: {}",
            if self.success { "succeeded" } else { "failed" },
            self.rule,
            self.position.line,
            self.position.column,
            self.message
        )
    }

    /// Render the tree as indented text, one line per node.
    ///
    /// Nodes deeper than `max_depth` are collapsed into a single placeholder
    /// line under their closest rendered ancestor.
    pub fn render(&self, max_depth: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, max_depth);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize, max_depth: usize) {
        push_indent(out, depth);
        out.push_str(&self.summary());
        out.push('\n');

        if self.children.is_empty() {
            return;
        }

        if depth >= max_depth {
            push_indent(out, depth + 1);
            out.push_str(&format!(
                "... {} nested reports omitted\n",
                self.count() - 1
            ));
            return;
        }

        for child in &self.children {
            child.render_into(out, depth + 1, max_depth);
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(usize::MAX))
    }
}

/// Pre-order iterator over a report tree.
pub struct Nodes<'a> {
    stack: Vec<(usize, &'a Report)>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (usize, &'a Report);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(column: usize) -> Position {
        Position {
            index: column - 1,
            line: 1,
            column,
        }
    }

    fn sample() -> Report {
        Report::success(
            "value",
            at(4),
            "parsed int".into(),
            vec![
                Report::success("terminal", at(1), "parsed terminal after 0 delimiters".into(), vec![]),
                Report::success(
                    "int",
                    at(4),
                    "parsed positive int".into(),
                    vec![Report::success("digits", at(4), "parsed 3 digits".into(), vec![])],
                ),
            ],
        )
    }

    #[test]
    fn test_preorder() {
        let report = sample();
        let rules: Vec<(usize, &str)> = report.nodes().map(|(d, r)| (d, r.rule)).collect();
        assert_eq!(
            rules,
            vec![(0, "value"), (1, "terminal"), (1, "int"), (2, "digits")]
        );
        assert_eq!(report.count(), 4);
        assert_eq!(report.find("digits").map(|r| r.message.as_str()), Some("parsed 3 digits"));
        assert!(report.find("map").is_none());
    }

    #[test]
    fn test_render_full() {
        let text = sample().to_string();
        assert_eq!(
            text,
            "succeeded to parse value at line 1, column 4: parsed int\n\
             \tsucceeded to parse terminal at line 1, column 1: parsed terminal after 0 delimiters\n\
             \tsucceeded to parse int at line 1, column 4: parsed positive int\n\
             \t\tsucceeded to parse digits at line 1, column 4: parsed 3 digits\n"
        );
    }

    #[test]
    fn test_render_truncated() {
        let text = sample().render(0);
        assert_eq!(
            text,
            "succeeded to parse value at line 1, column 4: parsed int\n\
             \t... 3 nested reports omitted\n"
        );

        let text = sample().render(1);
        assert!(text.ends_with("\t\t... 1 nested reports omitted\n"));
        assert!(!text.contains("digits at"));
    }

    #[test]
    fn test_furthest_failure_prefers_shallower_on_tie() {
        let report = Report::failure(
            "list",
            at(1),
            "ending character must be ')', but got ']'".into(),
            vec![
                Report::failure("value", at(3), "expected int, float, string, list, or map".into(), vec![
                    Report::failure("short string", at(3), "no short string characters parsed".into(), vec![]),
                ]),
                Report::failure("value", at(2), "not as far".into(), vec![]),
            ],
        );
        let failure = report.furthest_failure().unwrap();
        assert_eq!(failure.rule, "value");
        assert_eq!(failure.message, "expected int, float, string, list, or map");
    }

    #[test]
    fn test_furthest_failure_none_when_all_succeed() {
        assert!(sample().furthest_failure().is_none());
    }
}
