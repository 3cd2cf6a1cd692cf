//! Preprocessed output reader
//!
//! Rebuilds the preprocessing tree from `clang -E -dI -dD` output. Line
//! markers (`# 12 "file.h" 1`) delimit entered files, `-dI` echoes each
//! inclusion directive right before the marker of the file it opened, and
//! `-dD` keeps macro definitions in the output.

use crate::tree::{IncludeKeyword, InclusionDirective, Node, NodeKind, TranslationUnit};
use includelint_core::Location;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static LINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#(?:line)?\s*(\d+)\s+"((?:[^"\\]|\\.)*)"((?:\s+\d+)*)\s*$"#)
        .expect("line marker pattern")
});

static INCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#\s*(include|include_next|import)\s+(?:<([^>]*)>|"([^"]*)")"#)
        .expect("inclusion pattern")
});

static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)").expect("define pattern")
});

/// One classified line of preprocessed output
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputLine {
    Marker {
        line: u32,
        file: String,
        enter: bool,
        leave: bool,
    },
    Inclusion(InclusionDirective),
    Define(String),
    Blank,
    Text,
}

impl OutputLine {
    pub(crate) fn classify(line: &str) -> Self {
        let trimmed = line.trim_end();

        if trimmed.trim_start().is_empty() {
            return OutputLine::Blank;
        }

        if !trimmed.starts_with('#') {
            return OutputLine::Text;
        }

        if let Some(caps) = LINE_MARKER.captures(trimmed) {
            let flags: Vec<&str> = caps[3].split_whitespace().collect();
            return OutputLine::Marker {
                line: caps[1].parse().unwrap_or(1),
                file: unescape(&caps[2]),
                enter: flags.contains(&"1"),
                leave: flags.contains(&"2"),
            };
        }

        if let Some(caps) = INCLUSION.captures(trimmed) {
            if let Some(keyword) = IncludeKeyword::from_directive(&caps[1]) {
                let (spelling, angled) = match (caps.get(2), caps.get(3)) {
                    (Some(angled), _) => (angled.as_str(), true),
                    (None, Some(quoted)) => (quoted.as_str(), false),
                    (None, None) => return OutputLine::Text,
                };
                return OutputLine::Inclusion(InclusionDirective {
                    keyword,
                    spelling: spelling.to_string(),
                    angled,
                    included_file: None,
                });
            }
        }

        if let Some(caps) = DEFINE.captures(trimmed) {
            return OutputLine::Define(caps[1].to_string());
        }

        OutputLine::Text
    }
}

/// Undo the escaping clang applies to file names in line markers
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some(d) if d.is_digit(8) => {
                let mut value = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some(d) => {
                out.push(d);
                chars.next();
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Pseudo files like `<built-in>` and `<command line>` have no real location
fn is_pseudo_file(file: &str) -> bool {
    file.starts_with('<') && file.ends_with('>')
}

/// An entered file, optionally wrapped by the directive that entered it
struct Frame {
    region: Node,
    directive: Option<Node>,
}

impl Frame {
    fn close(self) -> Node {
        match self.directive {
            Some(mut directive) => {
                directive.push(self.region);
                directive
            }
            None => self.region,
        }
    }
}

struct TreeBuilder {
    stack: Vec<Frame>,
    file: String,
    line: u32,
    /// The last child of the innermost region still waits for its file
    pending: bool,
}

impl TreeBuilder {
    fn new(main_file: &Path) -> Self {
        let root = Node::new(NodeKind::TranslationUnit(main_file.to_path_buf()), None);
        Self {
            stack: vec![Frame { region: root, directive: None }],
            file: main_file.to_string_lossy().into_owned(),
            line: 1,
            pending: false,
        }
    }

    fn top(&mut self) -> &mut Node {
        let last = self.stack.len() - 1;
        &mut self.stack[last].region
    }

    fn location(&self) -> Option<Location> {
        if is_pseudo_file(&self.file) {
            None
        } else {
            Some(Location::new(self.file.clone(), self.line))
        }
    }

    fn enter(&mut self, file: &str) {
        let region = Node::new(NodeKind::FileRegion(PathBuf::from(file)), None);

        let directive = if self.pending {
            self.top().children.pop().map(|mut node| {
                if let NodeKind::InclusionDirective(directive) = &mut node.kind {
                    directive.included_file = Some(PathBuf::from(file));
                }
                node
            })
        } else {
            None
        };

        self.pending = false;
        self.stack.push(Frame { region, directive });
    }

    fn leave(&mut self) {
        self.pending = false;
        if self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                let node = frame.close();
                self.top().push(node);
            }
        }
    }

    fn feed(&mut self, line: OutputLine) {
        match line {
            OutputLine::Marker { line, file, enter, leave } => {
                if enter {
                    self.enter(&file);
                } else if leave {
                    self.leave();
                }
                self.file = file;
                self.line = line;
                return;
            }
            OutputLine::Inclusion(directive) => {
                let node = Node::new(NodeKind::InclusionDirective(directive), self.location());
                self.top().push(node);
                self.pending = true;
            }
            OutputLine::Define(name) => {
                let node = Node::new(NodeKind::MacroDefinition(name), self.location());
                self.top().push(node);
                self.pending = false;
            }
            OutputLine::Text => self.pending = false,
            OutputLine::Blank => {}
        }
        self.line += 1;
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.leave();
        }
        self.stack.pop().map(Frame::close).unwrap_or_else(|| {
            Node::new(NodeKind::TranslationUnit(PathBuf::from(&self.file)), None)
        })
    }
}

/// Rebuild the preprocessing tree of `main_file` from preprocessed output
pub fn parse_preprocessed(output: &str, main_file: &Path) -> TranslationUnit {
    let mut builder = TreeBuilder::new(main_file);

    for line in output.lines() {
        builder.feed(OutputLine::classify(line));
    }

    TranslationUnit::from_root(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = r#"# 1 "src/main.c"
# 1 "<built-in>" 1
# 1 "<built-in>" 3
#define __clang__ 1
# 380 "<built-in>" 3
# 1 "<command line>" 1
#include "force.h" /* clang -E -dI */
# 1 "inc/force/force.h" 1
# 2 "<command line>" 2
# 1 "<built-in>" 2
# 1 "src/main.c" 2
#include "a.h" /* clang -E -dI */
# 1 "src/main.c"
# 1 "inc/a/a.h" 1
#define A_H
#include <stdio.h> /* clang -E -dI */
# 1 "/usr/include/stdio.h" 1 3 4
extern int printf(const char *, ...);
# 3 "inc/a/a.h" 2
int a;
# 2 "src/main.c" 2
#include "a.h" /* clang -E -dI */
# 3 "src/main.c"

int main(void) { return a; }
"#;

    fn directives(tu: &TranslationUnit) -> Vec<(String, Option<PathBuf>, Option<Location>)> {
        tu.inclusion_directives()
            .map(|(node, d)| (d.spelling.clone(), d.included_file.clone(), node.location.clone()))
            .collect()
    }

    #[test]
    fn test_directives_and_targets() {
        let tu = parse_preprocessed(OUTPUT, Path::new("src/main.c"));

        assert_eq!(
            directives(&tu),
            vec![
                ("force.h".to_string(), Some(PathBuf::from("inc/force/force.h")), None),
                (
                    "a.h".to_string(),
                    Some(PathBuf::from("inc/a/a.h")),
                    Some(Location::new("src/main.c", 1)),
                ),
                (
                    "stdio.h".to_string(),
                    Some(PathBuf::from("/usr/include/stdio.h")),
                    Some(Location::new("inc/a/a.h", 2)),
                ),
                ("a.h".to_string(), None, Some(Location::new("src/main.c", 2))),
            ]
        );
    }

    #[test]
    fn test_regions_nest_under_directive() {
        let tu = parse_preprocessed(OUTPUT, Path::new("src/main.c"));
        let (node, _) = tu
            .inclusion_directives()
            .find(|(_, d)| d.spelling == "a.h")
            .unwrap();

        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].kind, NodeKind::FileRegion(PathBuf::from("inc/a/a.h")));
        assert!(node.children[0]
            .walk_preorder()
            .any(|n| n.kind == NodeKind::MacroDefinition("A_H".to_string())));
    }

    #[test]
    fn test_angled_directive() {
        let tu = parse_preprocessed(OUTPUT, Path::new("src/main.c"));
        let (_, stdio) = tu
            .inclusion_directives()
            .find(|(_, d)| d.spelling == "stdio.h")
            .unwrap();

        assert!(stdio.angled);
        assert_eq!(stdio.keyword, IncludeKeyword::Include);
    }

    #[test]
    fn test_text_between_directive_and_marker_breaks_pairing() {
        let output = "# 1 \"main.c\"\n#include \"x.h\"\nint x;\n# 1 \"inc/x.h\" 1\n# 3 \"main.c\" 2\n";
        let tu = parse_preprocessed(output, Path::new("main.c"));
        let found = directives(&tu);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, None);
    }

    #[test]
    fn test_truncated_output() {
        let output = "# 1 \"main.c\"\n#include \"a.h\"\n# 1 \"inc/a/a.h\" 1\n#include \"missing.h\"\n";
        let tu = parse_preprocessed(output, Path::new("main.c"));

        assert_eq!(directives(&tu).len(), 2);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"dir\\with \"quotes\".h"#), r#"dir\with "quotes".h"#);
        assert_eq!(unescape(r"tab\011.h"), "tab\t.h");
    }

    #[test]
    fn test_classify_marker_flags() {
        assert_eq!(
            OutputLine::classify(r#"# 1 "/usr/include/stdio.h" 1 3 4"#),
            OutputLine::Marker {
                line: 1,
                file: "/usr/include/stdio.h".to_string(),
                enter: true,
                leave: false,
            }
        );
        assert_eq!(OutputLine::classify("#pragma once"), OutputLine::Text);
        assert_eq!(OutputLine::classify("   "), OutputLine::Blank);
    }
}
