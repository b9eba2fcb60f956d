//! Comment groups and the node-to-comment map for Go syntax trees.
//!
//! Grouping and association follow the Go toolchain (`go/parser` comment
//! groups, `ast.NewCommentMap`), so a comment attaches to the same element
//! here as it would for a Go program inspecting the same file.

use std::collections::HashMap;

use tree_sitter::Node;

/// Literal kinds that are single tokens for grouping and association.
const LITERAL_KINDS: &[&str] = &[
    "interpreted_string_literal",
    "raw_string_literal",
    "rune_literal",
];

/// Grammar wrappers with no counterpart in the Go AST.
const TRANSPARENT_KINDS: &[&str] = &[
    "package_clause",
    "literal_value",
    "literal_element",
    "expression_list",
    "var_spec_list",
    "const_spec_list",
    "import_spec_list",
    "argument_list",
    "type_arguments",
    "statement_list",
];

/// A run of adjacent comments.
#[derive(Debug, Clone)]
pub(crate) struct CommentGroup {
    comments: Vec<String>,
    start_byte: usize,
    end_byte: usize,
    start_row: usize,
    end_row: usize,
}

impl CommentGroup {
    fn from_run(run: &[Node<'_>], source: &[u8]) -> Self {
        let comments = run
            .iter()
            .map(|node| String::from_utf8_lossy(&source[node.byte_range()]).into_owned())
            .collect();
        let first = run.first().copied();
        let last = run.last().copied();
        Self {
            comments,
            start_byte: first.map_or(0, |n| n.start_byte()),
            end_byte: last.map_or(0, |n| n.end_byte()),
            start_row: first.map_or(0, |n| n.start_position().row),
            end_row: last.map_or(0, |n| n.end_position().row),
        }
    }

    /// Comment text without markers, with directive lines (`//go:embed`,
    /// `//line ...`) removed and blank lines collapsed.
    pub(crate) fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for comment in &self.comments {
            let body = if let Some(line) = comment.strip_prefix("//") {
                match line.strip_prefix(' ') {
                    Some(stripped) => stripped,
                    None if is_directive(line) => continue,
                    None => line,
                }
            } else {
                comment
                    .strip_prefix("/*")
                    .and_then(|c| c.strip_suffix("*/"))
                    .unwrap_or(comment)
            };
            for line in body.split('\n') {
                lines.push(line.trim_end_matches([' ', '\t', '\n', '\r']).to_string());
            }
        }

        let mut kept: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            let previous_blank = kept.last().is_some_and(String::is_empty);
            if !line.is_empty() || (!kept.is_empty() && !previous_blank) {
                kept.push(line);
            }
        }
        if kept.last().is_some_and(|l| !l.is_empty()) {
            kept.push(String::new());
        }
        kept.join("\n")
    }
}

/// `line `, `extern `, `export ` and `[a-z0-9]+:[a-z0-9]` after the `//`.
fn is_directive(line: &str) -> bool {
    if ["line ", "extern ", "export "]
        .iter()
        .any(|prefix| line.starts_with(prefix))
    {
        return true;
    }
    let bytes = line.as_bytes();
    let Some(colon) = line.find(':') else {
        return false;
    };
    if colon == 0 || colon.saturating_add(1) >= bytes.len() {
        return false;
    }
    bytes[..=colon.saturating_add(1)]
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != colon)
        .all(|(_, b)| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Position summary of a syntax node taking part in association.
#[derive(Debug, Clone, Copy)]
struct SyntaxNode {
    id: usize,
    start_byte: usize,
    end_byte: usize,
    start_row: usize,
    end_row: usize,
    group: bool,
}

impl SyntaxNode {
    fn from_node(node: Node<'_>) -> Option<Self> {
        let (start, end) = if node.kind() == "source_file" {
            // The file node spans from the package clause to its last declaration.
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node
                .named_children(&mut cursor)
                .filter(|n| !n.is_extra())
                .collect();
            (*children.first()?, *children.last()?)
        } else {
            (node, node)
        };
        Some(Self {
            id: node.id(),
            start_byte: start.start_byte(),
            end_byte: end.end_byte(),
            start_row: start.start_position().row,
            end_row: end.end_position().row,
            group: is_node_group(node.kind()),
        })
    }
}

/// Files, declarations, specs, fields and statements.
fn is_node_group(kind: &str) -> bool {
    kind == "source_file"
        || kind == "block"
        || kind == "type_alias"
        || kind == "method_elem"
        || kind == "method_spec"
        || kind.ends_with("_declaration")
        || kind.ends_with("_spec")
        || kind.ends_with("_statement")
}

/// Association of comment groups with syntax nodes.
#[derive(Debug, Default)]
pub(crate) struct CommentMap {
    groups: Vec<CommentGroup>,
    by_node: HashMap<usize, Vec<usize>>,
}

impl CommentMap {
    /// Build the comment map for a parsed file.
    pub(crate) fn new(root: Node<'_>, source: &[u8]) -> Self {
        let groups = comment_groups(root, source);
        if groups.is_empty() {
            return Self::default();
        }
        let nodes = syntax_nodes(root);
        let by_node = associate(&groups, &nodes);
        Self { groups, by_node }
    }

    /// First comment group associated with `node`, if any.
    pub(crate) fn first(&self, node: Node<'_>) -> Option<&CommentGroup> {
        self.by_node
            .get(&node.id())
            .and_then(|indices| indices.first())
            .and_then(|i| self.groups.get(*i))
    }

    /// Number of comment groups in the file.
    #[cfg(test)]
    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Source tokens in order; literals count as one token.
fn tokens<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "comment"
            || node.child_count() == 0
            || LITERAL_KINDS.contains(&node.kind())
        {
            if node.start_byte() < node.end_byte() {
                out.push(node);
            }
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out.sort_by_key(Node::start_byte);
    out
}

/// Split the file's comments into groups.
///
/// A comment starting on the line of the preceding token opens a trailing
/// group limited to that line. Other groups take comments separated by at
/// most one line break.
fn comment_groups(root: Node<'_>, source: &[u8]) -> Vec<CommentGroup> {
    let tokens = tokens(root);
    let mut groups = Vec::new();
    let mut previous_row: Option<usize> = None;
    let mut i = 0usize;

    while let Some(token) = tokens.get(i) {
        if token.kind() != "comment" {
            previous_row = Some(token.start_position().row);
            i = i.saturating_add(1);
            continue;
        }
        let run_end = tokens[i..]
            .iter()
            .position(|t| t.kind() != "comment")
            .map_or(tokens.len(), |offset| i.saturating_add(offset));
        let run = &tokens[i..run_end];

        let mut next = 0usize;
        if previous_row == Some(token.start_position().row) {
            next = take_group(run, next, 0, source, &mut groups);
        }
        while next < run.len() {
            next = take_group(run, next, 1, source, &mut groups);
        }
        i = run_end;
    }
    groups
}

fn take_group(
    run: &[Node<'_>],
    start: usize,
    max_gap: usize,
    source: &[u8],
    groups: &mut Vec<CommentGroup>,
) -> usize {
    let mut end_row = run[start].start_position().row;
    let mut end = start;
    while let Some(comment) = run.get(end) {
        if comment.start_position().row > end_row.saturating_add(max_gap) {
            break;
        }
        end_row = comment.end_position().row;
        end = end.saturating_add(1);
    }
    groups.push(CommentGroup::from_run(&run[start..end], source));
    end
}

/// Syntax nodes in source (pre-)order, skipping grammar-only wrappers.
fn syntax_nodes(root: Node<'_>) -> Vec<SyntaxNode> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_extra() {
            continue;
        }
        if !TRANSPARENT_KINDS.contains(&node.kind())
            && let Some(summary) = SyntaxNode::from_node(node)
        {
            out.push(summary);
        }
        if LITERAL_KINDS.contains(&node.kind()) {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Pop every node that ends at or before `pos`, returning the last popped.
fn pop_ended(stack: &mut Vec<SyntaxNode>, pos: usize) -> Option<SyntaxNode> {
    let mut top = None;
    while stack.last().is_some_and(|n| n.end_byte <= pos) {
        top = stack.pop();
    }
    top
}

/// Assign every comment group to a node.
///
/// A group goes to the most recent node group (declaration, spec,
/// statement) or else the previous node when it starts on the line that
/// node ends, or on the next line with a blank line before the following
/// node. Otherwise it goes to the following node.
fn associate(groups: &[CommentGroup], nodes: &[SyntaxNode]) -> HashMap<usize, Vec<usize>> {
    let mut by_node: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut next_group = 0usize;
    let mut previous: Option<SyntaxNode> = None;
    let mut previous_group: Option<SyntaxNode> = None;
    let mut stack: Vec<SyntaxNode> = Vec::new();

    for current in nodes.iter().copied().map(Some).chain(std::iter::once(None)) {
        let (current_byte, current_row) =
            current.map_or((usize::MAX, usize::MAX), |n| (n.start_byte, n.start_row));

        while let Some(group) = groups.get(next_group) {
            if group.end_byte > current_byte {
                break;
            }
            if let Some(top) = pop_ended(&mut stack, group.start_byte) {
                previous_group = Some(top);
            }
            let blank_after = group.end_row.saturating_add(1) < current_row;
            let follows = |end_row: usize| {
                end_row == group.start_row
                    || (end_row.saturating_add(1) == group.start_row && blank_after)
            };

            let owner = match (previous_group, previous, current) {
                (Some(pg), _, _) if follows(pg.end_row) => Some(pg.id),
                (_, Some(p), _) if follows(p.end_row) || current.is_none() => Some(p.id),
                (_, _, Some(q)) => Some(q.id),
                _ => None,
            };
            if let Some(owner) = owner {
                by_node.entry(owner).or_default().push(next_group);
            }
            next_group = next_group.saturating_add(1);
        }

        if let Some(node) = current {
            previous = Some(node);
            if node.group {
                pop_ended(&mut stack, node.start_byte);
                stack.push(node);
            }
        }
    }
    by_node
}
