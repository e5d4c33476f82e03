//! Tables, rows and cells.
//!
//! A table is a vertical stack of rows. Leading rows flagged `header` are
//! repeated at the top of every continuation page; a break never separates
//! the headers from the first data row, and `minLines` counts data rows.
//! Rows never split: a row that does not fit moves whole.

use std::sync::Arc;

use crate::geometry::Rectangle;
use crate::style::{CellStyle, TableStyle};

use super::page_break::{adjust_split, BreakVerdict, BumpResult};
use super::{LayoutContext, LayoutNode, NodeKind};

/// Width of one column: fixed user-space units or a share of what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpec {
    Fixed(i32),
    Weight(u32),
}

impl ColumnSpec {
    /// Parse a whitespace-separated list such as `"100 2* *"`.
    pub fn parse_list(raw: &str) -> Option<Vec<ColumnSpec>> {
        raw.split_whitespace().map(ColumnSpec::parse).collect()
    }

    fn parse(token: &str) -> Option<ColumnSpec> {
        if token == "*" {
            return Some(ColumnSpec::Weight(1));
        }
        if let Some(weight) = token.strip_suffix('*').or_else(|| token.strip_suffix('x')) {
            return match weight.parse::<u32>() {
                Ok(w) if w > 0 => Some(ColumnSpec::Weight(w)),
                _ => None,
            };
        }
        match token.parse::<i32>() {
            Ok(w) if w >= 0 => Some(ColumnSpec::Fixed(w)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub style: Arc<TableStyle>,
    /// Empty means equal columns.
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct RowLayout {
    pub is_header: bool,
    /// Column edges, set by the table before each draft.
    pub edges: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct CellLayout {
    pub style: Arc<CellStyle>,
    pub span: usize,
}

/// X coordinates of the column boundaries: fixed columns first, the rest of
/// the width shared by weight. Rounding remainders land in later columns so
/// the last edge is exact.
pub fn column_edges(columns: &[ColumnSpec], left: i32, width: i32) -> Vec<i32> {
    let fixed: i32 = columns
        .iter()
        .map(|c| match c {
            ColumnSpec::Fixed(w) => *w,
            ColumnSpec::Weight(_) => 0,
        })
        .sum();
    let total_weight: u32 = columns
        .iter()
        .map(|c| match c {
            ColumnSpec::Weight(w) => *w,
            ColumnSpec::Fixed(_) => 0,
        })
        .sum();
    let flexible = (width - fixed).max(0) as i64;

    let mut edges = Vec::with_capacity(columns.len() + 1);
    let mut x = left;
    edges.push(x);
    let mut weight_seen = 0u32;
    let mut given = 0i64;
    for column in columns {
        let w = match column {
            ColumnSpec::Fixed(w) => *w as i64,
            ColumnSpec::Weight(weight) => {
                weight_seen += weight;
                let target = flexible * weight_seen as i64 / total_weight.max(1) as i64;
                let w = target - given;
                given = target;
                w
            }
        };
        x += w as i32;
        edges.push(x);
    }
    edges
}

fn cell_span(cell: &LayoutNode) -> usize {
    match &cell.kind {
        NodeKind::TableCell(c) => c.span.max(1),
        _ => 1,
    }
}

fn row_span(row: &LayoutNode) -> usize {
    row.children.iter().map(cell_span).sum()
}

fn is_header(row: &LayoutNode) -> bool {
    matches!(&row.kind, NodeKind::TableRow(r) if r.is_header)
}

/// Number of leading header rows.
pub fn header_count(table: &LayoutNode) -> usize {
    table.children.iter().take_while(|r| is_header(r)).count()
}

fn data_rows(table: &LayoutNode) -> Vec<usize> {
    let headers = header_count(table);
    (headers..table.children.len())
        .filter(|i| table.children[*i].has_content())
        .collect()
}

pub(crate) fn is_empty(table: &LayoutNode) -> bool {
    table.children[header_count(table)..].iter().all(|r| r.is_empty())
}

pub(crate) fn draft_table(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    let inner = bounds.inset(&node.padding());
    let columns = match &node.kind {
        NodeKind::Table(t) if !t.columns.is_empty() => t.columns.clone(),
        _ => {
            let count = node.children.iter().map(row_span).max().unwrap_or(1).max(1);
            vec![ColumnSpec::Weight(1); count]
        }
    };
    let edges = column_edges(&columns, inner.left, inner.width());
    for row in &mut node.children {
        if let NodeKind::TableRow(r) = &mut row.kind {
            r.edges.clone_from(&edges);
        }
    }
    node.draft_stack(bounds, ctx);
}

pub(crate) fn draft_row(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    let edges = match &node.kind {
        NodeKind::TableRow(r) if r.edges.len() >= 2 => r.edges.clone(),
        _ => {
            let count = row_span(node).max(1);
            let weights = vec![ColumnSpec::Weight(1); count];
            column_edges(&weights, bounds.left, bounds.width())
        }
    };
    let last = edges.len() - 1;

    let mut column = 0;
    let mut bottom = bounds.top;
    for cell in &mut node.children {
        let span = cell_span(cell);
        let start = column.min(last);
        let end = (column + span).min(last);
        let area = Rectangle::new(edges[start], bounds.bottom.min(bounds.top), edges[end], bounds.top);
        bottom = bottom.min(cell.draft(area, ctx).y);
        column += span;
    }

    // cells share the row height
    for cell in &mut node.children {
        if cell.has_content() {
            cell.bounds.bottom = bottom;
        }
    }
    node.bounds = Rectangle::new(bounds.left, bottom, bounds.right, bounds.top);
}

pub(crate) fn assess(node: &mut LayoutNode, body: &Rectangle) -> BreakVerdict {
    if node.fits(body) {
        return BreakVerdict::ThisPage;
    }
    let pad = node.padding().bottom;
    let Some(first_out) = node
        .children
        .iter()
        .position(|r| r.has_content() && r.bounds.bottom - pad < body.bottom)
    else {
        return BreakVerdict::ThisPage;
    };
    if first_out < header_count(node) {
        return BreakVerdict::Overflow;
    }

    let data = data_rows(node);
    let fit = data.iter().filter(|i| **i < first_out).count();
    match adjust_split(fit, data.len(), node.rules.min_lines) {
        Some(k) => {
            node.page_split_index = data[k];
            BreakVerdict::Split
        }
        None => BreakVerdict::Overflow,
    }
}

pub(crate) fn can_split(node: &LayoutNode) -> bool {
    let index = node.page_split_index;
    if index <= header_count(node) {
        return false;
    }
    let data = data_rows(node);
    let before = data.iter().filter(|i| **i < index).count();
    let after = data.len() - before;
    let min = node.rules.min_lines.max(1);
    before >= min && after >= min
}

pub(crate) fn bump(node: &mut LayoutNode) -> BumpResult {
    if can_split(node) {
        return BumpResult::Unnecessary;
    }
    let data = data_rows(node);
    if data.len() < 2 {
        return BumpResult::Impossible;
    }
    // keep the headers and exactly one data row
    node.page_split_index = data[1];
    BumpResult::Bumped
}

pub(crate) fn do_break(node: &mut LayoutNode) -> Option<LayoutNode> {
    let headers = header_count(node);
    let index = node.page_split_index.max(headers);
    if index >= node.children.len() {
        return None;
    }
    let mut overflow = node.shallow_clone();
    overflow.children = node.children[..headers].to_vec();
    overflow.children.extend(node.children.drain(index..));
    Some(overflow)
}
