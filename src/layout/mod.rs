//! # Layout Tree and Pagination Protocol
//!
//! A document is a tree of `LayoutNode`s. Every node owns its children in
//! order and carries its resolved `bounds`; there are no back-pointers. The
//! pagination protocol is the same for every kind:
//!
//! 1. `draft` places the node (and its subtree) top-down inside a rectangle
//!    and reports where it ended. Nodes are allowed to extend below the
//!    rectangle; that is how overflow is detected.
//! 2. `assess_page_break` decides, bottom-up, whether the node fits the
//!    page's body box, must split, or must move whole.
//! 3. `bump_page_split_index` forces progress when nothing at all fits on a
//!    fresh page.
//! 4. `do_page_break` executes the split: the node keeps what stays and
//!    returns a clone holding what moves.
//! 5. `redraft` restacks the retained part without re-measuring anything.
//!
//! The Y axis points up, so "below" means a smaller Y. Kind-specific rules
//! (table headers repeat, bullets never split, photo rows and pictures move
//! whole) live in the per-kind submodules; this module holds the node type,
//! the dispatch and the vertical-stack behaviour shared by container kinds.

pub mod content;
pub mod info;
pub mod leaf;
pub mod list;
pub mod load;
pub mod page;
pub mod page_break;
pub mod photo;
pub mod table;

use std::sync::Arc;

use crate::condition::Condition;
use crate::geometry::{Padding, Position, Rectangle};
use crate::style::{Cascade, LineStyle};
use crate::text::LineWrapper;
use crate::trace::TraceContext;

pub use info::{BulletInfo, ElementInfo, LayoutInfo, PageInfo};
pub use leaf::{Align, PictureLayout, SpaceLayout, TextLayout};
pub use list::{Bullet, ListItemLayout};
pub use page::{Generation, LayoutEngine, PageLayout, PageSetup, ReportLayout};
pub use page_break::{BreakVerdict, BumpResult, PageBreakRules};
pub use photo::{PhotoLayout, PhotoTableLayout};
pub use table::{CellLayout, ColumnSpec, RowLayout, TableLayout};

/// Services and the trace scope handed down every recursive layout call.
pub struct LayoutContext<'a> {
    pub wrapper: &'a dyn LineWrapper,
    pub trace: TraceContext,
}

impl<'a> LayoutContext<'a> {
    pub fn new(wrapper: &'a dyn LineWrapper) -> Self {
        Self {
            wrapper,
            trace: TraceContext::off(),
        }
    }

    /// Context for a node's subtree.
    pub fn enter(&self, scope: Option<&TraceContext>) -> LayoutContext<'a> {
        LayoutContext {
            wrapper: self.wrapper,
            trace: self.trace.push(scope),
        }
    }
}

/// Fieldless mirror of `NodeKind`, for dispatch and naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Group,
    Table,
    TableRow,
    TableCell,
    Line,
    Space,
    Text,
    ListItem,
    Photo,
    PhotoRow,
    PhotoTable,
    Picture,
    Page,
    Report,
}

impl NodeTag {
    pub fn name(&self) -> &'static str {
        match self {
            NodeTag::Group => "Group",
            NodeTag::Table => "Table",
            NodeTag::TableRow => "Row",
            NodeTag::TableCell => "Cell",
            NodeTag::Line => "Line",
            NodeTag::Space => "Space",
            NodeTag::Text => "Text",
            NodeTag::ListItem => "ListItem",
            NodeTag::Photo => "Photo",
            NodeTag::PhotoRow => "PhotoRow",
            NodeTag::PhotoTable => "PhotoTable",
            NodeTag::Picture => "Picture",
            NodeTag::Page => "Page",
            NodeTag::Report => "Report",
        }
    }

    /// Kinds that stack their children vertically.
    pub fn is_stack(&self) -> bool {
        matches!(
            self,
            NodeTag::Group | NodeTag::TableCell | NodeTag::Report | NodeTag::Page | NodeTag::PhotoTable
        )
    }

    /// Kinds that never divide across pages.
    pub fn never_splits(&self) -> bool {
        matches!(
            self,
            NodeTag::TableRow
                | NodeTag::PhotoRow
                | NodeTag::Line
                | NodeTag::Space
                | NodeTag::Picture
                | NodeTag::Photo
        )
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Table(TableLayout),
    TableRow(RowLayout),
    TableCell(CellLayout),
    Line(Arc<LineStyle>),
    Space(SpaceLayout),
    Text(TextLayout),
    ListItem(ListItemLayout),
    Photo(PhotoLayout),
    /// A row of photos; the value is the column count of its table.
    PhotoRow(usize),
    PhotoTable(PhotoTableLayout),
    Picture(PictureLayout),
    Page(PageLayout),
    Report(ReportLayout),
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Group => NodeTag::Group,
            NodeKind::Table(_) => NodeTag::Table,
            NodeKind::TableRow(_) => NodeTag::TableRow,
            NodeKind::TableCell(_) => NodeTag::TableCell,
            NodeKind::Line(_) => NodeTag::Line,
            NodeKind::Space(_) => NodeTag::Space,
            NodeKind::Text(_) => NodeTag::Text,
            NodeKind::ListItem(_) => NodeTag::ListItem,
            NodeKind::Photo(_) => NodeTag::Photo,
            NodeKind::PhotoRow(_) => NodeTag::PhotoRow,
            NodeKind::PhotoTable(_) => NodeTag::PhotoTable,
            NodeKind::Picture(_) => NodeTag::Picture,
            NodeKind::Page(_) => NodeTag::Page,
            NodeKind::Report(_) => NodeTag::Report,
        }
    }
}

/// Where a node came from, for diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    pub line: u32,
    pub column: u32,
    pub tracking_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub kind: NodeKind,
    pub bounds: Rectangle,
    pub children: Vec<LayoutNode>,
    pub id: Option<String>,
    /// Chapter scope for this subtree, if the node opens one.
    pub chapter: Option<String>,
    pub static_conditions: Vec<Condition>,
    /// Cached once by the content pass.
    pub static_conditions_satisfied: bool,
    pub content_conditions: Vec<Condition>,
    pub rules: PageBreakRules,
    pub trace: Option<TraceContext>,
    /// First child (or line, or row) that moves on the pending break.
    pub page_split_index: usize,
    /// The child at `page_split_index` splits itself instead of moving whole.
    pub split_within: bool,
    /// Set on never-split nodes after their content moved to the next page.
    pub vacated: bool,
    pub debug: DebugInfo,
}

impl LayoutNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            bounds: Rectangle::default(),
            children: Vec::new(),
            id: None,
            chapter: None,
            static_conditions: Vec::new(),
            static_conditions_satisfied: true,
            content_conditions: Vec::new(),
            rules: PageBreakRules::default(),
            trace: None,
            page_split_index: 0,
            split_within: false,
            vacated: false,
            debug: DebugInfo::default(),
        }
    }

    pub fn group(children: Vec<LayoutNode>) -> Self {
        Self::new(NodeKind::Group).with_children(children)
    }

    pub fn with_children(mut self, children: Vec<LayoutNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_rules(mut self, rules: PageBreakRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    pub fn is_visible(&self) -> bool {
        self.static_conditions_satisfied
    }

    /// Visible and not empty.
    pub fn has_content(&self) -> bool {
        self.is_visible() && !self.is_empty()
    }

    /// Padding from the node's own (already cascaded) style.
    pub fn padding(&self) -> Padding {
        match &self.kind {
            NodeKind::Table(t) => t.style.padding(),
            NodeKind::TableCell(c) => c.style.padding(),
            NodeKind::Line(style) => style.padding(),
            NodeKind::Text(t) => t.style.padding(),
            NodeKind::ListItem(l) => l.style.padding(),
            NodeKind::Photo(p) => p.style.padding(),
            _ => Padding::default(),
        }
    }

    /// Copy of the node without its children and without split state.
    pub fn shallow_clone(&self) -> LayoutNode {
        LayoutNode {
            kind: self.kind.clone(),
            bounds: self.bounds,
            children: Vec::new(),
            id: self.id.clone(),
            chapter: self.chapter.clone(),
            static_conditions: self.static_conditions.clone(),
            static_conditions_satisfied: self.static_conditions_satisfied,
            content_conditions: self.content_conditions.clone(),
            rules: PageBreakRules {
                new_page: false,
                ..self.rules
            },
            trace: self.trace.clone(),
            page_split_index: 0,
            split_within: false,
            vacated: false,
            debug: self.debug.clone(),
        }
    }

    pub fn fits(&self, body: &Rectangle) -> bool {
        self.bounds.bottom >= body.bottom
    }

    /// Move the subtree vertically by `dy`.
    pub fn shift(&mut self, dy: i32) {
        if dy == 0 {
            return;
        }
        self.bounds = offset(self.bounds, dy);
        match &mut self.kind {
            NodeKind::Picture(p) => p.image_box = offset(p.image_box, dy),
            NodeKind::Photo(p) => {
                p.image_box = offset(p.image_box, dy);
                p.caption_box = offset(p.caption_box, dy);
            }
            NodeKind::ListItem(l) => l.bullet.bounds = offset(l.bullet.bounds, dy),
            _ => {}
        }
        for child in &mut self.children {
            child.shift(dy);
        }
    }

    /// Collapse the whole subtree to zero height at `top`.
    pub fn collapse_subtree(&mut self, top: i32) {
        self.bounds = self.bounds.collapsed_at(top);
        match &mut self.kind {
            NodeKind::Picture(p) => p.image_box = p.image_box.collapsed_at(top),
            NodeKind::Photo(p) => {
                p.image_box = p.image_box.collapsed_at(top);
                p.caption_box = p.caption_box.collapsed_at(top);
            }
            NodeKind::ListItem(l) => l.bullet.bounds = l.bullet.bounds.collapsed_at(top),
            _ => {}
        }
        for child in &mut self.children {
            child.collapse_subtree(top);
        }
    }

    pub fn first_content_index(&self) -> Option<usize> {
        self.children.iter().position(|c| c.has_content())
    }

    /// Whether this node, or the content it starts with, asks for a fresh page.
    fn wants_new_page(&self) -> bool {
        if self.rules.new_page {
            return true;
        }
        (self.tag().is_stack() || self.tag() == NodeTag::ListItem)
            && self
                .first_content_index()
                .map(|i| self.children[i].wants_new_page())
                .unwrap_or(false)
    }

    /// Whether a visible child before `index` takes up height. A spacer
    /// collapsed at the top of the page does not.
    fn has_height_before(&self, index: usize) -> bool {
        self.children[..index]
            .iter()
            .any(|c| c.has_content() && c.bounds.height() > 0)
    }

    /// Depth-first, pre-order.
    pub fn walk<F: FnMut(&LayoutNode)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&LayoutNode> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    // ── Protocol ────────────────────────────────────────────────

    /// Place this node inside `bounds` and return its bottom-left corner.
    /// A hidden node takes no space: it returns the top-left of `bounds`.
    pub fn draft(&mut self, bounds: Rectangle, ctx: &LayoutContext<'_>) -> Position {
        self.page_split_index = 0;
        self.split_within = false;
        if !self.is_visible() || self.vacated {
            self.collapse_subtree(bounds.top);
            return bounds.top_left();
        }

        let ctx = ctx.enter(self.trace.as_ref());
        match self.tag() {
            NodeTag::Group | NodeTag::TableCell | NodeTag::Report | NodeTag::PhotoTable => {
                self.draft_stack(bounds, &ctx)
            }
            NodeTag::Page => page::draft_page(self, bounds, &ctx),
            NodeTag::Table => table::draft_table(self, bounds, &ctx),
            NodeTag::TableRow => table::draft_row(self, bounds, &ctx),
            NodeTag::ListItem => list::draft(self, bounds, &ctx),
            NodeTag::Line => leaf::draft_line(self, bounds),
            NodeTag::Space => leaf::draft_space(self, bounds),
            NodeTag::Text => leaf::draft_text(self, bounds, &ctx),
            NodeTag::Picture => leaf::draft_picture(self, bounds),
            NodeTag::Photo => photo::draft_photo(self, bounds),
            NodeTag::PhotoRow => photo::draft_row(self, bounds, &ctx),
        }

        // HandleEmpty: nothing renderable collapses in place
        if self.is_empty() {
            let top = self.bounds.top;
            self.collapse_subtree(top);
        }
        debug_assert!(self.bounds.is_valid(), "inverted bounds {:?}", self.bounds);

        if ctx.trace.trace_layout {
            log::debug!(
                target: "quire::layout",
                "[{}] draft {} at line {} -> top {} bottom {}",
                ctx.trace.owner(),
                self.tag().name(),
                self.debug.line,
                self.bounds.top,
                self.bounds.bottom
            );
        }
        self.bounds.bottom_left()
    }

    /// Restack after an earlier sibling changed height. Heights are kept;
    /// nothing is re-measured.
    pub fn redraft(&mut self, new_top: i32) {
        if !self.has_content() {
            self.collapse_subtree(new_top);
            return;
        }
        match self.tag() {
            NodeTag::Group
            | NodeTag::TableCell
            | NodeTag::Report
            | NodeTag::PhotoTable
            | NodeTag::Table => self.redraft_stack(new_top),
            NodeTag::ListItem => list::redraft(self, new_top),
            NodeTag::Text => leaf::redraft_text(self, new_top),
            NodeTag::Page => {}
            NodeTag::TableRow
            | NodeTag::PhotoRow
            | NodeTag::Line
            | NodeTag::Space
            | NodeTag::Picture
            | NodeTag::Photo => {
                let dy = new_top - self.bounds.top;
                self.shift(dy);
            }
        }
    }

    pub fn assess_page_break(&mut self, body: &Rectangle, ctx: &LayoutContext<'_>) -> BreakVerdict {
        self.page_split_index = 0;
        self.split_within = false;
        if !self.has_content() {
            return BreakVerdict::ThisPage;
        }

        let ctx = ctx.enter(self.trace.as_ref());
        let verdict = match self.tag() {
            NodeTag::Group
            | NodeTag::TableCell
            | NodeTag::Report
            | NodeTag::Page
            | NodeTag::PhotoTable => self.assess_stack(body, &ctx),
            NodeTag::Table => table::assess(self, body),
            NodeTag::ListItem => list::assess(self, body, &ctx),
            NodeTag::Text => leaf::assess_text(self, body),
            NodeTag::TableRow
            | NodeTag::PhotoRow
            | NodeTag::Line
            | NodeTag::Space
            | NodeTag::Picture
            | NodeTag::Photo => {
                if self.fits(body) {
                    BreakVerdict::ThisPage
                } else {
                    BreakVerdict::Overflow
                }
            }
        };
        if verdict != BreakVerdict::Split {
            self.page_split_index = 0;
            self.split_within = false;
        }

        if ctx.trace.trace_layout && verdict != BreakVerdict::ThisPage {
            log::debug!(
                target: "quire::layout",
                "[{}] {} at line {}: {:?} (split index {}, within {})",
                ctx.trace.owner(),
                self.tag().name(),
                self.debug.line,
                verdict,
                self.page_split_index,
                self.split_within
            );
        }
        verdict
    }

    /// Whether the split recorded by the last assessment is acceptable.
    pub fn can_split(&self, body: &Rectangle) -> bool {
        if !self.has_content() {
            return false;
        }
        match self.tag() {
            NodeTag::Group
            | NodeTag::TableCell
            | NodeTag::Report
            | NodeTag::Page
            | NodeTag::PhotoTable => self.can_split_stack(),
            NodeTag::Table => table::can_split(self),
            NodeTag::ListItem => list::can_split(self, body),
            NodeTag::Text => leaf::text_can_split(self),
            NodeTag::TableRow
            | NodeTag::PhotoRow
            | NodeTag::Line
            | NodeTag::Space
            | NodeTag::Picture
            | NodeTag::Photo => false,
        }
    }

    pub fn bump_page_split_index(&mut self) -> BumpResult {
        if !self.has_content() {
            return BumpResult::Impossible;
        }
        match self.tag() {
            NodeTag::Group
            | NodeTag::TableCell
            | NodeTag::Report
            | NodeTag::Page
            | NodeTag::PhotoTable
            | NodeTag::ListItem => self.bump_stack(),
            NodeTag::Table => table::bump(self),
            NodeTag::Text => leaf::bump_text(self),
            NodeTag::TableRow
            | NodeTag::PhotoRow
            | NodeTag::Line
            | NodeTag::Space
            | NodeTag::Picture
            | NodeTag::Photo => BumpResult::Impossible,
        }
    }

    /// Execute the pending split. `self` keeps what stays on this page; the
    /// returned node holds what moves.
    pub fn do_page_break(&mut self) -> Option<LayoutNode> {
        if !self.is_visible() {
            return None;
        }
        let overflow = match self.tag() {
            NodeTag::Group | NodeTag::TableCell | NodeTag::Report | NodeTag::Page => {
                self.break_stack()
            }
            NodeTag::PhotoTable => photo::break_photo_table(self),
            NodeTag::Table => table::do_break(self),
            NodeTag::ListItem => list::do_break(self),
            NodeTag::Text => leaf::break_text(self),
            NodeTag::TableRow
            | NodeTag::PhotoRow
            | NodeTag::Line
            | NodeTag::Space
            | NodeTag::Picture
            | NodeTag::Photo => self.vacate(),
        };
        self.page_split_index = 0;
        self.split_within = false;
        overflow
    }

    pub fn is_empty(&self) -> bool {
        if !self.static_conditions_satisfied || self.vacated {
            return true;
        }
        match &self.kind {
            NodeKind::Space(_) | NodeKind::Line(_) => false,
            NodeKind::Text(t) => t.is_blank(),
            NodeKind::Picture(p) => p.info.is_none(),
            NodeKind::Photo(p) => p.photo.is_none(),
            NodeKind::Table(_) => table::is_empty(self),
            NodeKind::Group
            | NodeKind::TableRow(_)
            | NodeKind::TableCell(_)
            | NodeKind::ListItem(_)
            | NodeKind::PhotoRow(_)
            | NodeKind::PhotoTable(_)
            | NodeKind::Page(_)
            | NodeKind::Report(_) => self.children.iter().all(|c| c.is_empty()),
        }
    }

    /// Remove blank space left at the top of a page. Returns `false` once a
    /// spacer collapsed; containers keep going through leading children while
    /// they return `true` and have nothing visible.
    pub fn collapse_top_space(&mut self) -> bool {
        if !self.is_visible() {
            return true;
        }
        match self.tag() {
            NodeTag::Space => {
                leaf::collapse_space(self);
                false
            }
            NodeTag::Line
            | NodeTag::Photo
            | NodeTag::PhotoRow
            | NodeTag::Picture
            | NodeTag::Text
            | NodeTag::Table
            | NodeTag::TableRow
            | NodeTag::PhotoTable => true,
            NodeTag::Group
            | NodeTag::ListItem
            | NodeTag::TableCell
            | NodeTag::Page
            | NodeTag::Report => {
                for child in &mut self.children {
                    if !child.collapse_top_space() {
                        return false;
                    }
                    if child.has_content() {
                        return true;
                    }
                }
                true
            }
        }
    }

    /// Fold `other`'s content into this node. Only photo tables merge;
    /// every other kind ignores `other`.
    pub fn merge_content(&mut self, other: LayoutNode) -> &mut Self {
        if self.tag() == NodeTag::PhotoTable {
            photo::merge_tables(self, other);
        }
        self
    }

    // ── Vertical stack behaviour ────────────────────────────────

    pub(crate) fn draft_stack(&mut self, bounds: Rectangle, ctx: &LayoutContext<'_>) {
        let padding = self.padding();
        let inner = bounds.inset(&padding);
        let y = stack_children(&mut self.children, inner, ctx);
        let bottom = (y - padding.bottom).min(bounds.top);
        self.bounds = Rectangle::new(bounds.left, bottom, bounds.right, bounds.top);
    }

    pub(crate) fn redraft_stack(&mut self, new_top: i32) {
        let padding = self.padding();
        let y = restack_children(&mut self.children, new_top - padding.top);
        let bottom = (y - padding.bottom).min(new_top);
        self.bounds = Rectangle::new(self.bounds.left, bottom, self.bounds.right, new_top);
    }

    pub(crate) fn assess_stack(&mut self, body: &Rectangle, ctx: &LayoutContext<'_>) -> BreakVerdict {
        let Some(first) = self.first_content_index() else {
            return BreakVerdict::ThisPage;
        };

        let mut found = None;
        for i in first..self.children.len() {
            if !self.children[i].has_content() {
                continue;
            }
            if self.children[i].wants_new_page() && self.has_height_before(i) {
                found = Some((i, false));
                break;
            }
            let child = &mut self.children[i];
            match child.assess_page_break(body, ctx) {
                BreakVerdict::ThisPage => {}
                BreakVerdict::Split if child.can_split(body) => {
                    found = Some((i, true));
                    break;
                }
                _ => {
                    child.page_split_index = 0;
                    child.split_within = false;
                    found = Some((i, false));
                    break;
                }
            }
        }

        let Some((mut index, within)) = found else {
            return BreakVerdict::ThisPage;
        };
        if !within {
            // keep-with-next pulls predecessors along with a moving child
            while let Some(prev) = self.children[..index].iter().rposition(|c| c.has_content()) {
                if !self.children[prev].rules.keep_with_next {
                    break;
                }
                index = prev;
            }
            if index <= first {
                return BreakVerdict::Overflow;
            }
        }
        self.page_split_index = index;
        self.split_within = within;
        BreakVerdict::Split
    }

    pub(crate) fn can_split_stack(&self) -> bool {
        let index = self.page_split_index.min(self.children.len());
        (self.split_within && index < self.children.len())
            || self.children[..index].iter().any(|c| c.has_content())
    }

    pub(crate) fn bump_stack(&mut self) -> BumpResult {
        if self.can_split_stack() {
            return BumpResult::Unnecessary;
        }
        let Some(first) = self.first_content_index() else {
            return BumpResult::Impossible;
        };
        match self.children[first].bump_page_split_index() {
            BumpResult::Bumped | BumpResult::Unnecessary => {
                self.page_split_index = first;
                self.split_within = true;
            }
            BumpResult::Impossible => {
                if !self.children[first + 1..].iter().any(|c| c.has_content()) {
                    return BumpResult::Impossible;
                }
                self.page_split_index = first + 1;
                self.split_within = false;
            }
        }
        BumpResult::Bumped
    }

    pub(crate) fn break_stack(&mut self) -> Option<LayoutNode> {
        let index = self.page_split_index.min(self.children.len());
        let mut moved = Vec::new();
        if self.split_within && index < self.children.len() {
            if let Some(part) = self.children[index].do_page_break() {
                moved.push(part);
            }
            moved.extend(self.children.drain(index + 1..));
        } else {
            moved.extend(self.children.drain(index..));
        }
        if moved.is_empty() {
            return None;
        }
        let mut overflow = self.shallow_clone();
        overflow.children = moved;
        Some(overflow)
    }

    /// Move everything to the next page and leave an empty husk behind.
    pub(crate) fn vacate(&mut self) -> Option<LayoutNode> {
        if self.vacated {
            return None;
        }
        let mut moved = self.clone();
        moved.page_split_index = 0;
        moved.split_within = false;
        moved.rules.new_page = false;
        self.vacated = true;
        let top = self.bounds.top;
        self.collapse_subtree(top);
        Some(moved)
    }
}

/// Stack `children` top-down inside `area`; returns the Y below the last one.
pub(crate) fn stack_children(
    children: &mut [LayoutNode],
    area: Rectangle,
    ctx: &LayoutContext<'_>,
) -> i32 {
    let mut y = area.top;
    for child in children.iter_mut() {
        let slot = Rectangle::new(area.left, area.bottom.min(y), area.right, y);
        y = child.draft(slot, ctx).y;
    }
    y
}

/// Redraft `children` top-down from `top`; returns the Y below the last one.
pub(crate) fn restack_children(children: &mut [LayoutNode], top: i32) -> i32 {
    let mut y = top;
    for child in children.iter_mut() {
        child.redraft(y);
        y = child.bounds.bottom;
    }
    y
}

fn offset(r: Rectangle, dy: i32) -> Rectangle {
    Rectangle::new(r.left, r.bottom + dy, r.right, r.top + dy)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the per-kind unit tests.

    use super::*;
    use crate::style::TextStyle;
    use crate::text::WrappedLine;

    /// Every word on its own line, 10 units per line.
    pub struct WordPerLine;

    impl LineWrapper for WordPerLine {
        fn wrap(&self, text: &str, _style: &TextStyle, _max_width: i32) -> Vec<WrappedLine> {
            text.split_whitespace()
                .map(|w| WrappedLine {
                    text: w.to_string(),
                    width: 5 * w.chars().count() as i32,
                    hard_break: true,
                })
                .collect()
        }

        fn line_height(&self, _style: &TextStyle) -> i32 {
            10
        }
    }

    pub fn ctx() -> LayoutContext<'static> {
        LayoutContext::new(&WordPerLine)
    }

    pub fn text(words: &str) -> LayoutNode {
        LayoutNode::new(NodeKind::Text(TextLayout::literal(
            Arc::new(TextStyle::default()),
            words,
        )))
    }

    pub fn space(height: i32) -> LayoutNode {
        LayoutNode::new(NodeKind::Space(SpaceLayout {
            height,
            collapsed: false,
        }))
    }

    pub fn hidden(mut node: LayoutNode) -> LayoutNode {
        node.static_conditions_satisfied = false;
        node
    }

    pub fn page() -> Rectangle {
        Rectangle::new(0, 0, 200, 100)
    }
}
