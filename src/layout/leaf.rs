//! Leaf kinds: spacers, rules, text blocks and pictures.

use std::sync::Arc;

use crate::content::SourceRef;
use crate::geometry::Rectangle;
use crate::image_loader::ImageInfo;
use crate::style::{Cascade, TextStyle};
use crate::text::WrappedLine;

use super::page_break::{adjust_split, BreakVerdict, BumpResult};
use super::{LayoutContext, LayoutNode, NodeKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceLayout {
    pub height: i32,
    /// Set when the spacer landed at the top of a page.
    pub collapsed: bool,
}

#[derive(Debug, Clone)]
pub struct TextLayout {
    pub style: Arc<TextStyle>,
    pub source: Option<Arc<SourceRef>>,
    pub content: String,
    /// Cached wrap result, valid for `wrapped_width`.
    pub lines: Option<Vec<WrappedLine>>,
    pub wrapped_width: i32,
    pub line_height: i32,
}

impl TextLayout {
    pub fn literal(style: Arc<TextStyle>, content: &str) -> Self {
        Self {
            style,
            source: None,
            content: content.to_string(),
            lines: None,
            wrapped_width: 0,
            line_height: 0,
        }
    }

    pub fn is_blank(&self) -> bool {
        match &self.lines {
            Some(lines) => lines.iter().all(|l| l.text.trim().is_empty()),
            None => self.content.trim().is_empty(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.as_ref().map(Vec::len).unwrap_or(0)
    }

    fn text_height(&self) -> i32 {
        self.line_count() as i32 * self.line_height
    }

    /// Replace the text and drop the cached wrap.
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.lines = None;
        self.wrapped_width = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PictureLayout {
    pub file: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub align: Align,
    /// Natural size, once the image service resolved the file.
    pub info: Option<ImageInfo>,
    /// Target box handed to the renderer.
    pub image_box: Rectangle,
}

impl PictureLayout {
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            width: None,
            height: None,
            align: Align::Left,
            info: None,
            image_box: Rectangle::default(),
        }
    }
}

fn band(bounds: &Rectangle, height: i32) -> Rectangle {
    Rectangle::new(bounds.left, bounds.top - height.max(0), bounds.right, bounds.top)
}

// ── Space ───────────────────────────────────────────────────────

pub(crate) fn draft_space(node: &mut LayoutNode, bounds: Rectangle) {
    let height = match &node.kind {
        NodeKind::Space(s) if !s.collapsed => s.height,
        _ => 0,
    };
    node.bounds = band(&bounds, height);
}

pub(crate) fn collapse_space(node: &mut LayoutNode) {
    if let NodeKind::Space(s) = &mut node.kind {
        s.collapsed = true;
    }
    let top = node.bounds.top;
    node.bounds = node.bounds.collapsed_at(top);
}

// ── Line ────────────────────────────────────────────────────────

pub(crate) fn draft_line(node: &mut LayoutNode, bounds: Rectangle) {
    let height = match &node.kind {
        NodeKind::Line(style) => style.padding().vertical() + style.thickness(),
        _ => 0,
    };
    node.bounds = band(&bounds, height);
}

// ── Text ────────────────────────────────────────────────────────

pub(crate) fn draft_text(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    let padding = node.padding();
    let width = bounds.inset(&padding).width();
    let NodeKind::Text(text) = &mut node.kind else {
        return;
    };

    if text.lines.is_none() || text.wrapped_width != width {
        let lines = ctx.wrapper.wrap(&text.content, &text.style, width);
        if ctx.trace.trace_text {
            log::debug!(
                target: "quire::layout",
                "[{}] wrapped {} chars into {} lines at width {}",
                ctx.trace.owner(),
                text.content.chars().count(),
                lines.len(),
                width
            );
        }
        text.lines = Some(lines);
        text.wrapped_width = width;
    }
    text.line_height = ctx.wrapper.line_height(&text.style);
    let height = text.text_height() + padding.vertical();
    node.bounds = band(&bounds, height);
}

pub(crate) fn redraft_text(node: &mut LayoutNode, new_top: i32) {
    let height = match &node.kind {
        NodeKind::Text(text) => text.text_height() + node.padding().vertical(),
        _ => node.bounds.height(),
    };
    node.bounds = Rectangle::new(node.bounds.left, new_top - height, node.bounds.right, new_top);
}

pub(crate) fn assess_text(node: &mut LayoutNode, body: &Rectangle) -> BreakVerdict {
    if node.fits(body) {
        return BreakVerdict::ThisPage;
    }
    let padding = node.padding();
    let NodeKind::Text(text) = &node.kind else {
        return BreakVerdict::Overflow;
    };
    let total = text.line_count();
    let line_height = text.line_height.max(1);
    let first_top = node.bounds.top - padding.top;
    let fit = (1..=total)
        .take_while(|n| first_top - *n as i32 * line_height - padding.bottom >= body.bottom)
        .count();

    match adjust_split(fit, total, node.rules.min_lines) {
        Some(k) => {
            node.page_split_index = k;
            BreakVerdict::Split
        }
        None => BreakVerdict::Overflow,
    }
}

pub(crate) fn text_can_split(node: &LayoutNode) -> bool {
    let NodeKind::Text(text) = &node.kind else {
        return false;
    };
    let k = node.page_split_index;
    let total = text.line_count();
    let min = node.rules.min_lines.max(1);
    k > 0 && k < total && k >= min && total - k >= min
}

pub(crate) fn bump_text(node: &mut LayoutNode) -> BumpResult {
    let total = match &node.kind {
        NodeKind::Text(text) => text.line_count(),
        _ => 0,
    };
    if node.page_split_index > 0 && node.page_split_index < total {
        return BumpResult::Unnecessary;
    }
    if total < 2 {
        return BumpResult::Impossible;
    }
    node.page_split_index = 1;
    BumpResult::Bumped
}

pub(crate) fn break_text(node: &mut LayoutNode) -> Option<LayoutNode> {
    let index = node.page_split_index;
    let mut overflow = node.shallow_clone();
    let NodeKind::Text(text) = &mut node.kind else {
        return None;
    };
    let lines = text.lines.get_or_insert_with(Vec::new);
    if index >= lines.len() {
        return None;
    }
    let moved = lines.split_off(index);
    text.content = joined(lines);

    if let NodeKind::Text(rest) = &mut overflow.kind {
        rest.content = joined(&moved);
        rest.lines = Some(moved);
    }
    Some(overflow)
}

/// Rebuild source text from wrapped lines, restoring the newlines the
/// wrapper consumed at mandatory breaks.
fn joined(lines: &[WrappedLine]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&line.text);
        if line.hard_break && i + 1 < lines.len() {
            out.push('\n');
        }
    }
    out
}

// ── Picture ─────────────────────────────────────────────────────

/// Pixels to user-space units at 96 dpi.
fn px_to_units(px: u32) -> i32 {
    (px as i64 * 3 / 4) as i32
}

fn scale(value: i32, num: i32, den: i32) -> i32 {
    (value as i64 * num as i64 / den.max(1) as i64) as i32
}

pub(crate) fn draft_picture(node: &mut LayoutNode, bounds: Rectangle) {
    let NodeKind::Picture(pic) = &mut node.kind else {
        return;
    };
    let Some(info) = pic.info else {
        pic.image_box = bounds.collapsed_at(bounds.top);
        node.bounds = bounds.collapsed_at(bounds.top);
        return;
    };

    let available = bounds.width().max(0);
    let natural_w = px_to_units(info.width_px).max(1);
    let natural_h = px_to_units(info.height_px).max(1);
    let (mut w, mut h) = match (pic.width, pic.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale(natural_h, w, natural_w)),
        (None, Some(h)) => (scale(natural_w, h, natural_h), h),
        (None, None) => (natural_w, natural_h),
    };
    if w > available {
        h = scale(h, available, w);
        w = available;
    }
    let (w, h) = (w.max(0), h.max(0));

    let left = match pic.align {
        Align::Left => bounds.left,
        Align::Center => bounds.left + (available - w) / 2,
        Align::Right => bounds.right - w,
    };
    pic.image_box = Rectangle::new(left, bounds.top - h, left + w, bounds.top);
    node.bounds = band(&bounds, h);
}
