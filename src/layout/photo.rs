//! Photo tables: photos gathered from content sources and packed into rows.

use std::sync::Arc;

use crate::condition::ContextScope;
use crate::content::{PhotoRecord, SourceRef};
use crate::geometry::Rectangle;
use crate::style::PhotoStyle;

use super::{LayoutContext, LayoutNode, NodeKind};

#[derive(Debug, Clone)]
pub struct PhotoLayout {
    pub style: Arc<PhotoStyle>,
    /// Source of a standalone photo; `None` inside a photo table.
    pub source: Option<Arc<SourceRef>>,
    /// Which of the source's photos to show.
    pub index: usize,
    pub photo: Option<PhotoRecord>,
    pub image_box: Rectangle,
    pub caption_box: Rectangle,
}

impl PhotoLayout {
    pub fn resolved(style: Arc<PhotoStyle>, photo: PhotoRecord) -> Self {
        Self {
            style,
            source: None,
            index: 0,
            photo: Some(photo),
            image_box: Rectangle::default(),
            caption_box: Rectangle::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoTableLayout {
    pub style: Arc<PhotoStyle>,
    pub columns: usize,
    pub sources: Vec<Arc<SourceRef>>,
    pub context: ContextScope,
    /// Merge with an adjacent compatible photo table.
    pub merge: bool,
    /// Resolved photos, in display order.
    pub photos: Vec<PhotoRecord>,
}

impl PhotoTableLayout {
    /// Whether two photo tables may be merged into one.
    pub fn compatible(&self, other: &PhotoTableLayout) -> bool {
        self.merge
            && other.merge
            && self.columns == other.columns
            && (Arc::ptr_eq(&self.style, &other.style) || *self.style == *other.style)
    }
}

/// Image size for a photo `width_px` × `height_px` fitted to `available`
/// width, keeping the aspect ratio and capped at `max_height`.
fn fit_box(width_px: u32, height_px: u32, available: i32, max_height: Option<i32>) -> (i32, i32) {
    let wp = width_px.max(1) as i64;
    let hp = height_px.max(1) as i64;
    let mut w = available.max(0) as i64;
    let mut h = w * hp / wp;
    if let Some(max) = max_height.filter(|m| *m > 0) {
        if h > max as i64 {
            h = max as i64;
            w = h * wp / hp;
        }
    }
    (w as i32, h as i32)
}

pub(crate) fn draft_photo(node: &mut LayoutNode, bounds: Rectangle) {
    let padding = node.padding();
    let inner = bounds.inset(&padding);
    let NodeKind::Photo(p) = &mut node.kind else {
        return;
    };
    let Some(photo) = &p.photo else {
        node.bounds = bounds.collapsed_at(bounds.top);
        return;
    };

    let (w, h) = fit_box(photo.width_px, photo.height_px, inner.width(), p.style.max_height);
    let caption = if photo.caption.is_some() {
        p.style.caption_height()
    } else {
        0
    };
    let left = inner.left + (inner.width() - w) / 2;
    p.image_box = Rectangle::new(left, inner.top - h, left + w, inner.top);
    p.caption_box = Rectangle::new(inner.left, inner.top - h - caption, inner.right, inner.top - h);

    let height = h + caption + padding.vertical();
    node.bounds = Rectangle::new(bounds.left, bounds.top - height, bounds.right, bounds.top);
}

pub(crate) fn draft_row(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    let columns = match &node.kind {
        NodeKind::PhotoRow(c) => (*c).max(1),
        _ => 1,
    };
    let width = bounds.width().max(0) / columns as i32;
    let mut bottom = bounds.top;
    for (i, photo) in node.children.iter_mut().enumerate() {
        let left = bounds.left + i as i32 * width;
        let area = Rectangle::new(left, bounds.bottom.min(bounds.top), left + width, bounds.top);
        bottom = bottom.min(photo.draft(area, ctx).y);
    }
    node.bounds = Rectangle::new(bounds.left, bottom, bounds.right, bounds.top);
}

/// Replace the table's rows with rows of `columns` photos.
pub fn rebuild_rows(node: &mut LayoutNode) {
    let NodeKind::PhotoTable(table) = &node.kind else {
        return;
    };
    let columns = table.columns.max(1);
    let rows = table
        .photos
        .chunks(columns)
        .map(|chunk| {
            let photos = chunk
                .iter()
                .map(|p| {
                    LayoutNode::new(NodeKind::Photo(PhotoLayout::resolved(
                        Arc::clone(&table.style),
                        p.clone(),
                    )))
                })
                .collect();
            LayoutNode::new(NodeKind::PhotoRow(columns)).with_children(photos)
        })
        .collect();
    node.children = rows;
}

/// Recompute the photo list from the rows actually held.
fn sync_photos(node: &mut LayoutNode) {
    let photos: Vec<PhotoRecord> = node
        .children
        .iter()
        .filter(|row| !row.vacated)
        .flat_map(|row| row.children.iter())
        .filter_map(|p| match &p.kind {
            NodeKind::Photo(photo) => photo.photo.clone(),
            _ => None,
        })
        .collect();
    if let NodeKind::PhotoTable(table) = &mut node.kind {
        table.photos = photos;
    }
}

pub(crate) fn break_photo_table(node: &mut LayoutNode) -> Option<LayoutNode> {
    let mut overflow = node.break_stack()?;
    sync_photos(node);
    sync_photos(&mut overflow);
    Some(overflow)
}

pub(crate) fn merge_tables(node: &mut LayoutNode, other: LayoutNode) {
    let NodeKind::PhotoTable(extra) = other.kind else {
        return;
    };
    if let NodeKind::PhotoTable(table) = &mut node.kind {
        for photo in extra.photos {
            if !table.photos.iter().any(|p| p.id == photo.id) {
                table.photos.push(photo);
            }
        }
        for source in extra.sources {
            if !table.sources.contains(&source) {
                table.sources.push(source);
            }
        }
    }
    rebuild_rows(node);
}
