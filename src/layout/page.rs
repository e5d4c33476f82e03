//! # Pagination Driver
//!
//! Holds one page's body box and repeatedly drafts the pending root into
//! it. When the root does not fit, the root is split (or, when nothing at
//! all fits, the split point is bumped forward) and the overflow seeds the
//! next page. Pages whose root ends up empty are dropped, and only then,
//! once the page count is known, headers and footers are laid out.

use std::sync::Arc;

use crate::content::{ContentResolver, Diagnostics};
use crate::design::DesignElement;
use crate::error::{DesignError, Result};
use crate::geometry::{Padding, Rectangle};
use crate::image_loader::{ImageLibrary, ImageService};
use crate::text::{GreedyWrapper, LineWrapper};

use super::content::load_content;
use super::load::load_report;
use super::page_break::{BreakVerdict, BumpResult};
use super::{restack_children, LayoutContext, LayoutNode, NodeKind};

/// Page geometry and the header/footer templates of a report.
#[derive(Debug, Clone)]
pub struct PageSetup {
    pub width: i32,
    pub height: i32,
    pub margins: Padding,
    pub header: Option<LayoutNode>,
    pub footer: Option<LayoutNode>,
}

#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub setup: Arc<PageSetup>,
}

/// A finalized page: its number, the bands and the laid-out header and
/// footer. The page's single child is the body root.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub number: usize,
    pub count: usize,
    pub body: Rectangle,
    pub header_band: Rectangle,
    pub footer_band: Rectangle,
    pub header: Option<Box<LayoutNode>>,
    pub footer: Option<Box<LayoutNode>>,
}

/// The result of a generation run.
#[derive(Debug)]
pub struct Generation {
    /// `Page` nodes, in order.
    pub pages: Vec<LayoutNode>,
    pub diagnostics: Diagnostics,
}

/// Page rectangles derived from a `PageSetup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFrame {
    pub page: Rectangle,
    pub header_band: Rectangle,
    pub body: Rectangle,
    pub footer_band: Rectangle,
}

impl PageFrame {
    /// Reserve the drafted height of the header and footer templates inside
    /// the margins; what is left is the body box.
    pub fn measure(setup: &PageSetup, ctx: &LayoutContext<'_>) -> std::result::Result<Self, String> {
        let page = Rectangle::new(0, 0, setup.width, setup.height);
        let inner = page.inset(&setup.margins);
        let header = band_height(setup.header.as_ref(), inner, ctx);
        let footer = band_height(setup.footer.as_ref(), inner, ctx);
        let body = Rectangle::new(inner.left, inner.bottom + footer, inner.right, inner.top - header);
        if body.height() <= 0 || body.width() <= 0 {
            return Err(format!(
                "margins, header ({}) and footer ({}) leave no room for the body of a {}x{} page",
                header, footer, setup.width, setup.height
            ));
        }
        Ok(Self {
            page,
            header_band: Rectangle::new(inner.left, body.top, inner.right, inner.top),
            body,
            footer_band: Rectangle::new(inner.left, inner.bottom, inner.right, body.bottom),
        })
    }
}

fn band_height(template: Option<&LayoutNode>, area: Rectangle, ctx: &LayoutContext<'_>) -> i32 {
    template
        .map(|t| {
            let mut probe = t.clone();
            probe.draft(area, ctx);
            probe.bounds.height()
        })
        .unwrap_or(0)
}

/// Replace `{page}` and `{pages}` in literal text.
pub fn substitute_tokens(node: &mut LayoutNode, number: usize, count: usize) {
    if let NodeKind::Text(text) = &mut node.kind {
        if text.content.contains("{page") {
            let content = text
                .content
                .replace("{pages}", &count.to_string())
                .replace("{page}", &number.to_string());
            text.set_content(content);
        }
    }
    for child in &mut node.children {
        substitute_tokens(child, number, count);
    }
}

pub(crate) fn draft_page(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    node.bounds = bounds;
    let NodeKind::Page(page) = &mut node.kind else {
        return;
    };
    if let Some(header) = page.header.as_deref_mut() {
        header.draft(page.header_band, ctx);
    }
    if let Some(footer) = page.footer.as_deref_mut() {
        footer.draft(page.footer_band, ctx);
    }
    let top = page.body.top;
    restack_children(&mut node.children, top);
}

/// Drives load, content resolution and pagination with pluggable services.
pub struct LayoutEngine {
    wrapper: Box<dyn LineWrapper>,
    images: Box<dyn ImageService>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            wrapper: Box::new(GreedyWrapper),
            images: Box::new(ImageLibrary::default()),
        }
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrapper(mut self, wrapper: impl LineWrapper + 'static) -> Self {
        self.wrapper = Box::new(wrapper);
        self
    }

    pub fn with_images(mut self, images: impl ImageService + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    /// Load a design, resolve its content and paginate it.
    pub fn generate(&self, design: &DesignElement, resolver: &dyn ContentResolver) -> Result<Generation> {
        let mut report = load_report(design)?;
        let diagnostics = load_content(&mut report, resolver, self.images.as_ref());
        let pages = self.paginate(report)?;
        Ok(Generation { pages, diagnostics })
    }

    /// Paginate a report whose content has been resolved.
    pub fn paginate(&self, report: LayoutNode) -> Result<Vec<LayoutNode>> {
        let NodeKind::Report(layout) = &report.kind else {
            return Err(DesignError::new(
                format!("cannot paginate a <{}>", report.tag().name()),
                report.debug.line,
                report.debug.column,
            )
            .into());
        };
        let setup = Arc::clone(&layout.setup);
        let root_ctx = LayoutContext::new(self.wrapper.as_ref());
        let ctx = root_ctx.enter(report.trace.as_ref());
        let frame = PageFrame::measure(&setup, &ctx)
            .map_err(|message| DesignError::new(message, report.debug.line, report.debug.column))?;

        let roots = self.break_into_pages(report, &frame, &ctx);
        let count = roots.len();
        if ctx.trace.trace_outline {
            log::debug!(target: "quire::paginate", "[{}] {} pages", ctx.trace.owner(), count);
        }

        // late pass: page numbers are final now
        let pages = roots
            .into_iter()
            .enumerate()
            .map(|(i, root)| {
                let number = i + 1;
                let band = |template: &Option<LayoutNode>| {
                    template.as_ref().map(|t| {
                        let mut t = t.clone();
                        substitute_tokens(&mut t, number, count);
                        Box::new(t)
                    })
                };
                let mut page = LayoutNode::new(NodeKind::Page(PageLayout {
                    number,
                    count,
                    body: frame.body,
                    header_band: frame.header_band,
                    footer_band: frame.footer_band,
                    header: band(&setup.header),
                    footer: band(&setup.footer),
                }))
                .with_children(vec![root]);
                page.draft(frame.page, &ctx);
                page
            })
            .collect();
        Ok(pages)
    }

    fn break_into_pages(
        &self,
        report: LayoutNode,
        frame: &PageFrame,
        ctx: &LayoutContext<'_>,
    ) -> Vec<LayoutNode> {
        let body = frame.body;
        let mut roots = Vec::new();
        let mut pending = Some(report);

        while let Some(mut root) = pending.take() {
            if !roots.is_empty() {
                root.collapse_top_space();
            }
            root.draft(body, ctx);

            let verdict = root.assess_page_break(&body, ctx);
            if verdict == BreakVerdict::ThisPage {
                roots.push(root);
                continue;
            }
            if verdict.moves_whole() || !root.can_split(&body) {
                root.page_split_index = 0;
                root.split_within = false;
                if root.bump_page_split_index() == BumpResult::Impossible {
                    log::warn!(
                        target: "quire::paginate",
                        "page {}: content taller than the body box cannot be divided; placing it whole",
                        roots.len() + 1
                    );
                    roots.push(root);
                    continue;
                }
            }

            pending = root.do_page_break();
            root.redraft(body.top);
            if ctx.trace.trace_outline {
                log::debug!(
                    target: "quire::paginate",
                    "[{}] page {} ends at {} ({:?})",
                    ctx.trace.owner(),
                    roots.len() + 1,
                    root.bounds.bottom,
                    verdict
                );
            }
            roots.push(root);
        }

        let before = roots.len();
        roots.retain(|r| !r.is_empty());
        if roots.len() != before {
            log::debug!(target: "quire::paginate", "dropped {} empty pages", before - roots.len());
        }
        roots
    }
}
