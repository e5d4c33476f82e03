//! # Content Pass
//!
//! Runs before pagination as two walks over the whole tree.
//!
//! The first walk resolves each node's own content (text sources,
//! pictures, photos), recurses into the children inside the node's chapter
//! scope, and records the node's content emptiness under its `id`.
//!
//! The second walk, once every `id` is known:
//!
//! 1. settles the children first,
//! 2. numbers list runs and merges compatible adjacent photo tables among
//!    the children, now that their visibility is known,
//! 3. evaluates and caches the node's static conditions,
//! 4. revises the node's recorded emptiness, hidden counting as empty.
//!
//! `EmptyLayout` therefore sees layouts anywhere in the document. Layouts
//! settled earlier in the second walk answer with their final emptiness;
//! later ones with their content emptiness.
//!
//! Resolution failures never abort the pass: the node ends up empty and the
//! failure is counted in `Diagnostics`.

use std::sync::Arc;

use crate::condition::{all_satisfied, Condition, ContextScope, EvalEnv, LayoutRegistry};
use crate::content::{ContentResolver, Diagnostics, PhotoRecord, ResolveScope};
use crate::image_loader::ImageService;
use crate::trace::TraceContext;

use super::{list, photo, LayoutNode, NodeKind};

/// Resolve every node's content in place.
pub fn load_content(
    root: &mut LayoutNode,
    resolver: &dyn ContentResolver,
    images: &dyn ImageService,
) -> Diagnostics {
    let mut pass = ContentPass {
        resolver,
        images,
        layouts: LayoutRegistry::default(),
        diagnostics: Diagnostics::default(),
    };
    pass.resolve(root, None, &TraceContext::off());
    pass.settle(root, None, &TraceContext::off());
    if !pass.diagnostics.is_clean() {
        log::warn!(
            target: "quire::content",
            "content resolved with gaps: {} missing resources, {} missing photos, {} missing content",
            pass.diagnostics.missing_resources,
            pass.diagnostics.missing_photos,
            pass.diagnostics.missing_content
        );
    }
    pass.diagnostics
}

struct ContentPass<'a> {
    resolver: &'a dyn ContentResolver,
    images: &'a dyn ImageService,
    layouts: LayoutRegistry,
    diagnostics: Diagnostics,
}

impl<'a> ContentPass<'a> {
    fn resolve(&mut self, node: &mut LayoutNode, chapter: Option<&str>, trace: &TraceContext) {
        let trace = trace.push(node.trace.as_ref());
        let own_chapter = node.chapter.clone();
        let chapter = own_chapter.as_deref().or(chapter);

        self.resolve_own(node, chapter, &trace);
        for child in &mut node.children {
            self.resolve(child, chapter, &trace);
        }
        if let Some(id) = &node.id {
            self.layouts.record(id, chapter, node.is_empty());
        }
    }

    /// Must visit nodes in the same order as `resolve`, so that each
    /// `revise` lands on the record of the same node.
    fn settle(&mut self, node: &mut LayoutNode, chapter: Option<&str>, trace: &TraceContext) {
        let trace = trace.push(node.trace.as_ref());
        let own_chapter = node.chapter.clone();
        let chapter = own_chapter.as_deref().or(chapter);

        if let NodeKind::Report(report) = &mut node.kind {
            let setup = Arc::make_mut(&mut report.setup);
            for template in [&mut setup.header, &mut setup.footer].into_iter().flatten() {
                self.settle(template, chapter, &trace);
            }
        }
        for child in &mut node.children {
            self.settle(child, chapter, &trace);
        }
        list::renumber(&mut node.children);
        merge_photo_tables(&mut node.children);

        let env = EvalEnv {
            resolver: self.resolver,
            scope: ResolveScope {
                context: ContextScope::Local,
                chapter,
                item: None,
            },
            layouts: &self.layouts,
        };
        node.static_conditions_satisfied = all_satisfied(&node.static_conditions, &env);
        if trace.trace_path && !node.static_conditions_satisfied {
            log::debug!(
                target: "quire::content",
                "[{}] {} at line {} hidden by its conditions",
                trace.owner(),
                node.tag().name(),
                node.debug.line
            );
        }

        if let Some(id) = &node.id {
            self.layouts.revise(id, chapter, node.is_empty());
        }
    }

    fn item_passes(&self, conditions: &[Condition], item: &PhotoRecord, chapter: Option<&str>) -> bool {
        let env = EvalEnv {
            resolver: self.resolver,
            scope: ResolveScope {
                context: ContextScope::Local,
                chapter,
                item: Some(item),
            },
            layouts: &self.layouts,
        };
        all_satisfied(conditions, &env)
    }

    fn resolve_own(&mut self, node: &mut LayoutNode, chapter: Option<&str>, trace: &TraceContext) {
        let scope = ResolveScope {
            context: ContextScope::Local,
            chapter,
            item: None,
        };
        let line = node.debug.line;

        match &mut node.kind {
            NodeKind::Text(text) => {
                let Some(source) = text.source.clone() else {
                    return;
                };
                match self.resolver.text(&source, &scope) {
                    Ok(value) => {
                        if trace.trace_path {
                            log::debug!(
                                target: "quire::content",
                                "[{}] text {} resolved ({} chars)",
                                trace.owner(),
                                source,
                                value.chars().count()
                            );
                        }
                        text.set_content(value);
                    }
                    Err(e) => {
                        self.diagnostics.missing_content += 1;
                        log::warn!(target: "quire::content", "text at line {}: {}", line, e);
                        text.set_content(String::new());
                    }
                }
            }
            NodeKind::Picture(pic) => match self.images.info(&pic.file) {
                Ok(info) => pic.info = Some(info),
                Err(e) => {
                    self.diagnostics.missing_resources += 1;
                    log::warn!(target: "quire::content", "picture at line {}: {}", line, e);
                    pic.info = None;
                }
            },
            NodeKind::Photo(p) => {
                let Some(source) = p.source.clone() else {
                    return;
                };
                let candidates = match self.resolver.photos(&source, &scope) {
                    Ok(found) => found,
                    Err(e) => {
                        log::warn!(target: "quire::content", "photo at line {}: {}", line, e);
                        Vec::new()
                    }
                };
                let conditions = &node.content_conditions;
                p.photo = candidates
                    .into_iter()
                    .filter(|c| self.item_passes(conditions, c, chapter))
                    .nth(p.index);
                if p.photo.is_none() {
                    self.diagnostics.missing_photos += 1;
                }
            }
            NodeKind::PhotoTable(table) => {
                let scope = scope.with_context(table.context);
                let mut photos: Vec<PhotoRecord> = Vec::new();
                for source in &table.sources {
                    let found = match self.resolver.photos(source, &scope) {
                        Ok(found) => found,
                        Err(e) => {
                            self.diagnostics.missing_photos += 1;
                            log::warn!(target: "quire::content", "photo table at line {}: {}", line, e);
                            continue;
                        }
                    };
                    for candidate in found {
                        // first matching association wins
                        if photos.iter().any(|p| p.id == candidate.id) {
                            continue;
                        }
                        if self.item_passes(&node.content_conditions, &candidate, chapter) {
                            photos.push(candidate);
                        }
                    }
                }
                if trace.trace_path {
                    log::debug!(
                        target: "quire::content",
                        "[{}] photo table at line {} gathered {} photos from {} sources",
                        trace.owner(),
                        line,
                        photos.len(),
                        table.sources.len()
                    );
                }
                table.photos = photos;
                photo::rebuild_rows(node);
            }
            NodeKind::Report(report) => {
                let setup = Arc::make_mut(&mut report.setup);
                for template in [&mut setup.header, &mut setup.footer].into_iter().flatten() {
                    self.resolve(template, chapter, trace);
                }
            }
            _ => {}
        }
    }
}

/// Merge each run of adjacent visible photo tables that agree on style and
/// columns and are all marked `merge`.
fn merge_photo_tables(children: &mut Vec<LayoutNode>) {
    let mut i = 0;
    while i + 1 < children.len() {
        let mergeable = children[i].is_visible()
            && children[i + 1].is_visible()
            && match (&children[i].kind, &children[i + 1].kind) {
                (NodeKind::PhotoTable(a), NodeKind::PhotoTable(b)) => a.compatible(b),
                _ => false,
            };
        if mergeable {
            let next = children.remove(i + 1);
            children[i].merge_content(next);
        } else {
            i += 1;
        }
    }
}
