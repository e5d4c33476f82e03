//! # Content Resolution
//!
//! The boundary to the domain-object store. A `ContentResolver` answers
//! questions about typed content-source references ("is checkbox X
//! selected", "which photos are attached to form Y") within a scope. Ordinary
//! absence is an `Err(ResolveError::NotFound)`, never a panic; the layout
//! treats it as "exclude / empty" and counts it in `Diagnostics`.
//!
//! `InMemoryResolver` is a JSON-backed implementation used by the CLI and
//! the tests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::ContextScope;
use crate::error::{QuireError, ResolveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Radio,
    Checkbox,
    Calculation,
    Form,
    Collection,
    Text,
    Photo,
}

impl SourceKind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "radio" => SourceKind::Radio,
            "checkbox" => SourceKind::Checkbox,
            "calculation" => SourceKind::Calculation,
            "form" => SourceKind::Form,
            "collection" => SourceKind::Collection,
            "text" => SourceKind::Text,
            "photo" => SourceKind::Photo,
            _ => return None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            SourceKind::Radio => "radio",
            SourceKind::Checkbox => "checkbox",
            SourceKind::Calculation => "calculation",
            SourceKind::Form => "form",
            SourceKind::Collection => "collection",
            SourceKind::Text => "text",
            SourceKind::Photo => "photo",
        }
    }
}

/// A typed reference to a content source, written `kind:id` in designs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: String,
}

impl SourceRef {
    pub fn new(kind: SourceKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, id) = raw.split_once(':')?;
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        Some(Self::new(SourceKind::from_name(kind.trim())?, id))
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.id)
    }
}

/// A photo as the domain store describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default = "default_px")]
    pub width_px: u32,
    #[serde(default = "default_px")]
    pub height_px: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Selection state of sources attached to this photo.
    #[serde(default)]
    pub selections: BTreeMap<String, bool>,
}

fn default_px() -> u32 {
    640
}

/// Where a question is asked from.
#[derive(Debug, Clone, Copy)]
pub struct ResolveScope<'a> {
    pub context: ContextScope,
    /// Chapter the asking node belongs to, if any.
    pub chapter: Option<&'a str>,
    /// Candidate content item, during content-condition evaluation.
    pub item: Option<&'a PhotoRecord>,
}

impl<'a> ResolveScope<'a> {
    pub fn document() -> Self {
        Self {
            context: ContextScope::Document,
            chapter: None,
            item: None,
        }
    }

    pub fn with_context(self, context: ContextScope) -> Self {
        Self { context, ..self }
    }
}

pub trait ContentResolver {
    fn is_selected(&self, source: &SourceRef, scope: &ResolveScope<'_>)
        -> Result<bool, ResolveError>;

    fn photos(
        &self,
        target: &SourceRef,
        scope: &ResolveScope<'_>,
    ) -> Result<Vec<PhotoRecord>, ResolveError>;

    fn item_count(
        &self,
        collection: &SourceRef,
        scope: &ResolveScope<'_>,
    ) -> Result<usize, ResolveError>;

    fn text(&self, source: &SourceRef, scope: &ResolveScope<'_>) -> Result<String, ResolveError>;

    fn has_document_tag(&self, tag: &str) -> bool;
}

/// Soft failures recorded while resolving content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub missing_resources: u32,
    pub missing_photos: u32,
    pub missing_content: u32,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.missing_resources == 0 && self.missing_photos == 0 && self.missing_content == 0
    }
}

// ── In-memory resolver ──────────────────────────────────────────

/// Facts for the whole document, or for one chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub selections: BTreeMap<String, bool>,
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
    #[serde(default)]
    pub photos: BTreeMap<String, Vec<PhotoRecord>>,
    #[serde(default)]
    pub collections: BTreeMap<String, usize>,
    #[serde(default)]
    pub chapters: BTreeMap<String, ContentData>,
}

/// Resolves against a `ContentData` value.
///
/// `Local` looks in the asking node's chapter first and then the document;
/// `Chapter` only looks in the chapter; `Document` aggregates the document
/// with every chapter (counts summed, photo lists concatenated in chapter
/// name order, selected if selected anywhere).
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    data: ContentData,
}

impl InMemoryResolver {
    pub fn new(data: ContentData) -> Self {
        Self { data }
    }

    pub fn from_json(json: &str) -> Result<Self, QuireError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    fn chapter(&self, scope: &ResolveScope<'_>) -> Option<&ContentData> {
        scope.chapter.and_then(|c| self.data.chapters.get(c))
    }

    /// Data layers in lookup order for a scope.
    fn layers(&self, scope: &ResolveScope<'_>) -> Vec<&ContentData> {
        match scope.context {
            ContextScope::Local => self
                .chapter(scope)
                .into_iter()
                .chain(std::iter::once(&self.data))
                .collect(),
            ContextScope::Chapter => self.chapter(scope).into_iter().collect(),
            ContextScope::Document => std::iter::once(&self.data)
                .chain(self.data.chapters.values())
                .collect(),
        }
    }

    fn not_found(source: &SourceRef) -> ResolveError {
        ResolveError::NotFound {
            what: source.to_string(),
        }
    }
}

impl ContentResolver for InMemoryResolver {
    fn is_selected(
        &self,
        source: &SourceRef,
        scope: &ResolveScope<'_>,
    ) -> Result<bool, ResolveError> {
        if scope.context == ContextScope::Local {
            if let Some(selected) = scope.item.and_then(|i| i.selections.get(&source.id)) {
                return Ok(*selected);
            }
        }
        let found: Vec<bool> = self
            .layers(scope)
            .into_iter()
            .filter_map(|l| l.selections.get(&source.id).copied())
            .collect();
        match scope.context {
            ContextScope::Document if !found.is_empty() => Ok(found.iter().any(|s| *s)),
            _ => found.first().copied().ok_or_else(|| Self::not_found(source)),
        }
    }

    fn photos(
        &self,
        target: &SourceRef,
        scope: &ResolveScope<'_>,
    ) -> Result<Vec<PhotoRecord>, ResolveError> {
        let mut hits = self
            .layers(scope)
            .into_iter()
            .filter_map(|l| l.photos.get(&target.id));
        match scope.context {
            ContextScope::Document => {
                let all: Vec<&Vec<PhotoRecord>> = hits.collect();
                if all.is_empty() {
                    Err(Self::not_found(target))
                } else {
                    Ok(all.into_iter().flatten().cloned().collect())
                }
            }
            _ => hits.next().cloned().ok_or_else(|| Self::not_found(target)),
        }
    }

    fn item_count(
        &self,
        collection: &SourceRef,
        scope: &ResolveScope<'_>,
    ) -> Result<usize, ResolveError> {
        let found: Vec<usize> = self
            .layers(scope)
            .into_iter()
            .filter_map(|l| l.collections.get(&collection.id).copied())
            .collect();
        match scope.context {
            ContextScope::Document if !found.is_empty() => Ok(found.iter().sum()),
            _ => found.first().copied().ok_or_else(|| Self::not_found(collection)),
        }
    }

    fn text(&self, source: &SourceRef, scope: &ResolveScope<'_>) -> Result<String, ResolveError> {
        self.layers(scope)
            .into_iter()
            .find_map(|l| l.texts.get(&source.id).cloned())
            .ok_or_else(|| Self::not_found(source))
    }

    fn has_document_tag(&self, tag: &str) -> bool {
        self.data.tags.iter().any(|t| t == tag)
    }
}
