//! # Conditions
//!
//! Visibility predicates attached to layout nodes. Every variant combines
//! an underlying fact with its `require`/`prohibit` flags the same way:
//!
//! | require | prohibit | result |
//! |---|---|---|
//! | no | no | always true |
//! | yes | no | the fact |
//! | no | yes | not the fact |
//! | yes | yes | always false |
//!
//! The last row makes a contradictory condition fail for every kind. It is
//! kept as-is; designs that set both flags are hidden unconditionally.
//!
//! Static conditions decide once whether a node takes part in layout at all.
//! Content conditions are evaluated per candidate item (e.g. per photo).

use std::collections::HashMap;
use std::sync::Arc;

use crate::content::{ContentResolver, ResolveScope, SourceRef};
use crate::design::DesignElement;
use crate::error::DesignError;

/// Scope a fact is evaluated in. Designs write the legacy codes `0`, `-1`,
/// `-2` or the names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContextScope {
    #[default]
    Local,
    Chapter,
    Document,
}

impl ContextScope {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ContextScope::Local),
            -1 => Some(ContextScope::Chapter),
            -2 => Some(ContextScope::Document),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ContextScope::Local => 0,
            ContextScope::Chapter => -1,
            ContextScope::Document => -2,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "local" => Some(ContextScope::Local),
            "chapter" => Some(ContextScope::Chapter),
            "document" => Some(ContextScope::Document),
            other => other.parse::<i32>().ok().and_then(Self::from_code),
        }
    }
}

/// Variant tag, used for the external name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionTag {
    EmptyLayout,
    OptionSelected,
    PhotoCount,
    ItemCount,
    DocTag,
    ContentSelected,
    ContentDocTag,
}

/// Design element names of the condition variants.
pub const CONDITION_NAMES: [(ConditionTag, &str); 7] = [
    (ConditionTag::EmptyLayout, "EmptyLayout"),
    (ConditionTag::OptionSelected, "OptionSelected"),
    (ConditionTag::PhotoCount, "PhotoCount"),
    (ConditionTag::ItemCount, "ItemCount"),
    (ConditionTag::DocTag, "DocTag"),
    (ConditionTag::ContentSelected, "ContentSelected"),
    (ConditionTag::ContentDocTag, "ContentDocTag"),
];

impl ConditionTag {
    pub fn from_name(name: &str) -> Option<Self> {
        CONDITION_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(tag, _)| *tag)
    }

    pub fn name(&self) -> &'static str {
        CONDITION_NAMES
            .iter()
            .find(|(tag, _)| tag == self)
            .map(|(_, n)| *n)
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    /// The referenced layout (by id) is empty.
    EmptyLayout {
        layout: Arc<str>,
        context: ContextScope,
    },
    /// A radio/checkbox/calculation source is selected.
    OptionSelected {
        source: Arc<SourceRef>,
        context: ContextScope,
        is_implicit: bool,
    },
    /// Photos attached to `target` number within `[minimum, maximum]`.
    PhotoCount {
        target: Arc<SourceRef>,
        minimum: u32,
        maximum: u32,
        context: ContextScope,
    },
    /// Items in a collection number within `[minimum, maximum]`.
    ItemCount {
        collection: Arc<SourceRef>,
        minimum: u32,
        maximum: u32,
        context: ContextScope,
    },
    DocTag { tag: String },
    /// The source is selected for the candidate content item.
    ContentSelected {
        source: Arc<SourceRef>,
        is_implicit: bool,
    },
    /// The candidate content item carries `tag`.
    ContentDocTag { tag: String },
}

impl ConditionKind {
    pub fn tag(&self) -> ConditionTag {
        match self {
            ConditionKind::EmptyLayout { .. } => ConditionTag::EmptyLayout,
            ConditionKind::OptionSelected { .. } => ConditionTag::OptionSelected,
            ConditionKind::PhotoCount { .. } => ConditionTag::PhotoCount,
            ConditionKind::ItemCount { .. } => ConditionTag::ItemCount,
            ConditionKind::DocTag { .. } => ConditionTag::DocTag,
            ConditionKind::ContentSelected { .. } => ConditionTag::ContentSelected,
            ConditionKind::ContentDocTag { .. } => ConditionTag::ContentDocTag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub require: bool,
    pub prohibit: bool,
    pub kind: ConditionKind,
}

/// Emptiness of layouts that carry an `id`, recorded by the content pass.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    entries: HashMap<String, Vec<(Option<String>, bool)>>,
    /// Per id, how many records `revise` has overwritten so far.
    revised: HashMap<String, usize>,
}

impl LayoutRegistry {
    pub fn record(&mut self, id: &str, chapter: Option<&str>, empty: bool) {
        self.entries
            .entry(id.to_string())
            .or_default()
            .push((chapter.map(str::to_string), empty));
    }

    /// Overwrite the oldest record of `id` not yet revised. Records are
    /// revised in the order they were made; past the last one, a new
    /// record is added.
    pub fn revise(&mut self, id: &str, chapter: Option<&str>, empty: bool) {
        let next = self.revised.entry(id.to_string()).or_default();
        let entries = self.entries.entry(id.to_string()).or_default();
        let record = (chapter.map(str::to_string), empty);
        match entries.get_mut(*next) {
            Some(slot) => *slot = record,
            None => entries.push(record),
        }
        *next += 1;
    }

    /// `None` if no layout with this id has been recorded in scope.
    pub fn is_empty(&self, id: &str, scope: &ResolveScope<'_>) -> Option<bool> {
        let entries = self.entries.get(id)?;
        let in_chapter = entries
            .iter()
            .rev()
            .find(|(chapter, _)| chapter.as_deref() == scope.chapter)
            .map(|(_, empty)| *empty);
        match scope.context {
            ContextScope::Chapter => in_chapter,
            ContextScope::Local => in_chapter.or_else(|| entries.last().map(|(_, e)| *e)),
            ContextScope::Document => Some(entries.iter().all(|(_, empty)| *empty)),
        }
    }
}

/// Everything a condition can consult.
pub struct EvalEnv<'a> {
    pub resolver: &'a dyn ContentResolver,
    pub scope: ResolveScope<'a>,
    pub layouts: &'a LayoutRegistry,
}

impl Condition {
    pub fn new(kind: ConditionKind, require: bool, prohibit: bool) -> Self {
        Self {
            require,
            prohibit,
            kind,
        }
    }

    pub fn evaluate(&self, env: &EvalEnv<'_>) -> bool {
        match (self.require, self.prohibit) {
            (false, false) => true,
            (true, true) => false,
            (true, false) => self.fact(env),
            (false, true) => !self.fact(env),
        }
    }

    /// Whether the referenced fact holds. Unresolvable facts do not hold.
    pub fn fact(&self, env: &EvalEnv<'_>) -> bool {
        match &self.kind {
            ConditionKind::EmptyLayout { layout, context } => {
                let scope = env.scope.with_context(*context);
                match env.layouts.is_empty(layout, &scope) {
                    Some(empty) => empty,
                    None => {
                        log::warn!(
                            target: "quire::content",
                            "EmptyLayout condition references unknown layout '{}'",
                            layout
                        );
                        false
                    }
                }
            }
            ConditionKind::OptionSelected {
                source, context, ..
            } => env
                .resolver
                .is_selected(source, &env.scope.with_context(*context))
                .unwrap_or(false),
            ConditionKind::PhotoCount {
                target,
                minimum,
                maximum,
                context,
            } => {
                let count = env
                    .resolver
                    .photos(target, &env.scope.with_context(*context))
                    .map(|p| p.len())
                    .unwrap_or(0);
                in_range(count, *minimum, *maximum)
            }
            ConditionKind::ItemCount {
                collection,
                minimum,
                maximum,
                context,
            } => {
                let count = env
                    .resolver
                    .item_count(collection, &env.scope.with_context(*context))
                    .unwrap_or(0);
                in_range(count, *minimum, *maximum)
            }
            ConditionKind::DocTag { tag } => env.resolver.has_document_tag(tag),
            ConditionKind::ContentSelected { source, .. } => match env.scope.item {
                Some(_) => env
                    .resolver
                    .is_selected(source, &env.scope.with_context(ContextScope::Local))
                    .unwrap_or(false),
                None => false,
            },
            ConditionKind::ContentDocTag { tag } => env
                .scope
                .item
                .map(|item| item.tags.iter().any(|t| t == tag))
                .unwrap_or(false),
        }
    }

    /// Load one condition element, e.g. `<PhotoCount target="form:roof"
    /// minimum="1" maximum="3" require="true"/>`.
    pub fn load(el: &DesignElement) -> Result<Self, DesignError> {
        let tag = ConditionTag::from_name(&el.name)
            .ok_or_else(|| el.error(format!("unknown condition <{}>", el.name)))?;
        let require = el.flag("require")?;
        let prohibit = el.flag("prohibit")?;
        let context = match el.get("context") {
            Some(raw) => ContextScope::parse(raw)
                .ok_or_else(|| el.error(format!("unknown condition context '{}'", raw)))?,
            None => ContextScope::Local,
        };
        let is_implicit = el.flag("implicit")?;

        let kind = match tag {
            ConditionTag::EmptyLayout => ConditionKind::EmptyLayout {
                layout: Arc::from(el.required("layout")?),
                context,
            },
            ConditionTag::OptionSelected => ConditionKind::OptionSelected {
                source: source_attr(el, "source")?,
                context,
                is_implicit,
            },
            ConditionTag::PhotoCount => {
                let (minimum, maximum) = range_attrs(el)?;
                ConditionKind::PhotoCount {
                    target: source_attr(el, "target")?,
                    minimum,
                    maximum,
                    context,
                }
            }
            ConditionTag::ItemCount => {
                let (minimum, maximum) = range_attrs(el)?;
                ConditionKind::ItemCount {
                    collection: source_attr(el, "collection")?,
                    minimum,
                    maximum,
                    context,
                }
            }
            ConditionTag::DocTag => ConditionKind::DocTag {
                tag: el.required("tag")?.to_string(),
            },
            ConditionTag::ContentSelected => ConditionKind::ContentSelected {
                source: source_attr(el, "source")?,
                is_implicit,
            },
            ConditionTag::ContentDocTag => ConditionKind::ContentDocTag {
                tag: el.required("tag")?.to_string(),
            },
        };
        Ok(Self::new(kind, require, prohibit))
    }

    /// Load every condition under a `Conditions`/`ContentConditions` element.
    pub fn load_all(el: &DesignElement) -> Result<Vec<Self>, DesignError> {
        el.children.iter().map(Condition::load).collect()
    }
}

/// A node's condition set holds iff every condition holds.
pub fn all_satisfied(conditions: &[Condition], env: &EvalEnv<'_>) -> bool {
    conditions.iter().all(|c| c.evaluate(env))
}

fn in_range(count: usize, minimum: u32, maximum: u32) -> bool {
    count >= minimum as usize && count <= maximum as usize
}

fn source_attr(el: &DesignElement, key: &str) -> Result<Arc<SourceRef>, DesignError> {
    let raw = el.required(key)?;
    SourceRef::parse(raw)
        .map(Arc::new)
        .ok_or_else(|| el.error(format!("'{}' is not a valid source reference (kind:id)", raw)))
}

fn range_attrs(el: &DesignElement) -> Result<(u32, u32), DesignError> {
    let minimum = el.get_u32("minimum")?.unwrap_or(0);
    let maximum = el.get_u32("maximum")?.unwrap_or(u32::MAX);
    if minimum > maximum {
        return Err(el.error(format!(
            "minimum {} is greater than maximum {}",
            minimum, maximum
        )));
    }
    Ok((minimum, maximum))
}
