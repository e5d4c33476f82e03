//! # Load
//!
//! Builds the layout tree from a design tree. Styles are resolved here,
//! against the document's style sheet, so every node leaves `Load` holding
//! its final cascaded style. Conditions are parsed but not evaluated.

use std::sync::Arc;

use crate::condition::{Condition, ContextScope};
use crate::content::SourceRef;
use crate::design::DesignElement;
use crate::error::DesignError;
use crate::geometry::Padding;
use crate::style::StyleSheet;
use crate::trace::TraceContext;

use super::page::{PageSetup, ReportLayout};
use super::page_break::PageBreakRules;
use super::{
    Align, Bullet, CellLayout, ColumnSpec, DebugInfo, LayoutNode, ListItemLayout, NodeKind,
    PhotoLayout, PhotoTableLayout, PictureLayout, RowLayout, SpaceLayout, TableLayout, TextLayout,
};

const STATIC_CONDITIONS: &str = "Conditions";
const CONTENT_CONDITIONS: &str = "ContentConditions";

/// US Letter in points.
pub const DEFAULT_PAGE_WIDTH: i32 = 612;
pub const DEFAULT_PAGE_HEIGHT: i32 = 792;
pub const DEFAULT_MARGIN: i32 = 36;

/// Load a `Report` design element into a report node.
pub fn load_report(el: &DesignElement) -> Result<LayoutNode, DesignError> {
    if el.name != "Report" {
        return Err(el.error(format!("design root must be <Report>, found <{}>", el.name)));
    }
    let styles = match el.find("Styles") {
        Some(styles) => StyleSheet::load(styles)?,
        None => StyleSheet::default(),
    };
    let loader = Loader { styles: &styles };

    let mut header = None;
    let mut footer = None;
    let mut body = Vec::new();
    for child in &el.children {
        match child.name.as_str() {
            "Styles" | STATIC_CONDITIONS | CONTENT_CONDITIONS => {}
            "Header" => header = Some(loader.template(child)?),
            "Footer" => footer = Some(loader.template(child)?),
            _ => body.push(loader.node(child)?),
        }
    }

    let width = el.get_i32("width")?.unwrap_or(DEFAULT_PAGE_WIDTH);
    let height = el.get_i32("height")?.unwrap_or(DEFAULT_PAGE_HEIGHT);
    if width <= 0 || height <= 0 {
        return Err(el.error(format!("page size {}x{} must be positive", width, height)));
    }
    let margin = |key: &str| -> Result<i32, DesignError> {
        match el.get_i32(key)?.unwrap_or(DEFAULT_MARGIN) {
            m if m < 0 => Err(el.error(format!("'{}' must not be negative", key))),
            m => Ok(m),
        }
    };
    let margins = Padding {
        top: margin("marginTop")?,
        bottom: margin("marginBottom")?,
        left: margin("marginLeft")?,
        right: margin("marginRight")?,
    };

    let setup = PageSetup {
        width,
        height,
        margins,
        header,
        footer,
    };
    let mut report = LayoutNode::new(NodeKind::Report(ReportLayout {
        setup: Arc::new(setup),
    }))
    .with_children(body);
    loader.check_children(&report, el)?;
    loader.common(&mut report, el)?;
    Ok(report)
}

struct Loader<'s> {
    styles: &'s StyleSheet,
}

impl Loader<'_> {
    /// A header or footer: its children stacked in a group.
    fn template(&self, el: &DesignElement) -> Result<LayoutNode, DesignError> {
        let mut node = LayoutNode::new(NodeKind::Group);
        node.children = self.children(el)?;
        self.common(&mut node, el)?;
        Ok(node)
    }

    fn children(&self, el: &DesignElement) -> Result<Vec<LayoutNode>, DesignError> {
        el.children
            .iter()
            .filter(|c| c.name != STATIC_CONDITIONS && c.name != CONTENT_CONDITIONS)
            .map(|c| self.node(c))
            .collect()
    }

    fn node(&self, el: &DesignElement) -> Result<LayoutNode, DesignError> {
        let kind = match el.name.as_str() {
            "Group" => NodeKind::Group,
            "Table" => NodeKind::Table(TableLayout {
                style: self.styles.tables.for_element(el)?,
                columns: match el.get("columns") {
                    Some(raw) => ColumnSpec::parse_list(raw).ok_or_else(|| {
                        el.error(format!("invalid column list '{}'", raw))
                    })?,
                    None => Vec::new(),
                },
            }),
            "Row" => NodeKind::TableRow(RowLayout {
                is_header: el.flag("header")?,
                edges: Vec::new(),
            }),
            "Cell" => NodeKind::TableCell(CellLayout {
                style: self.styles.cells.for_element(el)?,
                span: match el.get_u32("span")? {
                    Some(0) => return Err(el.error("cell span must be at least 1")),
                    Some(n) => n as usize,
                    None => 1,
                },
            }),
            "Line" => NodeKind::Line(self.styles.lines.for_element(el)?),
            "Space" => NodeKind::Space(SpaceLayout {
                height: match el.get_i32("height")?.unwrap_or(0) {
                    h if h < 0 => return Err(el.error("space height must not be negative")),
                    h => h,
                },
                collapsed: false,
            }),
            "Text" => NodeKind::Text(self.text(el)?),
            "ListItem" => {
                let style = self.styles.lists.for_element(el)?;
                let bullet_style = self.styles.texts.for_name(el, style.text_style.as_deref())?;
                NodeKind::ListItem(ListItemLayout {
                    style,
                    bullet_style,
                    bullet: Bullet::functional(),
                    start: el.get_u32("start")?,
                })
            }
            "PhotoTable" => NodeKind::PhotoTable(self.photo_table(el)?),
            "Photo" => NodeKind::Photo(PhotoLayout {
                style: self.styles.photos.for_element(el)?,
                source: Some(source(el, "source")?),
                index: el.get_u32("index")?.unwrap_or(0) as usize,
                photo: None,
                image_box: Default::default(),
                caption_box: Default::default(),
            }),
            "Picture" => NodeKind::Picture(PictureLayout {
                file: el.required("file")?.to_string(),
                width: positive(el, "width")?,
                height: positive(el, "height")?,
                align: match el.get("align") {
                    Some(raw) => Align::parse(raw)
                        .ok_or_else(|| el.error(format!("unknown alignment '{}'", raw)))?,
                    None => Align::Left,
                },
                info: None,
                image_box: Default::default(),
            }),
            other => return Err(el.error(format!("unknown element <{}>", other))),
        };

        let mut node = LayoutNode::new(kind);
        node.children = self.children(el)?;
        self.check_children(&node, el)?;
        self.common(&mut node, el)?;
        Ok(node)
    }

    fn text(&self, el: &DesignElement) -> Result<TextLayout, DesignError> {
        let style = self.styles.texts.for_element(el)?;
        match (el.get("text"), el.get("source")) {
            (Some(literal), _) => Ok(TextLayout::literal(style, literal)),
            (None, Some(_)) => {
                let mut text = TextLayout::literal(style, "");
                text.source = Some(source(el, "source")?);
                Ok(text)
            }
            (None, None) => Err(el.error("<Text> requires 'text' or 'source'")),
        }
    }

    fn photo_table(&self, el: &DesignElement) -> Result<PhotoTableLayout, DesignError> {
        let columns = match el.get_i32("columns")?.unwrap_or(2) {
            c if c <= 0 => {
                return Err(el.error(format!("photo table columns must be positive, got {}", c)))
            }
            c => c as usize,
        };
        let raw_sources: Vec<&str> = el
            .get("source")
            .into_iter()
            .chain(
                el.get("sources")
                    .into_iter()
                    .flat_map(|s| s.split([',', ' ']))
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            )
            .collect();
        if raw_sources.is_empty() {
            return Err(el.error("<PhotoTable> requires 'source' or 'sources'"));
        }
        let sources = raw_sources
            .into_iter()
            .map(|raw| {
                SourceRef::parse(raw)
                    .map(Arc::new)
                    .ok_or_else(|| el.error(format!("'{}' is not a valid source reference", raw)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let context = match el.get("context") {
            Some(raw) => ContextScope::parse(raw)
                .ok_or_else(|| el.error(format!("unknown context '{}'", raw)))?,
            None => ContextScope::Local,
        };
        Ok(PhotoTableLayout {
            style: self.styles.photos.for_element(el)?,
            columns,
            sources,
            context,
            merge: el.flag("merge")?,
            photos: Vec::new(),
        })
    }

    /// Structural rules on which kinds may contain which.
    fn check_children(&self, node: &LayoutNode, el: &DesignElement) -> Result<(), DesignError> {
        let allowed = |child: &LayoutNode| match &node.kind {
            NodeKind::Table(_) => matches!(child.kind, NodeKind::TableRow(_)),
            NodeKind::TableRow(_) => matches!(child.kind, NodeKind::TableCell(_)),
            NodeKind::Group
            | NodeKind::TableCell(_)
            | NodeKind::ListItem(_)
            | NodeKind::Report(_) => {
                !matches!(child.kind, NodeKind::TableRow(_) | NodeKind::TableCell(_))
            }
            _ => false,
        };
        match node.children.iter().position(|c| !allowed(c)) {
            None => Ok(()),
            Some(i) => {
                let child = &node.children[i];
                Err(DesignError::new(
                    format!("<{}> cannot contain <{}>", el.name, child.tag().name()),
                    child.debug.line,
                    child.debug.column,
                ))
            }
        }
    }

    /// Attributes every kind understands.
    fn common(&self, node: &mut LayoutNode, el: &DesignElement) -> Result<(), DesignError> {
        node.id = el.get("id").map(str::to_string);
        node.chapter = el.get("chapter").map(str::to_string);
        node.rules = PageBreakRules::from_element(el)?;
        node.trace = TraceContext::from_element(el)?;
        node.debug = DebugInfo {
            line: el.line,
            column: el.column,
            tracking_id: el.get("trackingId").map(str::to_string),
        };
        if let Some(conditions) = el.find(STATIC_CONDITIONS) {
            node.static_conditions = Condition::load_all(conditions)?;
        }
        if let Some(conditions) = el.find(CONTENT_CONDITIONS) {
            node.content_conditions = Condition::load_all(conditions)?;
        }
        Ok(())
    }
}

fn source(el: &DesignElement, key: &str) -> Result<Arc<SourceRef>, DesignError> {
    let raw = el.required(key)?;
    SourceRef::parse(raw)
        .map(Arc::new)
        .ok_or_else(|| el.error(format!("'{}' is not a valid source reference (kind:id)", raw)))
}

fn positive(el: &DesignElement, key: &str) -> Result<Option<i32>, DesignError> {
    match el.get_i32(key)? {
        Some(v) if v <= 0 => Err(el.error(format!("'{}' must be positive", key))),
        other => Ok(other),
    }
}
