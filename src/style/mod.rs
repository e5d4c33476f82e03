//! # Style Cascade
//!
//! Per-kind style records. Every field is optional; a record may name a
//! `base` style of the same kind, and unset fields are filled from that base
//! once, when the style sheet is loaded. After loading a style is immutable
//! and shared by every node that uses it.
//!
//! Nodes never look at a base themselves: they ask their own (already
//! cascaded) record for padding and the other fields.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::design::DesignElement;
use crate::error::DesignError;
use crate::geometry::Padding;
use crate::numbering::Numbering;

/// Behaviour shared by all style kinds.
pub trait Cascade: Clone + Default {
    /// Design element name for this kind, e.g. `TextStyle`.
    const ELEMENT: &'static str;

    /// Read the kind-specific fields from a design element.
    fn from_element(el: &DesignElement) -> Result<Self, DesignError>;

    /// Fill every unset field from `base`.
    fn inherit(&mut self, base: &Self);

    fn padding(&self) -> Padding;
}

fn read_padding(el: &DesignElement) -> Result<Option<Padding>, DesignError> {
    let mut padding = match el.get("padding") {
        Some(raw) => Some(Padding::parse(raw).ok_or_else(|| {
            el.error(format!("padding '{}' must be 1, 2 or 4 integers", raw))
        })?),
        None => None,
    };
    for (key, slot) in [
        ("paddingTop", 0usize),
        ("paddingRight", 1),
        ("paddingBottom", 2),
        ("paddingLeft", 3),
    ] {
        if let Some(v) = el.get_i32(key)? {
            let p = padding.get_or_insert_with(Padding::default);
            match slot {
                0 => p.top = v,
                1 => p.right = v,
                2 => p.bottom = v,
                _ => p.left = v,
            }
        }
    }
    Ok(padding)
}

fn inherit_field<T: Clone>(field: &mut Option<T>, base: &Option<T>) {
    if field.is_none() {
        field.clone_from(base);
    }
}

// ── Style records ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStyle {
    pub padding: Option<Padding>,
    pub border_width: Option<i32>,
}

impl Cascade for TableStyle {
    const ELEMENT: &'static str = "TableStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        Ok(Self {
            padding: read_padding(el)?,
            border_width: el.get_i32("borderWidth")?,
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.border_width, &base.border_width);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub padding: Option<Padding>,
    pub border_width: Option<i32>,
    pub background: Option<String>,
}

impl Cascade for CellStyle {
    const ELEMENT: &'static str = "CellStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        Ok(Self {
            padding: read_padding(el)?,
            border_width: el.get_i32("borderWidth")?,
            background: el.get("background").map(str::to_string),
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.border_width, &base.border_width);
        inherit_field(&mut self.background, &base.background);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineStyle {
    pub padding: Option<Padding>,
    pub thickness: Option<i32>,
    pub color: Option<String>,
}

impl LineStyle {
    pub fn thickness(&self) -> i32 {
        self.thickness.unwrap_or(1)
    }
}

impl Cascade for LineStyle {
    const ELEMENT: &'static str = "LineStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        Ok(Self {
            padding: read_padding(el)?,
            thickness: el.get_i32("thickness")?,
            color: el.get("color").map(str::to_string),
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.thickness, &base.thickness);
        inherit_field(&mut self.color, &base.color);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoStyle {
    pub padding: Option<Padding>,
    pub border_width: Option<i32>,
    /// Upper bound on a photo's drawn height.
    pub max_height: Option<i32>,
    /// Height reserved under a photo for its caption, when it has one.
    pub caption_height: Option<i32>,
    /// Resampling quality handed to the imaging service (1-100).
    pub quality: Option<u8>,
}

impl PhotoStyle {
    pub fn caption_height(&self) -> i32 {
        self.caption_height.unwrap_or(12)
    }

    pub fn quality(&self) -> u8 {
        self.quality.unwrap_or(80)
    }
}

impl Cascade for PhotoStyle {
    const ELEMENT: &'static str = "PhotoStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        let quality = match el.get_u32("quality")? {
            Some(q) if (1..=100).contains(&q) => Some(q as u8),
            Some(q) => return Err(el.error(format!("quality must be 1-100, got {}", q))),
            None => None,
        };
        Ok(Self {
            padding: read_padding(el)?,
            border_width: el.get_i32("borderWidth")?,
            max_height: el.get_i32("maxHeight")?,
            caption_height: el.get_i32("captionHeight")?,
            quality,
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.border_width, &base.border_width);
        inherit_field(&mut self.max_height, &base.max_height);
        inherit_field(&mut self.caption_height, &base.caption_height);
        inherit_field(&mut self.quality, &base.quality);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_else(|| Padding::uniform(2))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub padding: Option<Padding>,
    pub font: Option<String>,
    /// Font size in points.
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    /// Line height as a multiplier of font size.
    pub line_spacing: Option<f32>,
}

impl TextStyle {
    pub fn font(&self) -> &str {
        self.font.as_deref().unwrap_or("Helvetica")
    }

    pub fn size(&self) -> f32 {
        self.size.unwrap_or(10.0)
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing.unwrap_or(1.2)
    }
}

impl Cascade for TextStyle {
    const ELEMENT: &'static str = "TextStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        Ok(Self {
            padding: read_padding(el)?,
            font: el.get("font").map(str::to_string),
            size: el.get_f32("size")?,
            bold: el.get_bool("bold")?,
            italic: el.get_bool("italic")?,
            color: el.get("color").map(str::to_string),
            line_spacing: el.get_f32("lineSpacing")?,
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.font, &base.font);
        inherit_field(&mut self.size, &base.size);
        inherit_field(&mut self.bold, &base.bold);
        inherit_field(&mut self.italic, &base.italic);
        inherit_field(&mut self.color, &base.color);
        inherit_field(&mut self.line_spacing, &base.line_spacing);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

/// Bullet and indentation settings for list items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStyle {
    pub padding: Option<Padding>,
    pub numbering: Option<Numbering>,
    /// Literal bullet used when `numbering` is `Symbol`.
    pub symbol: Option<String>,
    /// Width reserved for the bullet column.
    pub indent: Option<i32>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Name of the text style the bullet is set in.
    pub text_style: Option<String>,
}

impl ListStyle {
    pub fn numbering(&self) -> Numbering {
        self.numbering.unwrap_or(Numbering::Symbol)
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("\u{2022}")
    }

    pub fn indent(&self) -> i32 {
        self.indent.unwrap_or(18)
    }
}

impl Cascade for ListStyle {
    const ELEMENT: &'static str = "ListStyle";

    fn from_element(el: &DesignElement) -> Result<Self, DesignError> {
        let numbering = match el.get("numbering") {
            Some(raw) => Some(Numbering::from_name(raw).ok_or_else(|| {
                el.error(format!("unknown numbering style '{}'", raw))
            })?),
            None => None,
        };
        Ok(Self {
            padding: read_padding(el)?,
            numbering,
            symbol: el.get("symbol").map(str::to_string),
            indent: el.get_i32("indent")?,
            prefix: el.get("prefix").map(str::to_string),
            suffix: el.get("suffix").map(str::to_string),
            text_style: el.get("textStyle").map(str::to_string),
        })
    }

    fn inherit(&mut self, base: &Self) {
        inherit_field(&mut self.padding, &base.padding);
        inherit_field(&mut self.numbering, &base.numbering);
        inherit_field(&mut self.symbol, &base.symbol);
        inherit_field(&mut self.indent, &base.indent);
        inherit_field(&mut self.prefix, &base.prefix);
        inherit_field(&mut self.suffix, &base.suffix);
        inherit_field(&mut self.text_style, &base.text_style);
    }

    fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }
}

// ── Style sets ──────────────────────────────────────────────────

/// Name used for a kind's document-level default.
pub const DEFAULT_STYLE_NAME: &str = "Default";

/// The cascaded styles of one kind plus that kind's default.
#[derive(Debug, Clone)]
pub struct StyleSet<T> {
    named: HashMap<String, Arc<T>>,
    default: Arc<T>,
}

impl<T: Cascade> Default for StyleSet<T> {
    fn default() -> Self {
        Self {
            named: HashMap::new(),
            default: Arc::new(T::default()),
        }
    }
}

impl<T: Cascade> StyleSet<T> {
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.named.get(name).cloned()
    }

    pub fn default_style(&self) -> Arc<T> {
        Arc::clone(&self.default)
    }

    /// Style for a node: its `style` attribute if present (which must name a
    /// known style), otherwise the default for the kind.
    pub fn for_element(&self, el: &DesignElement) -> Result<Arc<T>, DesignError> {
        self.for_name(el, el.get("style"))
    }

    pub fn for_name(&self, el: &DesignElement, name: Option<&str>) -> Result<Arc<T>, DesignError> {
        match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| el.error(format!("unknown {} '{}'", T::ELEMENT, name))),
            None => Ok(self.default_style()),
        }
    }

    fn build(raw: Vec<(&DesignElement, T)>) -> Result<Self, DesignError> {
        let mut pending: HashMap<String, (&DesignElement, T)> = HashMap::new();
        for (el, style) in raw {
            let name = el.required("name")?.to_string();
            if pending.contains_key(&name) {
                return Err(el.error(format!("duplicate {} '{}'", T::ELEMENT, name)));
            }
            pending.insert(name, (el, style));
        }

        let mut resolved: HashMap<String, Arc<T>> = HashMap::new();
        let names: Vec<String> = pending.keys().cloned().collect();
        for name in names {
            let mut visiting = HashSet::new();
            resolve_one(&name, &pending, &mut resolved, &mut visiting)?;
        }

        let default = resolved
            .get(DEFAULT_STYLE_NAME)
            .cloned()
            .unwrap_or_else(|| Arc::new(T::default()));
        Ok(Self {
            named: resolved,
            default,
        })
    }
}

fn resolve_one<T: Cascade>(
    name: &str,
    pending: &HashMap<String, (&DesignElement, T)>,
    resolved: &mut HashMap<String, Arc<T>>,
    visiting: &mut HashSet<String>,
) -> Result<Arc<T>, DesignError> {
    if let Some(done) = resolved.get(name) {
        return Ok(Arc::clone(done));
    }
    let Some((el, style)) = pending.get(name) else {
        return Err(DesignError::new(format!("unknown {} '{}'", T::ELEMENT, name), 0, 0));
    };
    if !visiting.insert(name.to_string()) {
        return Err(el.error(format!("{} '{}' inherits from itself", T::ELEMENT, name)));
    }

    let mut style = style.clone();
    if let Some(base_name) = el.get("base") {
        if !pending.contains_key(base_name) {
            return Err(el.error(format!(
                "{} '{}' has unknown base '{}'",
                T::ELEMENT,
                name,
                base_name
            )));
        }
        let base = resolve_one(base_name, pending, resolved, visiting)?;
        style.inherit(&base);
    }

    let style = Arc::new(style);
    resolved.insert(name.to_string(), Arc::clone(&style));
    Ok(style)
}

/// Every style of the document, cascaded, plus the per-kind defaults.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub tables: StyleSet<TableStyle>,
    pub cells: StyleSet<CellStyle>,
    pub lines: StyleSet<LineStyle>,
    pub photos: StyleSet<PhotoStyle>,
    pub texts: StyleSet<TextStyle>,
    pub lists: StyleSet<ListStyle>,
}

impl StyleSheet {
    /// Load a `Styles` element. Unknown children are design errors.
    pub fn load(el: &DesignElement) -> Result<Self, DesignError> {
        let mut tables = Vec::new();
        let mut cells = Vec::new();
        let mut lines = Vec::new();
        let mut photos = Vec::new();
        let mut texts = Vec::new();
        let mut lists = Vec::new();

        for child in &el.children {
            match child.name.as_str() {
                "TableStyle" => tables.push((child, TableStyle::from_element(child)?)),
                "CellStyle" => cells.push((child, CellStyle::from_element(child)?)),
                "LineStyle" => lines.push((child, LineStyle::from_element(child)?)),
                "PhotoStyle" => photos.push((child, PhotoStyle::from_element(child)?)),
                "TextStyle" => texts.push((child, TextStyle::from_element(child)?)),
                "ListStyle" => lists.push((child, ListStyle::from_element(child)?)),
                other => return Err(child.error(format!("unknown style kind <{}>", other))),
            }
        }

        Ok(Self {
            tables: StyleSet::build(tables)?,
            cells: StyleSet::build(cells)?,
            lines: StyleSet::build(lines)?,
            photos: StyleSet::build(photos)?,
            texts: StyleSet::build(texts)?,
            lists: StyleSet::build(lists)?,
        })
    }
}
