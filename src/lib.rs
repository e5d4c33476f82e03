//! # Quire
//!
//! A pagination kernel for report documents.
//!
//! A report design is loaded into a tree of layout nodes (tables, lists,
//! text, photos, pictures, spacers). Content is resolved once, up front,
//! and then the tree is drafted into fixed-size pages. Whenever the tree
//! runs past the bottom of a page's body box it is split according to
//! page-break policy, and the overflow seeds the next page. The result is a
//! list of pages whose every node carries final, non-overlapping bounds,
//! ready for an external renderer.
//!
//! ## Architecture
//!
//! ```text
//! Design (XML/JSON)          Content data
//!       ↓                         ↓
//!   [design]  element tree    [content]  resolver
//!       ↓                         ↓
//!   [layout::load]  →  [layout::content]  conditions, photos, numbering
//!                             ↓
//!                      [layout::page]  draft / split / redraft per page
//!                             ↓
//!                      [layout::info]  summary for renderers
//! ```

pub mod condition;
pub mod content;
pub mod design;
pub mod error;
pub mod geometry;
pub mod image_loader;
pub mod layout;
pub mod numbering;
pub mod style;
pub mod text;
pub mod trace;

pub use content::{ContentResolver, Diagnostics, InMemoryResolver};
pub use design::DesignElement;
pub use error::{DesignError, QuireError, ResolveError, Result};
pub use layout::{Generation, LayoutEngine, LayoutInfo, LayoutNode};

/// Paginate a JSON design against JSON content data with the default
/// services.
pub fn paginate_json(design: &str, content: &str) -> Result<Generation> {
    let design = design::from_json(design)?;
    let resolver = InMemoryResolver::from_json(content)?;
    LayoutEngine::new().generate(&design, &resolver)
}

/// Paginate an XML design against JSON content data with the default
/// services.
pub fn paginate_xml(design: &str, content: &str) -> Result<Generation> {
    let design = design::from_xml(design)?;
    let resolver = InMemoryResolver::from_json(content)?;
    LayoutEngine::new().generate(&design, &resolver)
}
