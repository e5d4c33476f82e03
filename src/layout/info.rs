// ── Serializable layout summary (for renderers and the CLI) ────────

use serde::Serialize;

use crate::geometry::Rectangle;

use super::{LayoutNode, NodeKind};

/// Layout summary of every finalized page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub pages: Vec<PageInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub number: usize,
    pub count: usize,
    pub bounds: Rectangle,
    pub body: Rectangle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<ElementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<ElementInfo>,
    pub elements: Vec<ElementInfo>,
}

/// One placed node. Hidden and empty nodes are left out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub kind: String,
    pub bounds: Rectangle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    /// Wrapped lines, for text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<BulletInfo>,
    /// Target box for the renderer's image service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_box: Option<Rectangle>,
    /// Picture file or photo id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub children: Vec<ElementInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletInfo {
    pub text: String,
    pub bounds: Rectangle,
}

impl LayoutInfo {
    /// Extract the summary from `Page` nodes produced by the driver.
    pub fn from_pages(pages: &[LayoutNode]) -> Self {
        LayoutInfo {
            pages: pages
                .iter()
                .filter_map(|page| {
                    let NodeKind::Page(layout) = &page.kind else {
                        return None;
                    };
                    Some(PageInfo {
                        number: layout.number,
                        count: layout.count,
                        bounds: page.bounds,
                        body: layout.body,
                        header: layout.header.as_deref().and_then(Self::element),
                        footer: layout.footer.as_deref().and_then(Self::element),
                        elements: Self::build_element_tree(&page.children),
                    })
                })
                .collect(),
        }
    }

    fn build_element_tree(nodes: &[LayoutNode]) -> Vec<ElementInfo> {
        nodes.iter().filter_map(Self::element).collect()
    }

    fn element(node: &LayoutNode) -> Option<ElementInfo> {
        if !node.has_content() {
            return None;
        }
        let mut info = ElementInfo {
            kind: node.tag().name().to_string(),
            bounds: node.bounds,
            id: node.id.clone(),
            tracking_id: node.debug.tracking_id.clone(),
            lines: None,
            bullet: None,
            image_box: None,
            resource: None,
            caption: None,
            children: Self::build_element_tree(&node.children),
        };
        match &node.kind {
            NodeKind::Text(text) => {
                info.lines = text
                    .lines
                    .as_ref()
                    .map(|lines| lines.iter().map(|l| l.text.clone()).collect());
            }
            NodeKind::ListItem(item) if item.bullet.functional => {
                info.bullet = Some(BulletInfo {
                    text: item.bullet.text.clone(),
                    bounds: item.bullet.bounds,
                });
            }
            NodeKind::Picture(pic) => {
                info.image_box = Some(pic.image_box);
                info.resource = Some(pic.file.clone());
            }
            NodeKind::Photo(p) => {
                info.image_box = Some(p.image_box);
                if let Some(photo) = &p.photo {
                    info.resource = Some(photo.id.clone());
                    info.caption = photo.caption.clone();
                }
            }
            _ => {}
        }
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{LayoutEngine, PageSetup, ReportLayout};
    use super::*;
    use crate::geometry::Padding;
    use std::sync::Arc;

    #[test]
    fn summary_lists_visible_elements() {
        let mut title = text("Inspection report");
        title.id = Some("title".into());
        let report = LayoutNode::new(NodeKind::Report(ReportLayout {
            setup: Arc::new(PageSetup {
                width: 200,
                height: 200,
                margins: Padding::uniform(0),
                header: None,
                footer: None,
            }),
        }))
        .with_children(vec![title, hidden(text("secret")), space(4)]);
        let pages = LayoutEngine::new().with_wrapper(WordPerLine).paginate(report).unwrap();
        let info = LayoutInfo::from_pages(&pages);

        assert_eq!(info.pages.len(), 1);
        let root = &info.pages[0].elements[0];
        assert_eq!(root.kind, "Report");
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.children[0].lines.as_deref(),
            Some(&["Inspection".to_string(), "report".to_string()][..])
        );

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"id\":\"title\""));
        assert!(!json.contains("secret"));
    }
}
