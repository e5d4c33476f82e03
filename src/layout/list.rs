//! List items: a bullet column on the left, stacked content on the right.
//!
//! The bullet is never divided. When an item splits, exactly one side keeps
//! the functional bullet and the other gets a placeholder with no text, so a
//! bullet is drawn once, next to the first content that is actually shown.

use std::sync::Arc;

use crate::geometry::Rectangle;
use crate::style::{ListStyle, TextStyle};

use super::page_break::BreakVerdict;
use super::{restack_children, stack_children, LayoutContext, LayoutNode, NodeKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bullet {
    /// A placeholder keeps the column but draws nothing.
    pub functional: bool,
    pub number: u32,
    pub text: String,
    pub bounds: Rectangle,
}

impl Bullet {
    pub fn functional() -> Self {
        Self {
            functional: true,
            ..Self::default()
        }
    }

    pub fn placeholder() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ListItemLayout {
    pub style: Arc<ListStyle>,
    pub bullet_style: Arc<TextStyle>,
    pub bullet: Bullet,
    /// Restart numbering at this value.
    pub start: Option<u32>,
}

/// Bullet text for ordinal `number`: the style's symbol, or
/// `prefix + ordinal + suffix` when the style numbers its items.
pub fn bullet_text(style: &ListStyle, number: u32) -> String {
    match style.numbering().format(number) {
        None => style.symbol().to_string(),
        Some(ordinal) => format!(
            "{}{}{}",
            style.prefix.as_deref().unwrap_or(""),
            ordinal,
            style.suffix.as_deref().unwrap_or(".")
        ),
    }
}

/// Number each run of consecutive visible sibling list items. Hidden
/// siblings are skipped without ending the run; any other visible node ends
/// it.
pub fn renumber(children: &mut [LayoutNode]) {
    let mut next: Option<u32> = None;
    for child in children.iter_mut() {
        if !child.static_conditions_satisfied {
            continue;
        }
        let NodeKind::ListItem(item) = &mut child.kind else {
            next = None;
            continue;
        };
        let number = item.start.unwrap_or_else(|| next.unwrap_or(1));
        if item.bullet.functional {
            item.bullet.number = number;
            item.bullet.text = bullet_text(&item.style, number);
        }
        next = Some(number.saturating_add(1));
    }
}

fn bullet_bottom(node: &LayoutNode) -> i32 {
    match &node.kind {
        NodeKind::ListItem(item) => item.bullet.bounds.bottom,
        _ => node.bounds.top,
    }
}

pub(crate) fn draft(node: &mut LayoutNode, bounds: Rectangle, ctx: &LayoutContext<'_>) {
    let padding = node.padding();
    let inner = bounds.inset(&padding);
    let NodeKind::ListItem(item) = &mut node.kind else {
        return;
    };
    let indent = item.style.indent().clamp(0, inner.width());
    let bullet_height = if item.bullet.text.is_empty() {
        0
    } else {
        ctx.wrapper.line_height(&item.bullet_style)
    };
    item.bullet.bounds = Rectangle::new(
        inner.left,
        inner.top - bullet_height,
        inner.left + indent,
        inner.top,
    );
    let bullet_bottom = item.bullet.bounds.bottom;

    let content = Rectangle::new(inner.left + indent, inner.bottom, inner.right, inner.top);
    let y = stack_children(&mut node.children, content, ctx);
    let bottom = (y.min(bullet_bottom) - padding.bottom).min(bounds.top);
    node.bounds = Rectangle::new(bounds.left, bottom, bounds.right, bounds.top);
}

pub(crate) fn redraft(node: &mut LayoutNode, new_top: i32) {
    let padding = node.padding();
    let dy = new_top - node.bounds.top;
    if let NodeKind::ListItem(item) = &mut node.kind {
        let b = item.bullet.bounds;
        item.bullet.bounds = b.moved_to_top(b.top + dy);
    }
    let y = restack_children(&mut node.children, new_top - padding.top);
    let bottom = (y.min(bullet_bottom(node)) - padding.bottom).min(new_top);
    node.bounds = Rectangle::new(node.bounds.left, bottom, node.bounds.right, new_top);
}

pub(crate) fn assess(node: &mut LayoutNode, body: &Rectangle, ctx: &LayoutContext<'_>) -> BreakVerdict {
    if node.fits(body) {
        return BreakVerdict::ThisPage;
    }
    if bullet_bottom(node) < body.bottom {
        return BreakVerdict::NewPage;
    }
    node.assess_stack(body, ctx)
}

pub(crate) fn can_split(node: &LayoutNode, body: &Rectangle) -> bool {
    bullet_bottom(node) >= body.bottom && node.can_split_stack()
}

pub(crate) fn do_break(node: &mut LayoutNode) -> Option<LayoutNode> {
    let mut overflow = node.break_stack()?;
    let retained_empty = node.children.iter().all(|c| c.is_empty());
    let (NodeKind::ListItem(kept), NodeKind::ListItem(moved)) = (&mut node.kind, &mut overflow.kind)
    else {
        return Some(overflow);
    };
    if retained_empty && kept.bullet.functional {
        moved.bullet = std::mem::replace(&mut kept.bullet, Bullet::placeholder());
    } else {
        moved.bullet = Bullet::placeholder();
    }
    Some(overflow)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::numbering::Numbering;

    fn item(style: &Arc<ListStyle>, children: Vec<LayoutNode>) -> LayoutNode {
        LayoutNode::new(NodeKind::ListItem(ListItemLayout {
            style: Arc::clone(style),
            bullet_style: Arc::new(TextStyle::default()),
            bullet: Bullet::functional(),
            start: None,
        }))
        .with_children(children)
    }

    fn numbered() -> Arc<ListStyle> {
        Arc::new(ListStyle {
            numbering: Some(Numbering::Numeric),
            ..Default::default()
        })
    }

    fn bullet(node: &LayoutNode) -> &Bullet {
        match &node.kind {
            NodeKind::ListItem(item) => &item.bullet,
            _ => panic!("not a list item"),
        }
    }

    #[test]
    fn runs_are_numbered_and_hidden_items_skipped() {
        let style = numbered();
        let mut children = vec![
            item(&style, vec![text("a")]),
            hidden(item(&style, vec![text("b")])),
            item(&style, vec![text("c")]),
            text("break"),
            item(&style, vec![text("d")]),
        ];
        renumber(&mut children);
        assert_eq!(bullet(&children[0]).text, "1.");
        assert_eq!(bullet(&children[2]).text, "2.");
        assert_eq!(bullet(&children[4]).text, "1.");
    }

    #[test]
    fn start_restarts_numbering() {
        let style = Arc::new(ListStyle {
            numbering: Some(Numbering::UpperRoman),
            prefix: Some("(".into()),
            suffix: Some(")".into()),
            ..Default::default()
        });
        let mut second = item(&style, vec![text("b")]);
        if let NodeKind::ListItem(l) = &mut second.kind {
            l.start = Some(4);
        }
        let mut children = vec![item(&style, vec![text("a")]), second, item(&style, vec![text("c")])];
        renumber(&mut children);
        assert_eq!(bullet(&children[0]).text, "(I)");
        assert_eq!(bullet(&children[1]).text, "(IV)");
        assert_eq!(bullet(&children[2]).text, "(V)");
    }

    #[test]
    fn symbol_bullets_ignore_numbers() {
        let style = Arc::new(ListStyle::default());
        assert_eq!(bullet_text(&style, 7), "\u{2022}");
    }

    #[test]
    fn content_sits_right_of_the_bullet() {
        let style = numbered();
        let mut children = vec![item(&style, vec![text("a b")])];
        renumber(&mut children);
        let li = &mut children[0];
        li.draft(page(), &ctx());
        let b = bullet(li).bounds;
        assert_eq!(b.height(), 10);
        assert_eq!(b.right, 18);
        assert_eq!(li.children[0].bounds.left, 18);
        assert_eq!(li.bounds.height(), 20);
    }

    #[test]
    fn bullet_that_does_not_fit_moves_item() {
        let style = numbered();
        let mut children = vec![item(&style, vec![text("a b c")])];
        renumber(&mut children);
        let body = Rectangle::new(0, 95, 200, 100);
        let li = &mut children[0];
        li.draft(body, &ctx());
        assert_eq!(li.assess_page_break(&body, &ctx()), BreakVerdict::NewPage);
    }

    #[test]
    fn split_keeps_bullet_with_retained_content() {
        let style = numbered();
        let mut children = vec![item(&style, vec![text("a b c d")])];
        renumber(&mut children);
        let body = Rectangle::new(0, 70, 200, 100);
        let li = &mut children[0];
        li.draft(body, &ctx());
        assert_eq!(li.assess_page_break(&body, &ctx()), BreakVerdict::Split);
        let moved = li.do_page_break().unwrap();
        assert!(bullet(li).functional);
        assert_eq!(bullet(li).text, "1.");
        assert!(!bullet(&moved).functional);
        assert!(bullet(&moved).text.is_empty());
    }

    #[test]
    fn bullet_follows_content_when_nothing_stays() {
        let style = numbered();
        let mut children = vec![item(&style, vec![hidden(text("x")), text("a b")])];
        renumber(&mut children);
        let li = &mut children[0];
        li.draft(page(), &ctx());
        li.page_split_index = 1;
        let moved = li.do_page_break().unwrap();
        assert!(bullet(&moved).functional);
        assert_eq!(bullet(&moved).text, "1.");
        assert!(!bullet(li).functional);
        assert!(li.is_empty());
    }
}
