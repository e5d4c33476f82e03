//! Integration tests for the quire pagination pipeline.
//!
//! These tests exercise the path from a design (built in code, or parsed
//! from XML/JSON) through content resolution to finalized pages. They
//! verify:
//! - Table splits repeat header rows and honour min-lines
//! - List bullets are never divided and end up on exactly one side
//! - Spacers at the top of an overflow page collapse
//! - Conditions gate visibility
//! - Geometry properties hold on every finalized page

use std::sync::Arc;

use quire::condition::{Condition, ConditionKind, ContextScope, EvalEnv, LayoutRegistry};
use quire::content::{ContentData, InMemoryResolver, PhotoRecord, ResolveScope, SourceKind, SourceRef};
use quire::design::{self, DesignElement};
use quire::error::{QuireError, ResolveError};
use quire::geometry::{Padding, Rectangle};
use quire::image_loader::{ImageFormat, ImageInfo, ImageService};
use quire::layout::photo::rebuild_rows;
use quire::layout::{
    list, BreakVerdict, Bullet, BumpResult, CellLayout, LayoutContext, LayoutEngine, LayoutInfo,
    LayoutNode, ListItemLayout, NodeKind, NodeTag, PageSetup, PhotoLayout, PhotoTableLayout,
    PictureLayout, ReportLayout, RowLayout, SpaceLayout, TableLayout, TextLayout,
};
use quire::numbering::Numbering;
use quire::style::{CellStyle, LineStyle, ListStyle, PhotoStyle, TableStyle, TextStyle};
use quire::text::{LineWrapper, WrappedLine};

// ─── Helpers ────────────────────────────────────────────────────

/// One word per line, 10 units per line, 6 units per character.
struct FixedWrapper;

impl LineWrapper for FixedWrapper {
    fn wrap(&self, text: &str, _style: &TextStyle, _max_width: i32) -> Vec<WrappedLine> {
        text.split_whitespace()
            .map(|w| WrappedLine {
                text: w.to_string(),
                width: 6 * w.chars().count() as i32,
                hard_break: true,
            })
            .collect()
    }

    fn line_height(&self, _style: &TextStyle) -> i32 {
        10
    }
}

/// Knows exactly one picture.
struct LogoOnly;

impl ImageService for LogoOnly {
    fn info(&self, src: &str) -> Result<ImageInfo, ResolveError> {
        if src == "logo.png" {
            Ok(ImageInfo {
                width_px: 200,
                height_px: 100,
                format: ImageFormat::Png,
            })
        } else {
            Err(ResolveError::NotFound { what: src.to_string() })
        }
    }
}

fn ctx() -> LayoutContext<'static> {
    LayoutContext::new(&FixedWrapper)
}

fn engine() -> LayoutEngine {
    LayoutEngine::new().with_wrapper(FixedWrapper).with_images(LogoOnly)
}

fn make_text(words: &str) -> LayoutNode {
    LayoutNode::new(NodeKind::Text(TextLayout::literal(
        Arc::new(TextStyle::default()),
        words,
    )))
}

fn make_space(height: i32) -> LayoutNode {
    LayoutNode::new(NodeKind::Space(SpaceLayout {
        height,
        collapsed: false,
    }))
}

fn make_cell(words: &str) -> LayoutNode {
    LayoutNode::new(NodeKind::TableCell(CellLayout {
        style: Arc::new(CellStyle::default()),
        span: 1,
    }))
    .with_children(vec![make_text(words)])
}

fn make_row(is_header: bool, cells: Vec<LayoutNode>) -> LayoutNode {
    LayoutNode::new(NodeKind::TableRow(RowLayout {
        is_header,
        edges: Vec::new(),
    }))
    .with_children(cells)
}

/// `headers` rows labelled H0.., then `rows` rows labelled R1..
fn make_table(headers: usize, rows: usize) -> LayoutNode {
    let mut children: Vec<LayoutNode> = (0..headers)
        .map(|i| make_row(true, vec![make_cell(&format!("H{}", i)), make_cell("Qty")]))
        .collect();
    children.extend(
        (1..=rows).map(|i| make_row(false, vec![make_cell(&format!("R{}", i)), make_cell("1")])),
    );
    LayoutNode::new(NodeKind::Table(TableLayout {
        style: Arc::new(TableStyle::default()),
        columns: Vec::new(),
    }))
    .with_children(children)
}

fn numbered_style() -> Arc<ListStyle> {
    Arc::new(ListStyle {
        numbering: Some(Numbering::Numeric),
        ..Default::default()
    })
}

fn make_list_item(style: &Arc<ListStyle>, children: Vec<LayoutNode>) -> LayoutNode {
    LayoutNode::new(NodeKind::ListItem(ListItemLayout {
        style: Arc::clone(style),
        bullet_style: Arc::new(TextStyle::default()),
        bullet: Bullet::functional(),
        start: None,
    }))
    .with_children(children)
}

fn make_photo_table(ids: &[&str]) -> LayoutNode {
    let mut node = LayoutNode::new(NodeKind::PhotoTable(PhotoTableLayout {
        style: Arc::new(PhotoStyle::default()),
        columns: 2,
        sources: vec![Arc::new(SourceRef::new(SourceKind::Form, "roof"))],
        context: ContextScope::Local,
        merge: false,
        photos: ids
            .iter()
            .map(|id| PhotoRecord {
                id: id.to_string(),
                ..Default::default()
            })
            .collect(),
    }));
    rebuild_rows(&mut node);
    node
}

fn make_report(width: i32, height: i32, margin: i32, children: Vec<LayoutNode>) -> LayoutNode {
    LayoutNode::new(NodeKind::Report(ReportLayout {
        setup: Arc::new(PageSetup {
            width,
            height,
            margins: Padding::uniform(margin),
            header: None,
            footer: None,
        }),
    }))
    .with_children(children)
}

fn bullet(node: &LayoutNode) -> &Bullet {
    match &node.kind {
        NodeKind::ListItem(item) => &item.bullet,
        _ => panic!("expected a list item, got {:?}", node.tag()),
    }
}

fn text_of(node: &LayoutNode) -> String {
    match &node.kind {
        NodeKind::Text(t) => t.content.clone(),
        _ => panic!("expected text, got {:?}", node.tag()),
    }
}

/// Label in the first cell of a table row.
fn row_label(row: &LayoutNode) -> String {
    text_of(&row.children[0].children[0])
}

fn body_root(page: &LayoutNode) -> &LayoutNode {
    &page.children[0]
}

// ─── Property walkers ───────────────────────────────────────────

fn horizontal(node: &LayoutNode) -> bool {
    matches!(node.tag(), NodeTag::TableRow | NodeTag::PhotoRow)
}

/// Siblings never overlap: vertically stacked kinds go top to bottom,
/// rows go left to right.
fn assert_no_overlap(node: &LayoutNode) {
    let shown: Vec<&LayoutNode> = node.children.iter().filter(|c| c.has_content()).collect();
    for pair in shown.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if horizontal(node) {
            assert!(
                a.bounds.right <= b.bounds.left,
                "{:?} overlaps its right neighbour: {:?} / {:?}",
                a.tag(),
                a.bounds,
                b.bounds
            );
        } else {
            assert!(
                a.bounds.bottom >= b.bounds.top,
                "{:?} overlaps the next {:?}: {:?} / {:?}",
                a.tag(),
                b.tag(),
                a.bounds,
                b.bounds
            );
        }
    }
    for child in &node.children {
        assert_no_overlap(child);
    }
}

/// Every shown child lies inside its parent's padded box.
fn assert_contained(node: &LayoutNode) {
    let pad = node.padding();
    let inner = node.bounds.inset(&pad);
    for child in node.children.iter().filter(|c| c.has_content()) {
        let b = child.bounds;
        assert!(
            b.top <= inner.top && b.bottom >= inner.bottom && b.left >= inner.left && b.right <= inner.right,
            "{:?} {:?} escapes {:?} {:?}",
            child.tag(),
            b,
            node.tag(),
            inner
        );
        assert!(b.is_valid(), "{:?} has inverted bounds {:?}", child.tag(), b);
    }
    for child in &node.children {
        assert_contained(child);
    }
}

/// Emptiness is stable and a repeated top-space collapse changes nothing.
fn assert_idempotent_emptiness(node: &LayoutNode) {
    node.walk(&mut |n| assert_eq!(n.is_empty(), n.is_empty()));
    let mut copy = node.clone();
    copy.collapse_top_space();
    let top = copy.bounds.top;
    copy.redraft(top);
    let once = copy.bounds.height();
    copy.collapse_top_space();
    copy.redraft(top);
    assert_eq!(copy.bounds.height(), once);
}

fn check_pages(pages: &[LayoutNode]) {
    for page in pages {
        let NodeKind::Page(layout) = &page.kind else {
            panic!("expected a page");
        };
        let root = body_root(page);
        assert!(root.bounds.top <= layout.body.top);
        assert!(root.bounds.bottom >= layout.body.bottom, "root runs past the body box");
        assert_no_overlap(page);
        assert_contained(page);
        assert_idempotent_emptiness(root);
    }
}

/// Shown nodes of a tag across every page, in order.
fn collect<'a>(pages: &'a [LayoutNode], tag: NodeTag) -> Vec<&'a LayoutNode> {
    let mut found = Vec::new();
    for page in pages {
        collect_into(page, tag, &mut found);
    }
    found
}

fn collect_into<'a>(node: &'a LayoutNode, tag: NodeTag, found: &mut Vec<&'a LayoutNode>) {
    if node.tag() == tag && node.has_content() {
        found.push(node);
    }
    for child in &node.children {
        collect_into(child, tag, found);
    }
}

// ─── Tables ─────────────────────────────────────────────────────

#[test]
fn test_table_split_never_breaks_inside_headers() {
    let mut table = make_table(3, 10);
    table.rules.min_lines = 2;
    // 13 rows of 10 from the top at 100; the sixth data row ends at 10
    let body = Rectangle::new(0, 15, 200, 100);
    table.draft(body, &ctx());

    assert_eq!(table.assess_page_break(&body, &ctx()), BreakVerdict::Split);
    assert!(table.page_split_index >= 3);
    assert_eq!(table.page_split_index, 8);
    assert!(table.can_split(&body));

    let overflow = table.do_page_break().unwrap();
    let labels: Vec<String> = overflow.children.iter().map(row_label).collect();
    assert_eq!(labels, vec!["H0", "H1", "H2", "R6", "R7", "R8", "R9", "R10"]);

    let kept: Vec<String> = table.children.iter().map(row_label).collect();
    assert_eq!(kept, vec!["H0", "H1", "H2", "R1", "R2", "R3", "R4", "R5"]);
}

#[test]
fn test_table_min_lines_pulls_rows_back() {
    let mut table = make_table(1, 4);
    table.rules.min_lines = 2;
    // header + 3 data rows fit, which would leave a single widow row
    let body = Rectangle::new(0, 55, 200, 100);
    table.draft(body, &ctx());
    assert_eq!(table.assess_page_break(&body, &ctx()), BreakVerdict::Split);
    let overflow = table.do_page_break().unwrap();
    assert_eq!(overflow.children.len(), 1 + 2);
    assert_eq!(table.children.len(), 1 + 2);
}

#[test]
fn test_table_headers_repeat_on_every_page() {
    let report = make_report(200, 140, 10, vec![make_text("Items"), make_table(2, 25)]);
    let pages = engine().paginate(report).unwrap();
    assert!(pages.len() >= 3, "expected several pages, got {}", pages.len());

    let tables = collect(&pages, NodeTag::Table);
    assert_eq!(tables.len(), pages.len());
    let mut data = Vec::new();
    for table in &tables {
        assert_eq!(row_label(&table.children[0]), "H0");
        assert_eq!(row_label(&table.children[1]), "H1");
        data.extend(table.children[2..].iter().map(row_label));
    }
    // every data row exactly once, in order
    let expected: Vec<String> = (1..=25).map(|i| format!("R{}", i)).collect();
    assert_eq!(data, expected);
    check_pages(&pages);
}

// ─── Lists ──────────────────────────────────────────────────────

#[test]
fn test_list_bullet_stays_with_retained_content() {
    let style = numbered_style();
    let mut items = vec![make_list_item(&style, vec![make_text("a b c d")])];
    list::renumber(&mut items);
    let item = &mut items[0];

    let body = Rectangle::new(0, 70, 200, 100);
    item.draft(body, &ctx());
    assert_eq!(item.assess_page_break(&body, &ctx()), BreakVerdict::Split);
    assert!(item.can_split(&body));

    let moved = item.do_page_break().unwrap();
    assert!(bullet(item).functional);
    assert_eq!(bullet(item).text, "1.");
    assert!(!bullet(&moved).functional);
    assert!(bullet(&moved).text.is_empty());
    assert_eq!(text_of(&moved.children[0]), "d");
}

#[test]
fn test_list_bullet_moves_when_nothing_stays() {
    let style = numbered_style();
    let mut hidden = make_text("draft note");
    hidden.static_conditions_satisfied = false;
    let mut items = vec![make_list_item(&style, vec![hidden, make_text("a b")])];
    list::renumber(&mut items);
    let item = &mut items[0];
    item.draft(Rectangle::new(0, 0, 200, 100), &ctx());
    item.page_split_index = 1;

    let moved = item.do_page_break().unwrap();
    assert!(item.is_empty());
    assert!(!bullet(item).functional);
    assert!(bullet(&moved).functional);
    assert_eq!(bullet(&moved).text, "1.");

    // the moved bullet still takes part in numbering
    let mut run = vec![moved, make_list_item(&style, vec![make_text("c")])];
    list::renumber(&mut run);
    assert_eq!(bullet(&run[0]).text, "1.");
    assert_eq!(bullet(&run[1]).text, "2.");
}

#[test]
fn test_list_bullet_that_does_not_fit_moves_the_item() {
    let style = numbered_style();
    let mut items = vec![make_list_item(&style, vec![make_text("a b")])];
    list::renumber(&mut items);
    let body = Rectangle::new(0, 95, 200, 100);
    items[0].draft(body, &ctx());
    assert_eq!(items[0].assess_page_break(&body, &ctx()), BreakVerdict::NewPage);
    assert!(!items[0].can_split(&body));
}

#[test]
fn test_paginated_list_draws_each_bullet_once() {
    let style = numbered_style();
    let mut items: Vec<LayoutNode> = (0..6)
        .map(|i| make_list_item(&style, vec![make_text(&format!("step{} w1 w2 w3 w4", i))]))
        .collect();
    list::renumber(&mut items);
    let report = make_report(200, 140, 10, items);
    let pages = engine().paginate(report).unwrap();
    assert!(pages.len() >= 2);

    let shown: Vec<String> = collect(&pages, NodeTag::ListItem)
        .into_iter()
        .map(bullet)
        .filter(|b| b.functional)
        .map(|b| b.text.clone())
        .collect();
    assert_eq!(shown, vec!["1.", "2.", "3.", "4.", "5.", "6."]);
    check_pages(&pages);
}

// ─── Spacers and page-break rules ───────────────────────────────

#[test]
fn test_spacer_at_page_top_collapses() {
    let mut group = LayoutNode::group(vec![make_space(40), make_text("a b")]);
    group.draft(Rectangle::new(0, 0, 200, 100), &ctx());
    let before = group.children[1].bounds.top;
    assert_eq!(before, 60);

    assert!(!group.collapse_top_space());
    group.redraft(100);
    assert_eq!(group.children[0].bounds.height(), 0);
    assert_eq!(group.children[1].bounds.top - before, 40);
    assert_eq!(group.children[1].bounds.height(), 20);

    // a second collapse changes nothing
    group.collapse_top_space();
    group.redraft(100);
    assert_eq!(group.children[1].bounds.top, 100);
    assert_eq!(group.bounds.height(), 20);
}

#[test]
fn test_overflow_page_starts_without_leading_space() {
    // body is 100 high; the words fill page 1 exactly
    let report = make_report(
        200,
        120,
        10,
        vec![
            make_text("w1 w2 w3 w4 w5 w6 w7 w8 w9 w10"),
            make_space(40),
            make_text("after"),
        ],
    );
    let pages = engine().paginate(report).unwrap();
    assert_eq!(pages.len(), 2);
    let root = body_root(&pages[1]);
    assert_eq!(root.children[0].bounds.height(), 0);
    assert_eq!(root.children[1].bounds.top, 110);
    check_pages(&pages);
}

#[test]
fn test_keep_with_next_moves_heading_along() {
    let mut heading = make_text("Findings");
    heading.rules.keep_with_next = true;
    let report = make_report(200, 120, 10, vec![make_space(80), heading, make_space(30)]);
    let pages = engine().paginate(report).unwrap();
    assert_eq!(pages.len(), 2);

    let first = body_root(&pages[0]);
    assert_eq!(first.children.iter().filter(|c| c.has_content()).count(), 1);
    let second = body_root(&pages[1]);
    assert_eq!(text_of(&second.children[0]), "Findings");
    assert_eq!(second.children[0].bounds.top, 110);
}

#[test]
fn test_new_page_rule_starts_a_page() {
    let mut chapter = make_text("Chapter two");
    chapter.rules.new_page = true;
    let report = make_report(200, 120, 10, vec![make_text("Intro"), chapter]);
    let pages = engine().paginate(report).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(text_of(&body_root(&pages[1]).children[0]), "Chapter two");
}

// ─── Never-split kinds ──────────────────────────────────────────

fn never_split_nodes() -> Vec<LayoutNode> {
    let mut picture = PictureLayout::new("logo.png");
    picture.info = Some(ImageInfo {
        width_px: 100,
        height_px: 100,
        format: ImageFormat::Png,
    });
    let photo = || {
        LayoutNode::new(NodeKind::Photo(PhotoLayout::resolved(
            Arc::new(PhotoStyle::default()),
            PhotoRecord {
                id: "p1".into(),
                ..Default::default()
            },
        )))
    };
    vec![
        LayoutNode::new(NodeKind::Line(Arc::new(LineStyle::default()))),
        make_space(30),
        LayoutNode::new(NodeKind::Picture(picture)),
        photo(),
        LayoutNode::new(NodeKind::PhotoRow(2)).with_children(vec![photo(), photo()]),
    ]
}

#[test]
fn test_never_split_kinds_move_whole() {
    for mut node in never_split_nodes() {
        let tag = node.tag();
        node.draft(Rectangle::new(0, 0, 200, 100), &ctx());
        assert_eq!(node.bump_page_split_index(), BumpResult::Impossible, "{:?}", tag);
        assert!(!node.can_split(&Rectangle::new(0, 50, 200, 100)), "{:?}", tag);

        let moved = node.do_page_break().expect("content moves");
        assert!(node.is_empty(), "{:?} kept content after a break", tag);
        assert!(moved.has_content(), "{:?} lost content in a break", tag);
        assert_eq!(node.bounds.height(), 0);
    }
}

#[test]
fn test_photo_rows_are_conserved_across_pages() {
    let ids = ["a", "b", "c", "d", "e"];
    let report = make_report(200, 140, 10, vec![make_text("Photos"), make_photo_table(&ids)]);
    let pages = engine().paginate(report).unwrap();
    assert!(pages.len() >= 2);

    let shown: Vec<String> = collect(&pages, NodeTag::Photo)
        .into_iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Photo(p) => p.photo.as_ref().map(|r| r.id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(shown, ids);
    check_pages(&pages);
}

// ─── Properties over a mixed document ───────────────────────────

#[test]
fn test_mixed_document_properties() {
    let style = numbered_style();
    let mut gap = make_space(50);
    gap.id = Some("gap".into());
    let paragraph = (1..=30).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
    let mut para = make_text(&paragraph);
    para.id = Some("para".into());

    let mut children = vec![
        make_text("Summary"),
        LayoutNode::new(NodeKind::Line(Arc::new(LineStyle::default()))),
        para,
        gap,
        make_table(1, 12),
    ];
    children.extend((0..4).map(|i| make_list_item(&style, vec![make_text(&format!("item{} x y", i))])));
    list::renumber(&mut children);

    let pages = engine().paginate(make_report(200, 140, 10, children)).unwrap();
    assert!(pages.len() >= 3);
    check_pages(&pages);

    // split conservation: every paragraph line appears once, in order
    let mut lines = Vec::new();
    for page in &pages {
        page.walk(&mut |n| {
            if n.id.as_deref() == Some("para") && n.has_content() {
                if let NodeKind::Text(t) = &n.kind {
                    lines.extend(t.lines.iter().flatten().map(|l| l.text.clone()));
                }
            }
        });
    }
    let words: Vec<String> = paragraph.split(' ').map(str::to_string).collect();
    assert_eq!(lines, words);

    // the spacer shows on exactly one page
    let mut gaps = 0;
    for page in &pages {
        page.walk(&mut |n| {
            if n.id.as_deref() == Some("gap") && n.has_content() {
                gaps += 1;
            }
        });
    }
    assert_eq!(gaps, 1);

    // page numbering is final
    for (i, page) in pages.iter().enumerate() {
        match &page.kind {
            NodeKind::Page(p) => assert_eq!((p.number, p.count), (i + 1, pages.len())),
            _ => panic!("expected a page"),
        }
    }
}

// ─── Conditions ─────────────────────────────────────────────────

fn resolver_with_photos(n: usize) -> InMemoryResolver {
    let mut data = ContentData::default();
    data.photos.insert(
        "roof".into(),
        (0..n)
            .map(|i| PhotoRecord {
                id: format!("p{}", i),
                ..Default::default()
            })
            .collect(),
    );
    InMemoryResolver::new(data)
}

#[test]
fn test_photo_count_condition() {
    let condition = Condition::new(
        ConditionKind::PhotoCount {
            target: Arc::new(SourceRef::new(SourceKind::Form, "roof")),
            minimum: 1,
            maximum: 3,
            context: ContextScope::Document,
        },
        true,
        false,
    );
    let layouts = LayoutRegistry::default();
    let eval = |resolver: &InMemoryResolver| {
        condition.evaluate(&EvalEnv {
            resolver,
            scope: ResolveScope::document(),
            layouts: &layouts,
        })
    };
    assert!(!eval(&resolver_with_photos(5)));
    assert!(eval(&resolver_with_photos(2)));

    let contradictory = Condition {
        prohibit: true,
        ..condition.clone()
    };
    let resolver = resolver_with_photos(2);
    assert!(!contradictory.evaluate(&EvalEnv {
        resolver: &resolver,
        scope: ResolveScope::document(),
        layouts: &layouts,
    }));
}

// ─── Loading from XML and JSON ──────────────────────────────────

const SITE_REPORT: &str = r#"<Report width="200" height="160" marginTop="10" marginBottom="10" marginLeft="10" marginRight="10">
  <Styles>
    <ListStyle name="Steps" numbering="numeric"/>
  </Styles>
  <Header><Text text="Site"/></Header>
  <Footer><Text text="{page}/{pages}"/></Footer>
  <Text source="text:title" id="title"/>
  <Text text="Untitled">
    <Conditions><EmptyLayout layout="title" require="true"/></Conditions>
  </Text>
  <ListItem style="Steps"><Text text="Inspect"/></ListItem>
  <ListItem style="Steps">
    <Conditions><DocTag tag="draft" require="true"/></Conditions>
    <Text text="Draft-only"/>
  </ListItem>
  <ListItem style="Steps"><Text text="Measure"/></ListItem>
  <PhotoTable source="form:roof" columns="2"/>
  <Text text="Few">
    <Conditions><PhotoCount target="form:roof" minimum="1" maximum="3" require="true"/></Conditions>
  </Text>
</Report>"#;

const SITE_CONTENT: &str = r#"{
  "tags": ["final"],
  "texts": { "title": "Site Report" },
  "photos": { "roof": [ { "id": "r1", "caption": "North" }, { "id": "r2" } ] }
}"#;

#[test]
fn test_xml_design_end_to_end() {
    let design = design::from_xml(SITE_REPORT).unwrap();
    let resolver = InMemoryResolver::from_json(SITE_CONTENT).unwrap();
    let generation = engine().generate(&design, &resolver).unwrap();
    assert!(generation.diagnostics.is_clean(), "{:?}", generation.diagnostics);

    // the photo row does not fit under the list and moves with the text after it
    let pages = &generation.pages;
    assert_eq!(pages.len(), 2);
    check_pages(pages);

    let info = LayoutInfo::from_pages(pages);
    let first = &info.pages[0];
    assert_eq!(first.body, Rectangle::new(10, 20, 190, 140));
    let root = &first.elements[0];
    let kinds: Vec<&str> = root.children.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Text", "ListItem", "ListItem"]);
    assert_eq!(
        root.children[0].lines.as_deref(),
        Some(&["Site".to_string(), "Report".to_string()][..])
    );
    let bullets: Vec<&str> = root.children[1..]
        .iter()
        .filter_map(|e| e.bullet.as_ref().map(|b| b.text.as_str()))
        .collect();
    assert_eq!(bullets, vec!["1.", "2."]);

    let second = &info.pages[1].elements[0];
    let kinds: Vec<&str> = second.children.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["PhotoTable", "Text"]);
    let photo = &second.children[0].children[0].children[0];
    assert_eq!(photo.resource.as_deref(), Some("r1"));
    assert_eq!(photo.caption.as_deref(), Some("North"));

    for (i, page) in info.pages.iter().enumerate() {
        let footer = page.footer.as_ref().unwrap();
        let expected = format!("{}/2", i + 1);
        assert_eq!(footer.children[0].lines.as_deref(), Some(&[expected][..]));
        assert_eq!(footer.bounds.top, 20);
    }
}

#[test]
fn test_json_design_collapses_spacer_on_second_page() {
    let json = r#"{
      "name": "Report",
      "attributes": { "width": "200", "height": "100",
                      "marginTop": "0", "marginBottom": "0", "marginLeft": "0", "marginRight": "0" },
      "children": [
        { "name": "Text", "attributes": { "text": "alpha beta gamma" } },
        { "name": "Space", "attributes": { "height": "95" } },
        { "name": "Text", "attributes": { "text": "delta" } }
      ]
    }"#;
    let design = design::from_json(json).unwrap();
    let generation = engine().generate(&design, &InMemoryResolver::default()).unwrap();
    let pages = &generation.pages;
    assert_eq!(pages.len(), 2);
    let root = body_root(&pages[1]);
    assert_eq!(root.children[0].bounds.height(), 0);
    assert_eq!(text_of(&root.children[1]), "delta");
    assert_eq!(root.children[1].bounds.top, 100);
    check_pages(pages);
}

#[test]
fn test_missing_content_is_counted_not_fatal() {
    let design = DesignElement::new("Report").with_children(vec![
        DesignElement::new("Text").attr("source", "text:absent"),
        DesignElement::new("Picture").attr("file", "missing.png"),
        DesignElement::new("Picture").attr("file", "logo.png").attr("align", "center"),
    ]);
    let generation = engine().generate(&design, &InMemoryResolver::default()).unwrap();
    let d = &generation.diagnostics;
    assert_eq!((d.missing_content, d.missing_resources, d.missing_photos), (1, 1, 0));

    assert_eq!(generation.pages.len(), 1);
    let pictures = collect(&generation.pages, NodeTag::Picture);
    assert_eq!(pictures.len(), 1);
    match &pictures[0].kind {
        // 200x100 px at 96 dpi, centred in the 540 wide body
        NodeKind::Picture(p) => {
            assert_eq!((p.image_box.width(), p.image_box.height()), (150, 75));
            assert_eq!(p.image_box.left, 36 + (540 - 150) / 2);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_design_errors_carry_position() {
    let xml = "<Report>\n  <PhotoTable columns=\"0\" source=\"form:roof\"/>\n</Report>";
    let design = design::from_xml(xml).unwrap();
    match engine().generate(&design, &InMemoryResolver::default()) {
        Err(QuireError::Design(e)) => {
            assert!(e.message.contains("columns"), "{}", e.message);
            assert_eq!((e.line, e.column), (2, 3));
        }
        other => panic!("expected a design error, got {:?}", other.map(|g| g.pages.len())),
    }
}

#[test]
fn test_chapter_scoped_photos() {
    let content = r#"{
      "photos": { "roof": [ { "id": "doc" } ] },
      "chapters": { "unit-2": { "photos": { "roof": [ { "id": "u2a" }, { "id": "u2b" } ] } } }
    }"#;
    let design = DesignElement::new("Report").with_children(vec![
        DesignElement::new("Group")
            .attr("chapter", "unit-2")
            .child(DesignElement::new("PhotoTable").attr("source", "form:roof")),
        DesignElement::new("PhotoTable").attr("source", "form:roof"),
    ]);
    let resolver = InMemoryResolver::from_json(content).unwrap();
    let generation = engine().generate(&design, &resolver).unwrap();

    let per_table: Vec<Vec<String>> = collect(&generation.pages, NodeTag::PhotoTable)
        .into_iter()
        .filter_map(|table| match &table.kind {
            NodeKind::PhotoTable(t) => Some(t.photos.iter().map(|p| p.id.clone()).collect()),
            _ => None,
        })
        .collect();
    assert_eq!(per_table, vec![vec!["u2a", "u2b"], vec!["doc"]]);
}
