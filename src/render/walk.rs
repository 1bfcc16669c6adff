//! Markdown parsing and the syntax tree walk.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};

use super::renderer::{ListItemKind, Renderer};
use super::sentinel::has_visible_text;
use crate::align::Alignment;

/// Parse `source` and drive `renderer` over the resulting tree.
pub fn render_markdown(source: &str, renderer: &mut Renderer<'_>) {
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;

    let root = parse_document(&arena, source, &options);
    walk(root, renderer);
}

/// Render one node and everything below it.
pub fn walk<'a>(node: &'a AstNode<'a>, renderer: &mut Renderer<'_>) {
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            renderer.header(heading.level, |r| walk_children(node, r));
        }
        NodeValue::Paragraph => {
            renderer.paragraph(in_tight_list(node), |r| walk_children(node, r));
        }
        NodeValue::BlockQuote => renderer.block_quote(|r| walk_children(node, r)),
        NodeValue::CodeBlock(code_block) => {
            let language = code_block.info.split_whitespace().next();
            match language.and_then(|language| delimited_table(language, &code_block.literal)) {
                Some(table) => renderer.table_grid(&table.header, &table.body, &[]),
                None => renderer.code_block(language, &code_block.literal),
            }
        }
        NodeValue::HtmlBlock(html) => renderer.html_block(&html.literal),
        NodeValue::ThematicBreak => renderer.horizontal_rule(),
        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, ListType::Ordered);
            let start = list.start;
            renderer.list(|r| walk_items(node, ordered, start, r));
        }
        NodeValue::DescriptionList => {
            renderer.description_list(|r| walk_terms(node, r), |r| walk_children(node, r));
        }
        NodeValue::DescriptionTerm => {
            renderer.list_item(ListItemKind::Term, |r| walk_children(node, r));
        }
        NodeValue::DescriptionDetails => {
            renderer.list_item(ListItemKind::Definition, |r| walk_children(node, r));
        }
        NodeValue::Table(table) => {
            let alignments: Vec<Alignment> = table
                .alignments
                .iter()
                .map(|alignment| match alignment {
                    TableAlignment::Center => Alignment::Center,
                    TableAlignment::Right => Alignment::Right,
                    TableAlignment::Left | TableAlignment::None => Alignment::Left,
                })
                .collect();
            renderer.table(
                &alignments,
                |r| walk_rows(node, true, r),
                |r| walk_rows(node, false, r),
            );
        }
        NodeValue::FootnoteDefinition(definition) => {
            renderer.footnote_definition(&definition.name, |r| walk_children(node, r));
        }
        NodeValue::Text(text) => renderer.text(text),
        NodeValue::SoftBreak => renderer.soft_break(),
        NodeValue::LineBreak => renderer.line_break(),
        NodeValue::Code(code) => renderer.code_span(&code.literal),
        NodeValue::HtmlInline(html) => renderer.raw_html(html),
        NodeValue::Emph => match sole_child(node, |value| matches!(value, NodeValue::Strong)) {
            Some(inner) => renderer.strong_emphasis(|r| walk_children(inner, r)),
            None => renderer.emphasis(|r| walk_children(node, r)),
        },
        NodeValue::Strong => match sole_child(node, |value| matches!(value, NodeValue::Emph)) {
            Some(inner) => renderer.strong_emphasis(|r| walk_children(inner, r)),
            None => renderer.strong(|r| walk_children(node, r)),
        },
        NodeValue::Strikethrough => renderer.strikethrough(|r| walk_children(node, r)),
        NodeValue::Link(link) => {
            if is_autolink(node, &link.url) {
                renderer.autolink(&link.url);
            } else {
                renderer.link(&link.url, &link.title, |r| walk_children(node, r));
            }
        }
        NodeValue::Image(image) => renderer.image(&image.url, &image.title, &extract_text(node)),
        NodeValue::FootnoteReference(reference) => renderer.footnote_ref(&reference.name),
        _ => {
            walk_children(node, renderer);
        }
    }
}

/// Render all children, reporting whether anything visible came out.
fn walk_children<'a>(node: &'a AstNode<'a>, renderer: &mut Renderer<'_>) -> bool {
    let mark = renderer.context().output().mark();
    for child in node.children() {
        walk(child, renderer);
    }
    has_visible_text(renderer.context().output().since(mark))
}

fn walk_items<'a>(
    list: &'a AstNode<'a>,
    ordered: bool,
    start: usize,
    renderer: &mut Renderer<'_>,
) -> bool {
    let mark = renderer.context().output().mark();
    for (index, item) in list.children().enumerate() {
        let kind = match &item.data.borrow().value {
            NodeValue::TaskItem(symbol) => ListItemKind::Task(symbol.is_some()),
            _ if ordered => ListItemKind::Ordered(start + index),
            _ => ListItemKind::Bullet,
        };
        renderer.list_item(kind, |r| walk_children(item, r));
    }
    has_visible_text(renderer.context().output().since(mark))
}

/// Render only the terms of a description list.
fn walk_terms<'a>(list: &'a AstNode<'a>, renderer: &mut Renderer<'_>) -> bool {
    for item in list.children() {
        for part in item.children() {
            if matches!(part.data.borrow().value, NodeValue::DescriptionTerm) {
                walk(part, renderer);
            }
        }
    }
    true
}

fn walk_rows<'a>(table: &'a AstNode<'a>, header: bool, renderer: &mut Renderer<'_>) -> bool {
    for row in table.children() {
        let is_header = match row.data.borrow().value {
            NodeValue::TableRow(is_header) => is_header,
            _ => continue,
        };
        if is_header != header {
            continue;
        }
        renderer.table_row(|r| {
            for cell in row.children() {
                r.table_cell(|r| walk_children(cell, r));
            }
            true
        });
    }
    true
}

/// Paragraphs directly inside items of a tight list.
fn in_tight_list<'a>(node: &'a AstNode<'a>) -> bool {
    node.parent()
        .filter(|item| {
            matches!(
                item.data.borrow().value,
                NodeValue::Item(_) | NodeValue::TaskItem(_)
            )
        })
        .and_then(|item| item.parent())
        .is_some_and(|list| matches!(&list.data.borrow().value, NodeValue::List(list) if list.tight))
}

/// The only child of `node`, if it is what `wanted` accepts.
fn sole_child<'a>(
    node: &'a AstNode<'a>,
    wanted: impl Fn(&NodeValue) -> bool,
) -> Option<&'a AstNode<'a>> {
    let child = node.first_child()?;
    if child.next_sibling().is_some() {
        return None;
    }
    wanted(&child.data.borrow().value).then_some(child)
}

/// Links whose text is their own address.
fn is_autolink<'a>(node: &'a AstNode<'a>, url: &str) -> bool {
    let text = extract_text(node);
    !text.is_empty() && (text == url || url.strip_prefix("mailto:") == Some(text.as_str()))
}

/// Plain text of a node's descendants.
fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(value) => text.push_str(value),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

/// Rows of a `csv` or `tsv` fenced block; the first record is the header.
#[derive(Debug)]
struct DelimitedTable {
    header: Vec<Vec<String>>,
    body: Vec<Vec<String>>,
}

fn delimited_table(language: &str, literal: &str) -> Option<DelimitedTable> {
    let delimiter = match language.to_ascii_lowercase().as_str() {
        "csv" => b',',
        "tsv" => b'\t',
        _ => return None,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(literal.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(record.iter().map(|field| field.trim().to_string()).collect()),
            Err(err) => {
                tracing::debug!(%err, language, "delimited block rendered as code");
                return None;
            }
        }
    }
    if rows.is_empty() {
        return None;
    }
    let body = rows.split_off(1);
    Some(DelimitedTable { header: rows, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options as RenderOptions;

    fn annotated(markdown: &str) -> String {
        let options = RenderOptions {
            width: 60,
            ..RenderOptions::default()
        }
        .resolve();
        let mut renderer = Renderer::new(&options);
        render_markdown(markdown, &mut renderer);
        renderer.finish()
    }

    #[test]
    fn test_delimited_table_from_csv() {
        let table = delimited_table("csv", "a, b\n1,2\n3,4\n").unwrap();
        assert_eq!(table.header, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(table.body.len(), 2);
    }

    #[test]
    fn test_delimited_table_tsv_and_other_languages() {
        let table = delimited_table("TSV", "x\ty\n").unwrap();
        assert_eq!(table.header[0], vec!["x".to_string(), "y".to_string()]);
        assert!(delimited_table("rust", "a,b").is_none());
        assert!(delimited_table("csv", "").is_none());
    }

    #[test]
    fn test_delimited_table_tolerates_ragged_rows() {
        let table = delimited_table("csv", "a,b,c\n1\n").unwrap();
        assert_eq!(table.body[0], vec!["1".to_string()]);
    }

    #[test]
    fn test_triple_emphasis_is_one_span() {
        let out = annotated("***both***");
        assert_eq!(out, "***both***");
    }

    #[test]
    fn test_autolink_detection() {
        let out = annotated("see <https://example.com> and [site](https://example.com)");
        assert_eq!(
            out,
            "see https://example.com and [site] https://example.com"
        );
    }

    #[test]
    fn test_mailto_autolink() {
        assert_eq!(annotated("<me@example.com>"), "me@example.com");
    }

    #[test]
    fn test_image_uses_alt_text() {
        assert_eq!(annotated("![a *cat*](cat.png)"), "[a cat] cat.png");
    }

    #[test]
    fn test_tight_list_paragraphs_have_no_blank_lines() {
        let out = annotated("- one\n- two\n");
        assert!(!out.contains("\u{1}\u{1}"), "unexpected blank line: {out:?}");
    }

    #[test]
    fn test_ordered_list_numbers_from_start() {
        let out = annotated("3. three\n4. four\n");
        assert!(out.contains(" 3. "));
        assert!(out.contains(" 4. "));
    }

    #[test]
    fn test_task_list_markers() {
        let out = annotated("- [x] done\n- [ ] todo\n");
        assert!(out.contains("[x] "));
        assert!(out.contains("[ ] "));
    }

    #[test]
    fn test_extract_text_flattens_inline_markup() {
        let arena = Arena::new();
        let root = parse_document(&arena, "a **b** `c`\nd", &Options::default());
        assert_eq!(extract_text(root), "a b c d");
    }
}
