/*!
 * Tests for the original text registry
 */

use latinify::document::{DocumentTree, Page, PageNode};
use latinify::translation::registry::{OriginalTextRegistry, RestoreReport};

fn two_paragraphs() -> Page {
    Page::new(PageNode::element(
        "body",
        vec![
            PageNode::element("p", vec![PageNode::text("First paragraph")]),
            PageNode::element("p", vec![PageNode::text("Second paragraph")]),
        ],
    ))
}

#[test]
fn test_record_withSameNodeTwice_shouldKeepFirstOriginal() {
    let page = two_paragraphs();
    let node = page.find_text("First paragraph").unwrap();
    let mut registry = OriginalTextRegistry::new();

    assert!(registry.record(node, "First paragraph"));
    assert!(!registry.record(node, "Translated"));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.original(&node), Some("First paragraph"));
}

#[test]
fn test_restore_shouldWriteOriginalsBackAndClear() {
    let mut page = two_paragraphs();
    let first = page.find_text("First paragraph").unwrap();
    let second = page.find_text("Second paragraph").unwrap();
    let mut registry = OriginalTextRegistry::new();
    for node in [first, second] {
        let original = page.text(node).unwrap().to_string();
        registry.record(node, original);
        page.set_text(node, "changed").unwrap();
    }

    let report = registry.restore(&mut page);

    assert_eq!(report, RestoreReport { restored: 2, skipped: 0 });
    assert_eq!(page.text(first), Some("First paragraph"));
    assert_eq!(page.text(second), Some("Second paragraph"));
    assert!(!registry.is_active());
}

#[test]
fn test_restore_twice_shouldBeNoOp() {
    let mut page = two_paragraphs();
    let node = page.find_text("First paragraph").unwrap();
    let mut registry = OriginalTextRegistry::new();
    registry.record(node, "First paragraph");
    page.set_text(node, "changed").unwrap();

    registry.restore(&mut page);
    page.set_text(node, "edited by page script").unwrap();
    let second = registry.restore(&mut page);

    assert_eq!(second, RestoreReport::default());
    assert_eq!(page.text(node), Some("edited by page script"));
}

#[test]
fn test_restore_withDetachedFragment_shouldSkipItOnly() {
    let mut page = two_paragraphs();
    let first = page.find_text("First paragraph").unwrap();
    let second = page.find_text("Second paragraph").unwrap();
    let mut registry = OriginalTextRegistry::new();
    registry.record(first, "First paragraph");
    registry.record(second, "Second paragraph");
    page.set_text(second, "changed").unwrap();
    page.detach(page.parent(first).unwrap()).unwrap();

    let report = registry.restore(&mut page);

    assert_eq!(report, RestoreReport { restored: 1, skipped: 1 });
    assert_eq!(page.text(second), Some("Second paragraph"));
    assert!(registry.is_empty());
}
