/*!
 * Discovery of translatable text fragments.
 *
 * `TextFragments` walks a document tree lazily in document order and yields
 * every text node worth translating. Subtrees rooted at a skipped, hidden or
 * editable element are never entered. `TextExtractor` then applies the page
 * character budget and drops fragments translated earlier in the session.
 */

use log::warn;

use crate::document::{DocumentTree, NodeKind};

use super::batch::unique_texts;
use super::registry::OriginalTextRegistry;

/// Elements whose content is never scanned (matched case-insensitively)
pub const SKIP_TAGS: [&str; 18] = [
    "SCRIPT", "STYLE", "NOSCRIPT", "IFRAME", "OBJECT", "EMBED", "CODE", "PRE", "KBD", "SAMP",
    "VAR", "INPUT", "TEXTAREA", "SELECT", "OPTION", "SVG", "MATH", "CANVAS",
];

/// Shortest trimmed text worth translating, in characters
pub const MIN_FRAGMENT_CHARS: usize = 2;

/// Whether an element tag belongs to the skip set
pub fn is_skipped_tag(tag: &str) -> bool {
    SKIP_TAGS.iter().any(|skipped| skipped.eq_ignore_ascii_case(tag))
}

/// Default visibility predicate: shown and not editable
pub fn is_translatable_element<D: DocumentTree>(doc: &D, element: D::NodeId) -> bool {
    !doc.is_hidden(element) && !doc.is_editable(element)
}

/// One eligible fragment and its trimmed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment<N> {
    pub node: N,
    pub text: String,
}

/// Lazy depth-first traversal yielding eligible fragments.
///
/// The traversal cannot be rewound; build a new one for every pass.
pub struct TextFragments<'a, D: DocumentTree, S, V> {
    doc: &'a D,
    stack: Vec<D::NodeId>,
    skip: S,
    visible: V,
}

impl<'a, D, S, V> TextFragments<'a, D, S, V>
where
    D: DocumentTree,
    S: Fn(&str) -> bool,
    V: Fn(&D, D::NodeId) -> bool,
{
    /// Walk `doc` from its root with custom skip and visibility predicates
    pub fn new(doc: &'a D, skip: S, visible: V) -> Self {
        Self {
            doc,
            stack: vec![doc.root()],
            skip,
            visible,
        }
    }
}

impl<D, S, V> Iterator for TextFragments<'_, D, S, V>
where
    D: DocumentTree,
    S: Fn(&str) -> bool,
    V: Fn(&D, D::NodeId) -> bool,
{
    type Item = TextFragment<D::NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.doc;
        while let Some(node) = self.stack.pop() {
            match doc.kind(node) {
                NodeKind::Element { tag } => {
                    if (self.skip)(tag) || !(self.visible)(doc, node) {
                        continue;
                    }
                    self.stack.extend(doc.children(node).iter().rev().copied());
                }
                NodeKind::Text => {
                    let Some(raw) = doc.text(node) else {
                        continue;
                    };
                    let trimmed = raw.trim();
                    if trimmed.chars().count() >= MIN_FRAGMENT_CHARS {
                        return Some(TextFragment {
                            node,
                            text: trimmed.to_string(),
                        });
                    }
                }
            }
        }
        None
    }
}

/// Fragments of `doc` under the default skip set and visibility rules
pub fn text_fragments<D: DocumentTree>(
    doc: &D,
) -> TextFragments<'_, D, fn(&str) -> bool, fn(&D, D::NodeId) -> bool> {
    TextFragments::new(
        doc,
        is_skipped_tag as fn(&str) -> bool,
        is_translatable_element::<D> as fn(&D, D::NodeId) -> bool,
    )
}

/// Result of one extraction
#[derive(Debug, Clone)]
pub struct Extraction<N> {
    /// Fragments to translate, in document order
    pub fragments: Vec<TextFragment<N>>,
    /// Sum of the fragments' trimmed lengths
    pub total_chars: usize,
    /// Whether the character budget cut the page short
    pub truncated: bool,
}

impl<N> Extraction<N> {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Distinct fragment texts in first-encounter order
    pub fn unique_texts(&self) -> Vec<String> {
        unique_texts(self.fragments.iter().map(|f| f.text.as_str()))
    }
}

/// Applies the per-page character budget to a fragment stream
#[derive(Debug, Clone, Copy)]
pub struct TextExtractor {
    max_chars: usize,
}

impl TextExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Extract the fragments of `doc` not yet recorded in `registry`
    pub fn extract<D: DocumentTree>(
        &self,
        doc: &D,
        registry: &OriginalTextRegistry<D::NodeId>,
    ) -> Extraction<D::NodeId> {
        self.collect(text_fragments(doc), |node| registry.contains(node))
    }

    /// Keep the document-order prefix of `fragments` that fits the budget.
    ///
    /// Excluded fragments do not count against the budget. The first fragment
    /// that would overflow it ends extraction.
    pub fn collect<N, I, F>(&self, fragments: I, exclude: F) -> Extraction<N>
    where
        I: IntoIterator<Item = TextFragment<N>>,
        F: Fn(&N) -> bool,
    {
        let mut extraction = Extraction {
            fragments: Vec::new(),
            total_chars: 0,
            truncated: false,
        };

        for fragment in fragments {
            if exclude(&fragment.node) {
                continue;
            }
            let length = fragment.text.chars().count();
            if extraction.total_chars + length > self.max_chars {
                warn!(
                    "Character limit of {} reached, some text will not be translated",
                    self.max_chars
                );
                extraction.truncated = true;
                break;
            }
            extraction.total_chars += length;
            extraction.fragments.push(fragment);
        }

        extraction
    }
}
