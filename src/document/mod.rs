/*!
 * Document tree access for page translation.
 *
 * The translation pipeline never depends on a concrete tree. It reads and
 * writes text fragments through the `DocumentTree` accessor:
 * - traversal from a root in document order
 * - computed hiddenness and editability of elements
 * - reading and writing the text of a fragment
 *
 * `Page` is the in-memory implementation used by the CLI and the tests.
 */

use std::fmt::Debug;
use std::hash::Hash;

use crate::errors::DocumentError;

pub mod page;

pub use page::{NodeId, Page, PageNode, Style};

/// What a node in the tree is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// An element with its tag name as written in the document
    Element { tag: &'a str },
    /// One addressable unit of displayed text
    Text,
}

/// Accessor over a document tree
pub trait DocumentTree {
    /// Opaque handle of a node; doubles as the identity of a text fragment
    type NodeId: Copy + Eq + Hash + Debug;

    /// The node traversal starts from
    fn root(&self) -> Self::NodeId;

    /// Kind of a node
    fn kind(&self, node: Self::NodeId) -> NodeKind<'_>;

    /// Children of a node in document order
    fn children(&self, node: Self::NodeId) -> &[Self::NodeId];

    /// Whether an element is computed-hidden (`display:none` or `visibility:hidden`)
    fn is_hidden(&self, element: Self::NodeId) -> bool;

    /// Whether an element's content is user-editable
    fn is_editable(&self, element: Self::NodeId) -> bool;

    /// Current text of a fragment, `None` for elements
    fn text(&self, node: Self::NodeId) -> Option<&str>;

    /// Replace the text of a fragment
    fn set_text(&mut self, node: Self::NodeId, text: &str) -> Result<(), DocumentError>;
}
