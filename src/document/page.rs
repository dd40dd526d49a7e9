/*!
 * In-memory page model.
 *
 * A `Page` is an arena of element and text nodes built from a JSON-serializable
 * `PageNode` tree. It resolves the computed properties the extractor asks for:
 * - `display:none` on the element or any ancestor hides it
 * - the nearest explicit `visibility` wins
 * - the nearest explicit `contentEditable` wins
 */

use serde::{Deserialize, Serialize};

use super::{DocumentTree, NodeKind};
use crate::errors::DocumentError;

/// Handle of a node inside a `Page`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Inline style relevant to visibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl Style {
    fn is_empty(&self) -> bool {
        self.display.is_none() && self.visibility.is_none()
    }

    fn hides_subtree(&self) -> bool {
        self.display
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("none"))
    }

    fn visibility_hidden(&self) -> Option<bool> {
        self.visibility.as_deref().map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse")
        })
    }
}

/// Serializable tree form of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageNode {
    /// A text fragment
    Text { text: String },

    /// An element and its children
    Element {
        tag: String,

        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,

        #[serde(
            default,
            rename = "contentEditable",
            skip_serializing_if = "Option::is_none"
        )]
        content_editable: Option<bool>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<PageNode>,
    },
}

impl PageNode {
    /// A text fragment
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// An element with the given children
    pub fn element(tag: impl Into<String>, children: Vec<PageNode>) -> Self {
        Self::Element {
            tag: tag.into(),
            style: Style::default(),
            content_editable: None,
            children,
        }
    }

    /// Set the element's `display` style
    pub fn with_display(mut self, value: impl Into<String>) -> Self {
        if let Self::Element { style, .. } = &mut self {
            style.display = Some(value.into());
        }
        self
    }

    /// Set the element's `visibility` style
    pub fn with_visibility(mut self, value: impl Into<String>) -> Self {
        if let Self::Element { style, .. } = &mut self {
            style.visibility = Some(value.into());
        }
        self
    }

    /// Set the element's `contentEditable` attribute
    pub fn editable(mut self, value: bool) -> Self {
        if let Self::Element {
            content_editable, ..
        } = &mut self
        {
            *content_editable = Some(value);
        }
        self
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        style: Style,
        content_editable: Option<bool>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// Arena-backed document
#[derive(Debug, Clone)]
pub struct Page {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Page {
    /// Build a page from its tree form
    pub fn new(root: PageNode) -> Self {
        let mut page = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        page.root = page.insert(root, None);
        page
    }

    /// Parse a page from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let root: PageNode = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    /// Serialize the attached part of the page to pretty JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_node())
    }

    /// Tree form of the attached part of the page
    pub fn to_node(&self) -> PageNode {
        self.node_at(self.root)
    }

    /// Remove a node and its subtree from the page.
    ///
    /// Handles into the removed subtree stay valid but writes through them fail
    /// with `DocumentError::Detached`.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let parent = self.slot(node)?.parent;
        if let Some(parent) = parent {
            self.slots[parent.0].children.retain(|child| *child != node);
        }

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.0];
            slot.attached = false;
            stack.extend(slot.children.iter().copied());
        }
        Ok(())
    }

    /// Attached text nodes in document order
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let slot = &self.slots[node.0];
            if matches!(slot.data, NodeData::Text { .. }) {
                found.push(node);
            }
            stack.extend(slot.children.iter().rev().copied());
        }
        found
    }

    /// First attached text node whose trimmed text equals `needle`
    pub fn find_text(&self, needle: &str) -> Option<NodeId> {
        self.text_nodes()
            .into_iter()
            .find(|node| self.text(*node).is_some_and(|t| t.trim() == needle))
    }

    /// Parent of a node; `None` for the root and for unknown handles
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slots.get(node.0).and_then(|slot| slot.parent)
    }

    fn insert(&mut self, node: PageNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        match node {
            PageNode::Text { text } => {
                self.slots.push(Slot {
                    data: NodeData::Text { text },
                    parent,
                    children: Vec::new(),
                    attached: true,
                });
            }
            PageNode::Element {
                tag,
                style,
                content_editable,
                children,
            } => {
                self.slots.push(Slot {
                    data: NodeData::Element {
                        tag,
                        style,
                        content_editable,
                    },
                    parent,
                    children: Vec::with_capacity(children.len()),
                    attached: true,
                });
                for child in children {
                    let child_id = self.insert(child, Some(id));
                    self.slots[id.0].children.push(child_id);
                }
            }
        }
        id
    }

    fn node_at(&self, node: NodeId) -> PageNode {
        let slot = &self.slots[node.0];
        match &slot.data {
            NodeData::Text { text } => PageNode::Text { text: text.clone() },
            NodeData::Element {
                tag,
                style,
                content_editable,
            } => PageNode::Element {
                tag: tag.clone(),
                style: style.clone(),
                content_editable: *content_editable,
                children: slot.children.iter().map(|c| self.node_at(*c)).collect(),
            },
        }
    }

    fn slot(&self, node: NodeId) -> Result<&Slot, DocumentError> {
        self.slots.get(node.0).ok_or(DocumentError::UnknownNode)
    }

    /// Self and ancestors, innermost first
    fn lineage(&self, node: NodeId) -> impl Iterator<Item = &Slot> + '_ {
        std::iter::successors(self.slots.get(node.0), move |slot| {
            slot.parent.and_then(|p| self.slots.get(p.0))
        })
    }
}

impl DocumentTree for Page {
    type NodeId = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn kind(&self, node: NodeId) -> NodeKind<'_> {
        match &self.slots[node.0].data {
            NodeData::Element { tag, .. } => NodeKind::Element { tag: tag.as_str() },
            NodeData::Text { .. } => NodeKind::Text,
        }
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.slots[node.0].children
    }

    fn is_hidden(&self, element: NodeId) -> bool {
        let mut visibility = None;
        for slot in self.lineage(element) {
            if let NodeData::Element { style, .. } = &slot.data {
                if style.hides_subtree() {
                    return true;
                }
                if visibility.is_none() {
                    visibility = style.visibility_hidden();
                }
            }
        }
        visibility.unwrap_or(false)
    }

    fn is_editable(&self, element: NodeId) -> bool {
        self.lineage(element)
            .find_map(|slot| match &slot.data {
                NodeData::Element {
                    content_editable, ..
                } => *content_editable,
                NodeData::Text { .. } => None,
            })
            .unwrap_or(false)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.slots.get(node.0)?.data {
            NodeData::Text { text } => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    fn set_text(&mut self, node: NodeId, new_text: &str) -> Result<(), DocumentError> {
        let slot = self
            .slots
            .get_mut(node.0)
            .ok_or(DocumentError::UnknownNode)?;
        if !slot.attached {
            return Err(DocumentError::Detached);
        }
        match &mut slot.data {
            NodeData::Text { text } => {
                new_text.clone_into(text);
                Ok(())
            }
            NodeData::Element { .. } => Err(DocumentError::NotText),
        }
    }
}
