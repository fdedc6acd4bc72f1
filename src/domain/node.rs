//! Tree nodes: identity, type tags and typed payloads.
//!
//! A node serializes as
//!
//! ```json
//! {"uuid": "…", "elementName": "Column", "enabled": true,
//!  "data": {"widthSM": 6}, "settings": {…}, "children": […]}
//! ```
//!
//! Page nodes carry `elementName`, menu nodes carry `itemType`. The tag selects the
//! [`NodeData`] variant; unknown tags keep their data as a raw mapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::field::Field;
use crate::domain::grid::{Breakpoint, LayoutSettings, Width};

/// Stable node identifier, unique within one aggregate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for a newly created node.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of aggregate a tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Page,
    Menu,
}

impl Aggregate {
    pub fn family(&self) -> Family {
        match self {
            Aggregate::Page => Family::Element,
            Aggregate::Menu => Family::MenuItem,
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Page => f.write_str("page"),
            Aggregate::Menu => f.write_str("menu"),
        }
    }
}

/// Which tag key a node uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    /// Page layout element (`elementName`)
    Element,
    /// Menu navigation item (`itemType`)
    MenuItem,
}

/// Type tag of a node. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType {
    pub family: Family,
    pub name: String,
}

impl ElementType {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            family: Family::Element,
            name: name.into(),
        }
    }

    pub fn menu_item(name: impl Into<String>) -> Self {
        Self {
            family: Family::MenuItem,
            name: name.into(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub css_class: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub fluid: Field<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub css_class: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub no_gutters: Field<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Column payload. Width fields absent at a breakpoint inherit from the next smaller one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    #[serde(rename = "widthXS", default, skip_serializing_if = "Field::is_absent")]
    pub width_xs: Field<Width>,
    #[serde(rename = "widthSM", default, skip_serializing_if = "Field::is_absent")]
    pub width_sm: Field<Width>,
    #[serde(rename = "widthMD", default, skip_serializing_if = "Field::is_absent")]
    pub width_md: Field<Width>,
    #[serde(rename = "widthLG", default, skip_serializing_if = "Field::is_absent")]
    pub width_lg: Field<Width>,
    #[serde(rename = "widthXL", default, skip_serializing_if = "Field::is_absent")]
    pub width_xl: Field<Width>,
    #[serde(rename = "cssClass", default, skip_serializing_if = "Field::is_absent")]
    pub css_class: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnData {
    pub fn width(&self, breakpoint: Breakpoint) -> &Field<Width> {
        match breakpoint {
            Breakpoint::Xs => &self.width_xs,
            Breakpoint::Sm => &self.width_sm,
            Breakpoint::Md => &self.width_md,
            Breakpoint::Lg => &self.width_lg,
            Breakpoint::Xl => &self.width_xl,
        }
    }

    pub fn width_mut(&mut self, breakpoint: Breakpoint) -> &mut Field<Width> {
        match breakpoint {
            Breakpoint::Xs => &mut self.width_xs,
            Breakpoint::Sm => &mut self.width_sm,
            Breakpoint::Md => &mut self.width_md,
            Breakpoint::Lg => &mut self.width_lg,
            Breakpoint::Xl => &mut self.width_xl,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub content: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub src: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub alt: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub target: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinkData {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub page_uuid: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Type-specific node payload, keyed by the node's type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Section(SectionData),
    Row(RowData),
    Column(ColumnData),
    Text(TextData),
    Image(ImageData),
    Link(LinkData),
    PageLink(PageLinkData),
    /// Unknown tag: payload kept verbatim
    Raw {
        element_type: ElementType,
        fields: Map<String, Value>,
    },
}

impl NodeData {
    /// Build the payload for `element_type` from a raw mapping, validating known schemas.
    pub fn from_parts(element_type: &ElementType, fields: Map<String, Value>) -> DomainResult<Self> {
        fn typed<T: serde::de::DeserializeOwned>(
            element_type: &ElementType,
            fields: Map<String, Value>,
        ) -> DomainResult<T> {
            serde_json::from_value(Value::Object(fields)).map_err(|e| DomainError::InvalidData {
                element: element_type.name.clone(),
                message: e.to_string(),
            })
        }

        Ok(match (element_type.family, element_type.name.as_str()) {
            (Family::Element, "Section") => NodeData::Section(typed(element_type, fields)?),
            (Family::Element, "Row") => NodeData::Row(typed(element_type, fields)?),
            (Family::Element, "Column") => NodeData::Column(typed(element_type, fields)?),
            (Family::Element, "Text") => NodeData::Text(typed(element_type, fields)?),
            (Family::Element, "Image") => NodeData::Image(typed(element_type, fields)?),
            (Family::MenuItem, "Link") => NodeData::Link(typed(element_type, fields)?),
            (Family::MenuItem, "Page") => NodeData::PageLink(typed(element_type, fields)?),
            _ => NodeData::Raw {
                element_type: element_type.clone(),
                fields,
            },
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            NodeData::Section(_) => ElementType::element("Section"),
            NodeData::Row(_) => ElementType::element("Row"),
            NodeData::Column(_) => ElementType::element("Column"),
            NodeData::Text(_) => ElementType::element("Text"),
            NodeData::Image(_) => ElementType::element("Image"),
            NodeData::Link(_) => ElementType::menu_item("Link"),
            NodeData::PageLink(_) => ElementType::menu_item("Page"),
            NodeData::Raw { element_type, .. } => element_type.clone(),
        }
    }

    /// Payload as a JSON mapping, the shape persisted under `data`.
    pub fn to_map(&self) -> Map<String, Value> {
        let value = match self {
            NodeData::Section(d) => serde_json::to_value(d),
            NodeData::Row(d) => serde_json::to_value(d),
            NodeData::Column(d) => serde_json::to_value(d),
            NodeData::Text(d) => serde_json::to_value(d),
            NodeData::Image(d) => serde_json::to_value(d),
            NodeData::Link(d) => serde_json::to_value(d),
            NodeData::PageLink(d) => serde_json::to_value(d),
            NodeData::Raw { fields, .. } => return fields.clone(),
        };
        // Plain structs of strings, bools and maps always serialize to an object.
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn as_column(&self) -> Option<&ColumnData> {
        match self {
            NodeData::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_column_mut(&mut self) -> Option<&mut ColumnData> {
        match self {
            NodeData::Column(c) => Some(c),
            _ => None,
        }
    }
}

/// One element of a page layout or one menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    pub uuid: NodeId,
    pub data: NodeData,
    pub enabled: bool,
    pub settings: Field<LayoutSettings>,
    pub children: Vec<Node>,
}

impl Node {
    /// New enabled node without children or settings.
    pub fn new(uuid: NodeId, data: NodeData) -> Self {
        Self {
            uuid,
            data,
            enabled: true,
            settings: Field::Absent,
            children: Vec::new(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Copy of this node with its children stripped.
    pub fn detached(&self) -> Node {
        Node {
            uuid: self.uuid.clone(),
            data: self.data.clone(),
            enabled: self.enabled,
            settings: self.settings.clone(),
            children: Vec::new(),
        }
    }

    /// Ids of this node and all of its descendants, pre-order.
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.uuid.clone());
            // Push children in reverse order for left-to-right traversal
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        ids
    }
}

fn default_enabled() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Wire shape of [`Node`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    uuid: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_type: Option<String>,
    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    enabled: bool,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    settings: Field<LayoutSettings>,
    #[serde(default)]
    children: Vec<Node>,
}

impl TryFrom<RawNode> for Node {
    type Error = DomainError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let element_type = match (raw.element_name, raw.item_type) {
            (Some(name), None) => ElementType::element(name),
            (None, Some(name)) => ElementType::menu_item(name),
            (Some(_), Some(_)) => {
                return Err(DomainError::InvalidData {
                    element: raw.uuid.to_string(),
                    message: "node has both elementName and itemType".into(),
                })
            }
            (None, None) => {
                return Err(DomainError::InvalidData {
                    element: raw.uuid.to_string(),
                    message: "node has neither elementName nor itemType".into(),
                })
            }
        };
        if raw.uuid.as_str().is_empty() {
            return Err(DomainError::InvalidData {
                element: element_type.name,
                message: "empty uuid".into(),
            });
        }
        Ok(Node {
            data: NodeData::from_parts(&element_type, raw.data)?,
            uuid: raw.uuid,
            enabled: raw.enabled,
            settings: raw.settings,
            children: raw.children,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let element_type = node.element_type();
        let (element_name, item_type) = match element_type.family {
            Family::Element => (Some(element_type.name), None),
            Family::MenuItem => (None, Some(element_type.name)),
        };
        RawNode {
            data: node.data.to_map(),
            uuid: node.uuid,
            element_name,
            item_type,
            enabled: node.enabled,
            settings: node.settings,
            children: node.children,
        }
    }
}
