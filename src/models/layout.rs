use serde::{Deserialize, Serialize};

/// Page measurements taken by the content script before a layout update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutInput {
    pub sidebar_visible: bool,
    pub sidebar_width: f64,
    /// Number of elements matching the host's layout container selector.
    pub container_count: usize,
    pub body_width: f64,
    pub container_width: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutTarget {
    /// The host's layout containers.
    Containers,
    /// The document root element.
    Document,
}

/// `margin-left` to apply; `None` clears the inline style.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutPatch {
    pub target: LayoutTarget,
    pub margin_left: Option<f64>,
}
