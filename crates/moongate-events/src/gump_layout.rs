//! Description of a script-built gump, handed to the host for rendering.

use serde::{Deserialize, Serialize};

use crate::types::{ControlId, Graphic, Hue};

/// Window-level options chosen when a script creates a gump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GumpConfig {
    #[serde(default = "default_true")]
    pub accept_mouse_input: bool,
    #[serde(default = "default_true")]
    pub can_move: bool,
    /// Survives the owning script stopping and `close_gumps`
    #[serde(default)]
    pub keep_open: bool,
    #[serde(default)]
    pub rect: Rect,
}

fn default_true() -> bool {
    true
}

impl Default for GumpConfig {
    fn default() -> Self {
        Self {
            accept_mouse_input: true,
            can_move: true,
            keep_open: false,
            rect: Rect::default(),
        }
    }
}

impl GumpConfig {
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }

    pub fn with_rect(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        self.rect = Rect {
            x,
            y,
            width,
            height,
        };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// The kinds of control a script can place on a gump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Label {
        text: String,
        hue: Hue,
    },
    Button {
        text: String,
        hue: Hue,
        normal: Graphic,
        pressed: Graphic,
        hover: Graphic,
    },
    SimpleButton {
        text: String,
    },
    Checkbox {
        text: String,
        hue: Hue,
        checked: bool,
    },
    RadioButton {
        text: String,
        group: i32,
        hue: Hue,
        checked: bool,
    },
    ColorBox {
        opacity: f32,
        color: String,
    },
    ItemPic {
        graphic: Graphic,
    },
    Pic {
        graphic: Graphic,
        hue: Hue,
    },
    TextBox {
        text: String,
        multiline: bool,
    },
    ScrollArea,
}

impl ControlKind {
    /// Visible text carried by the control, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            ControlKind::Label { text, .. }
            | ControlKind::Button { text, .. }
            | ControlKind::SimpleButton { text }
            | ControlKind::Checkbox { text, .. }
            | ControlKind::RadioButton { text, .. }
            | ControlKind::TextBox { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Whether controls may be nested inside this one
    pub fn is_container(&self) -> bool {
        matches!(self, ControlKind::ScrollArea)
    }
}

/// One node of a gump's control tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlNode {
    pub id: ControlId,
    pub kind: ControlKind,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub children: Vec<ControlNode>,
}

impl ControlNode {
    pub fn find(&self, id: ControlId) -> Option<&ControlNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Depth-first walk over this node and all of its descendants
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a ControlNode>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// Full snapshot of a gump sent to the host when it becomes visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GumpLayout {
    pub config: GumpConfig,
    pub controls: Vec<ControlNode>,
}
