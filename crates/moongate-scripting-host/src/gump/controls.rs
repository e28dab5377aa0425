//! Builders for the controls a script can place on a gump.
//!
//! Defaults mirror the stock client art and hues.

use moongate_events::{ControlKind, Graphic, Hue};

pub const DEFAULT_TEXT_HUE: Hue = 996;

pub fn label(text: impl Into<String>) -> ControlKind {
    label_hued(text, DEFAULT_TEXT_HUE)
}

pub fn label_hued(text: impl Into<String>, hue: Hue) -> ControlKind {
    ControlKind::Label {
        text: text.into(),
        hue,
    }
}

/// Art button using the standard up/down/over graphics
pub fn button(text: impl Into<String>) -> ControlKind {
    ControlKind::Button {
        text: text.into(),
        hue: DEFAULT_TEXT_HUE,
        normal: 0x00EF,
        pressed: 0x00F0,
        hover: 0x00EE,
    }
}

pub fn art_button(
    text: impl Into<String>,
    hue: Hue,
    normal: Graphic,
    pressed: Graphic,
    hover: Graphic,
) -> ControlKind {
    ControlKind::Button {
        text: text.into(),
        hue,
        normal,
        pressed,
        hover,
    }
}

pub fn simple_button(text: impl Into<String>) -> ControlKind {
    ControlKind::SimpleButton { text: text.into() }
}

pub fn checkbox(text: impl Into<String>, checked: bool) -> ControlKind {
    ControlKind::Checkbox {
        text: text.into(),
        hue: 0,
        checked,
    }
}

pub fn radio_button(text: impl Into<String>, group: i32, checked: bool) -> ControlKind {
    ControlKind::RadioButton {
        text: text.into(),
        group,
        hue: 0xFFFF,
        checked,
    }
}

/// Translucent background; `color` is an HTML hex string such as `#000000`
pub fn color_box(opacity: f32, color: impl Into<String>) -> ControlKind {
    ControlKind::ColorBox {
        opacity: opacity.clamp(0.0, 1.0),
        color: color.into(),
    }
}

pub fn item_pic(graphic: Graphic) -> ControlKind {
    ControlKind::ItemPic { graphic }
}

pub fn pic(graphic: Graphic, hue: Hue) -> ControlKind {
    ControlKind::Pic { graphic, hue }
}

pub fn text_box(text: impl Into<String>, multiline: bool) -> ControlKind {
    ControlKind::TextBox {
        text: text.into(),
        multiline,
    }
}

pub fn scroll_area() -> ControlKind {
    ControlKind::ScrollArea
}
