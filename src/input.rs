//! Input model: modes, modifier keys, buttons, keys, and the gesture state
//! machine.
//!
//! `Mode` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up, carrying the context needed to compute incremental deltas and
//! emit the final history action on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::DEFAULT_COLOR;
use crate::element::{Element, ElementId, ElementKind};
use crate::layer::{LayerId, PaintMode};
use crate::resize::ResizeHandle;

/// The persistent editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Select, move and resize elements (default).
    #[default]
    Select,
    /// Freehand painting into the active layer.
    Draw,
    /// Clear paint from the active layer.
    Erase,
    /// Drag to create the current [`ShapeKind`].
    Shapes,
    /// Click to place a text element.
    Text,
    /// Drag to pan the viewport.
    Move,
    ZoomIn,
    ZoomOut,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Draw => "draw",
            Self::Erase => "erase",
            Self::Shapes => "shapes",
            Self::Text => "text",
            Self::Move => "move",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
        }
    }

    /// Default CSS cursor while this mode is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Draw | Self::Erase | Self::Shapes => "crosshair",
            Self::Text => "text",
            Self::Move => "grab",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
        }
    }

    /// Whether pointer-down in this mode can grab elements and handles.
    #[must_use]
    pub fn manipulates_elements(self) -> bool {
        matches!(self, Self::Select | Self::Shapes)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "draw" => Ok(Self::Draw),
            "erase" => Ok(Self::Erase),
            "shapes" => Ok(Self::Shapes),
            "text" => Ok(Self::Text),
            "move" => Ok(Self::Move),
            "zoom_in" => Ok(Self::ZoomIn),
            "zoom_out" => Ok(Self::ZoomOut),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// The shape created by drag in [`Mode::Shapes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
}

impl ShapeKind {
    #[must_use]
    pub fn element_kind(self) -> ElementKind {
        match self {
            Self::Rectangle => ElementKind::Rectangle,
            Self::Circle => ElementKind::Circle,
            Self::Triangle => ElementKind::Triangle,
        }
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false, meta: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false, meta: false };
    pub const META: Self = Self { shift: false, ctrl: false, alt: false, meta: true };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false, meta: false };
    pub const CTRL_SHIFT: Self = Self { shift: true, ctrl: true, alt: false, meta: false };
    pub const META_SHIFT: Self = Self { shift: true, ctrl: false, alt: false, meta: true };

    /// Ctrl or Meta, the platform "command" modifier.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button that triggered a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }

    /// The bit this button sets in [`Buttons`].
    #[must_use]
    pub fn mask(self) -> Buttons {
        match self {
            Self::Primary => Buttons::PRIMARY,
            Self::Secondary => Buttons::SECONDARY,
            Self::Middle => Buttons::MIDDLE,
        }
    }
}

/// Bit set of buttons held during a move, as in DOM `PointerEvent.buttons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const SECONDARY: Self = Self(2);
    pub const MIDDLE: Self = Self(4);

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

/// A keyboard key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, lowercased.
    Char(char),
    Delete,
    Backspace,
    Escape,
    Enter,
    Shift,
    Control,
    Alt,
    Meta,
    /// Any other named key as reported by the browser.
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_browser(key: &str) -> Self {
        match key {
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Shift" => Self::Shift,
            "Control" => Self::Control,
            "Alt" => Self::Alt,
            "Meta" => Self::Meta,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c.to_ascii_lowercase()),
                    _ => Self::Other(key.to_string()),
                }
            }
        }
    }
}

/// A key plus the exact modifier set, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    #[must_use]
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// An unmodified character key.
    #[must_use]
    pub fn plain(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive = scroll down.
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub mode: Mode,
    /// Shape created in [`Mode::Shapes`].
    pub shape: ShapeKind,
    /// Fill for newly created shapes and the brush color.
    pub fill: String,
    pub stroke: String,
    /// CSS cursor last requested from the host.
    pub cursor: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Select,
            shape: ShapeKind::Rectangle,
            fill: DEFAULT_COLOR.to_string(),
            stroke: DEFAULT_COLOR.to_string(),
            cursor: Mode::Select.cursor().to_string(),
        }
    }
}

/// Internal state for the input state machine.
///
/// At most one gesture is active at a time. Every variant except `Idle` is
/// ended by pointer-up (commit) or `Escape` (abort).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Canvas-space position of the previous event.
        last_screen: Point,
        /// Button that started the pan; releasing it ends the gesture.
        button: Button,
    },
    /// Painting a draw or erase stroke into a layer raster.
    Painting {
        mode: PaintMode,
        layer_id: LayerId,
        /// World-space samples collected so far.
        path: Vec<Point>,
    },
    /// Moving the focused elements.
    DraggingElements {
        ids: Vec<ElementId>,
        /// Canvas-space position of the previous event.
        last_screen: Point,
        /// World-space translation applied since the drag started.
        total_dx: f64,
        total_dy: f64,
    },
    /// Sizing a provisional shape from its anchor corner.
    CreatingShape { id: ElementId, anchor_world: Point },
    /// Dragging a resize handle; every focused element resizes together.
    Resizing {
        handle: ResizeHandle,
        /// World-space pointer position at drag start.
        start_world: Point,
        /// Element records captured at drag start.
        originals: Vec<Element>,
    },
    /// Rubber-band selection.
    Marquee { anchor_world: Point, current_world: Point },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Buttons that must stay held for the gesture to continue.
    #[must_use]
    pub fn required_buttons(&self) -> Buttons {
        match self {
            Self::Idle => Buttons::NONE,
            Self::Panning { button, .. } => button.mask(),
            _ => Buttons::PRIMARY,
        }
    }
}
