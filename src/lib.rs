//! Layered drawing canvas editor core.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! in-memory drawing model (elements and layers), the pointer/keyboard
//! interaction state machine, the resize engine, and the undo/redo history.
//! The host JavaScript layer wires DOM events to the engine, persists the
//! snapshots it exposes, and reacts to the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`document`] | Layers + elements, snapshots and load-time repair |
//! | [`element`] | Drawable elements and the element store |
//! | [`layer`] | Layers, raster paint records and the ordered layer stack |
//! | [`history`] | Reversible actions and the bounded undo/redo stacks |
//! | [`resize`] | Handle-driven resize with minimum-size anchoring |
//! | [`camera`] | Pan/zoom camera and world-space geometry |
//! | [`coords`] | Client → canvas-space conversion |
//! | [`input`] | Modes, keys, modifiers and the gesture state machine |
//! | [`keymap`] | Typed keyboard shortcut table |
//! | [`hit`] | Hit-testing against handles and elements |
//! | [`render`] | Scene rendering to a 2D context |
//! | [`compositor`] | Flattened export snapshot and compositor seam |
//! | [`store`] | Persistence seam with an explicit open/close lifecycle |
//! | [`config`] | Editor tunables |
//! | [`error`] | Invariant-violation errors |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod compositor;
pub mod config;
pub mod consts;
pub mod coords;
pub mod document;
pub mod element;
pub mod engine;
pub mod error;
pub mod hit;
pub mod history;
pub mod input;
pub mod keymap;
pub mod layer;
pub mod render;
pub mod resize;
pub mod store;
