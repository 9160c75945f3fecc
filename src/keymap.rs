//! Keyboard shortcut table.
//!
//! A flat list of `(KeyCombo, Command)` pairs. Combos are matched by
//! structural equality on the key and the exact modifier set, and the first
//! matching entry wins. Binding a combo that is already taken is refused, so
//! two entries can never compete for the same keystroke.

#[cfg(test)]
#[path = "keymap_test.rs"]
mod keymap_test;

use tracing::warn;

use crate::input::{Key, KeyCombo, Mode, Modifiers};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    Undo,
    Redo,
    /// Delete the focused elements.
    Delete,
    Copy,
    Paste,
    SelectAll,
    ZoomIn,
    ZoomOut,
    /// Abort the active gesture, or clear focus when idle.
    Cancel,
    /// Ask the host to open the text editor for the focused text element.
    EditText,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<(KeyCombo, Command)>,
}

impl Keymap {
    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default shortcut table.
    #[must_use]
    pub fn standard() -> Self {
        let mut map = Self::empty();
        for (c, mode) in [
            ('v', Mode::Select),
            ('b', Mode::Draw),
            ('e', Mode::Erase),
            ('s', Mode::Shapes),
            ('t', Mode::Text),
            ('h', Mode::Move),
        ] {
            map.bind(KeyCombo::plain(c), Command::SetMode(mode));
        }
        for command_mod in [Modifiers::CTRL, Modifiers::META] {
            let shifted = Modifiers { shift: true, ..command_mod };
            map.bind(KeyCombo::new(Key::Char('z'), command_mod), Command::Undo);
            map.bind(KeyCombo::new(Key::Char('z'), shifted), Command::Redo);
            map.bind(KeyCombo::new(Key::Char('y'), command_mod), Command::Redo);
            map.bind(KeyCombo::new(Key::Char('c'), command_mod), Command::Copy);
            map.bind(KeyCombo::new(Key::Char('v'), command_mod), Command::Paste);
            map.bind(KeyCombo::new(Key::Char('a'), command_mod), Command::SelectAll);
            map.bind(KeyCombo::new(Key::Char('='), command_mod), Command::ZoomIn);
            map.bind(KeyCombo::new(Key::Char('-'), command_mod), Command::ZoomOut);
        }
        map.bind(KeyCombo::new(Key::Delete, Modifiers::NONE), Command::Delete);
        map.bind(KeyCombo::new(Key::Backspace, Modifiers::NONE), Command::Delete);
        map.bind(KeyCombo::new(Key::Escape, Modifiers::NONE), Command::Cancel);
        map.bind(KeyCombo::new(Key::Enter, Modifiers::NONE), Command::EditText);
        map
    }

    /// Add a binding. Returns false (and keeps the existing binding) when the
    /// combo is already bound.
    pub fn bind(&mut self, combo: KeyCombo, command: Command) -> bool {
        if let Some((_, existing)) = self.bindings.iter().find(|(c, _)| *c == combo) {
            warn!(?combo, ?existing, ?command, "shortcut already bound");
            return false;
        }
        self.bindings.push((combo, command));
        true
    }

    /// Remove the binding for `combo`, returning its command.
    pub fn unbind(&mut self, combo: &KeyCombo) -> Option<Command> {
        let index = self.bindings.iter().position(|(c, _)| c == combo)?;
        Some(self.bindings.remove(index).1)
    }

    /// The command bound to `combo`, if any.
    #[must_use]
    pub fn lookup(&self, combo: &KeyCombo) -> Option<Command> {
        self.bindings.iter().find(|(c, _)| c == combo).map(|(_, cmd)| *cmd)
    }

    /// Every combo bound to `command`.
    pub fn combos_for(&self, command: Command) -> impl Iterator<Item = &KeyCombo> {
        self.bindings.iter().filter(move |(_, cmd)| *cmd == command).map(|(c, _)| c)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
