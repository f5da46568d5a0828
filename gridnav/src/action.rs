use crate::event::{Key, KeyInput};

/// Host platform, used only to resolve modifier aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

/// A navigation intent derived from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavAction {
    Up,
    Down,
    Left,
    Right,
    Tab,
    ShiftTab,
    Home,
    End,
    CtrlHome,
    CtrlEnd,
    PageUp,
    PageDown,
    Enter,
    ShiftEnter,
    /// Alt+J: focus the grid root without selecting a cell.
    FocusGrid,
    /// Alt+W: focus the first visible content cell.
    FocusContent,
}

impl NavAction {
    /// Map a key press to a navigation action.
    ///
    /// Returns `None` for keys the focus strategy does not react to. On macOS,
    /// Meta+Home/End alias Ctrl+Home/End while Meta+Arrow stays unmapped.
    pub fn from_key(input: KeyInput, platform: Platform) -> Option<NavAction> {
        let m = input.modifiers;

        if m.alt && !m.ctrl && !m.meta {
            return match input.key {
                Key::Char('j') | Key::Char('J') => Some(NavAction::FocusGrid),
                Key::Char('w') | Key::Char('W') => Some(NavAction::FocusContent),
                _ => None,
            };
        }

        match input.key {
            Key::Tab if !m.ctrl && !m.alt && !m.meta => Some(if m.shift {
                NavAction::ShiftTab
            } else {
                NavAction::Tab
            }),
            Key::BackTab if !m.ctrl && !m.alt && !m.meta => Some(NavAction::ShiftTab),
            Key::Enter if !m.ctrl && !m.alt && !m.meta => Some(if m.shift {
                NavAction::ShiftEnter
            } else {
                NavAction::Enter
            }),
            Key::Up | Key::Down | Key::Left | Key::Right if m.none() => match input.key {
                Key::Up => Some(NavAction::Up),
                Key::Down => Some(NavAction::Down),
                Key::Left => Some(NavAction::Left),
                _ => Some(NavAction::Right),
            },
            Key::Home | Key::End => {
                let home = input.key == Key::Home;
                let matrix_wide = (m.ctrl && !m.meta)
                    || (platform == Platform::Mac && m.meta && !m.ctrl);
                if m.alt || m.shift {
                    None
                } else if matrix_wide {
                    Some(if home { NavAction::CtrlHome } else { NavAction::CtrlEnd })
                } else if m.none() {
                    Some(if home { NavAction::Home } else { NavAction::End })
                } else {
                    None
                }
            }
            Key::PageUp if m.none() => Some(NavAction::PageUp),
            Key::PageDown if m.none() => Some(NavAction::PageDown),
            _ => None,
        }
    }

    /// Actions that move within or between regions (as opposed to focusing the grid).
    pub fn is_movement(&self) -> bool {
        !matches!(self, NavAction::FocusGrid | NavAction::FocusContent)
    }
}
