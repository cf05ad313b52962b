//! Key bindings (normal and vim-style) and mouse mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pick up the pool block at this index.
    Grab(usize),
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Drop,
    Cancel,
    Restart,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, enter) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char(c @ '1'..='9') => Action::Grab(c as usize - '1' as usize),
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Drop,
        _ => Action::None,
    }
}

/// Left-button pointer gesture at a terminal (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Press(u16, u16),
    Drag(u16, u16),
    Release(u16, u16),
    Hover(u16, u16),
}

/// Map a crossterm mouse event to a pointer gesture; other buttons and the wheel are ignored.
pub fn mouse_to_pointer(event: MouseEvent) -> Option<Pointer> {
    let (x, y) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Pointer::Press(x, y)),
        MouseEventKind::Drag(MouseButton::Left) => Some(Pointer::Drag(x, y)),
        MouseEventKind::Up(MouseButton::Left) => Some(Pointer::Release(x, y)),
        MouseEventKind::Moved => Some(Pointer::Hover(x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_digit_grabs_zero_based() {
        assert_eq!(key_to_action(key(KeyCode::Char('1'))), Action::Grab(0));
        assert_eq!(key_to_action(key(KeyCode::Char('3'))), Action::Grab(2));
        assert_eq!(key_to_action(key(KeyCode::Char('0'))), Action::None);
    }

    #[test]
    fn test_vim_and_arrows_agree() {
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), key_to_action(key(KeyCode::Left)));
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::MoveDown);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Drop);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Cancel);
    }

    #[test]
    fn test_ctrl_c_quits_other_modifiers_ignored() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_mouse_left_button_only() {
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Pointer::Press(7, 3))
        );
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Up(MouseButton::Left))),
            Some(Pointer::Release(7, 3))
        );
        assert_eq!(mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(mouse_to_pointer(mouse(MouseEventKind::ScrollDown)), None);
    }
}
