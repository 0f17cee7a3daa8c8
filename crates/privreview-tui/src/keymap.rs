use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn is_next(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Char('n'))
}

pub(crate) fn is_back(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('b'))
}

pub(crate) fn is_dismiss_error(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Esc)
}

pub(crate) fn is_toggle_sync(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('s'))
}

pub(crate) fn is_cycle_cookies(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('c')) && !key.modifiers.contains(KeyModifiers::CONTROL)
}

pub(crate) fn is_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q'))
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}
