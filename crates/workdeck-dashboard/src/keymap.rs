use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Typed dashboard commands. Keyboard input resolves to these; nothing in
/// the layer dispatches on raw key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    FocusNext,
    FocusPrevious,
    ExpandSelected,
    CollapseSelected,
    CloseSelected,
    OpenSelectedUrl,
    OpenPalette,
    BeginSearch,
    ClearSearch,
}

/// Fixed dashboard keymap. Unknown keys resolve to nothing and are left
/// for the embedding shell to handle.
pub fn command_for_key(event: KeyEvent) -> Option<DashboardCommand> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('k') => Some(DashboardCommand::OpenPalette),
            KeyCode::Char('w') => Some(DashboardCommand::CloseSelected),
            _ => None,
        };
    }

    match event.code {
        KeyCode::Down | KeyCode::Char('j') => Some(DashboardCommand::FocusNext),
        KeyCode::Up | KeyCode::Char('k') => Some(DashboardCommand::FocusPrevious),
        KeyCode::Right | KeyCode::Char('l') => Some(DashboardCommand::ExpandSelected),
        KeyCode::Left | KeyCode::Char('h') => Some(DashboardCommand::CollapseSelected),
        KeyCode::Char('x') => Some(DashboardCommand::CloseSelected),
        KeyCode::Enter | KeyCode::Char('o') => Some(DashboardCommand::OpenSelectedUrl),
        KeyCode::Char('/') => Some(DashboardCommand::BeginSearch),
        KeyCode::Esc => Some(DashboardCommand::ClearSearch),
        _ => None,
    }
}
