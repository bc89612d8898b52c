use std::collections::BTreeMap;

use workdeck_dashboard::DashboardCommand;

use crate::error::AppError;

/// Stable palette command identifiers. Public vocabulary shared with the
/// shell's palette UI; never renamed silently.
pub mod palette_ids {
    pub const DASHBOARD_FOCUS_NEXT: &str = "dashboard.focus_next";
    pub const DASHBOARD_FOCUS_PREVIOUS: &str = "dashboard.focus_previous";
    pub const DASHBOARD_CLOSE_SELECTED: &str = "dashboard.close_selected";
    pub const DASHBOARD_OPEN_SELECTED_URL: &str = "dashboard.open_selected_url";
    pub const SEARCH_FOCUS: &str = "search.focus";
    pub const CLICKUP_CONNECT: &str = "clickup.connect";
    pub const CLICKUP_REFRESH: &str = "clickup.refresh";
    pub const CLICKUP_LOGOUT: &str = "clickup.logout";
    pub const GITHUB_REFRESH: &str = "github.refresh";
}

/// What a palette entry does when picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteAction {
    Dashboard(DashboardCommand),
    ClickUpConnect,
    ClickUpRefresh,
    ClickUpLogout,
    GithubRefresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMetadata {
    pub id: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct CommandDefinition {
    metadata: CommandMetadata,
    action: PaletteAction,
}

/// Declarative palette entries, keyed by stable id.
#[derive(Debug)]
pub struct CommandRegistry {
    definitions: BTreeMap<&'static str, CommandDefinition>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new().expect("canonical palette registry should not contain duplicates")
    }
}

impl CommandRegistry {
    pub fn new() -> Result<Self, AppError> {
        Self::from_definitions(canonical_definitions())
    }

    fn from_definitions(definitions: Vec<CommandDefinition>) -> Result<Self, AppError> {
        let mut mapped = BTreeMap::new();
        for definition in definitions {
            let id = definition.metadata.id;
            if mapped.insert(id, definition).is_some() {
                return Err(AppError::DuplicateCommandId {
                    command_id: id.to_owned(),
                });
            }
        }
        Ok(Self {
            definitions: mapped,
        })
    }

    pub fn lookup(&self, command_id: &str) -> Result<&CommandMetadata, AppError> {
        self.definitions
            .get(command_id)
            .map(|definition| &definition.metadata)
            .ok_or_else(|| AppError::UnknownCommand {
                command_id: command_id.to_owned(),
            })
    }

    pub fn action(&self, command_id: &str) -> Result<PaletteAction, AppError> {
        self.definitions
            .get(command_id)
            .map(|definition| definition.action)
            .ok_or_else(|| AppError::UnknownCommand {
                command_id: command_id.to_owned(),
            })
    }

    /// Every entry in stable id order, for rendering the palette list.
    pub fn list(&self) -> Vec<&CommandMetadata> {
        self.definitions
            .values()
            .map(|definition| &definition.metadata)
            .collect()
    }
}

fn canonical_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::DASHBOARD_FOCUS_NEXT,
                description: "Focus the next session card",
            },
            action: PaletteAction::Dashboard(DashboardCommand::FocusNext),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::DASHBOARD_FOCUS_PREVIOUS,
                description: "Focus the previous session card",
            },
            action: PaletteAction::Dashboard(DashboardCommand::FocusPrevious),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::DASHBOARD_CLOSE_SELECTED,
                description: "Close the selected session",
            },
            action: PaletteAction::Dashboard(DashboardCommand::CloseSelected),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::DASHBOARD_OPEN_SELECTED_URL,
                description: "Open the selected task in the browser",
            },
            action: PaletteAction::Dashboard(DashboardCommand::OpenSelectedUrl),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::SEARCH_FOCUS,
                description: "Jump to the task search input",
            },
            action: PaletteAction::Dashboard(DashboardCommand::BeginSearch),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::CLICKUP_CONNECT,
                description: "Connect a ClickUp account",
            },
            action: PaletteAction::ClickUpConnect,
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::CLICKUP_REFRESH,
                description: "Refresh ClickUp tasks and hierarchy",
            },
            action: PaletteAction::ClickUpRefresh,
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::CLICKUP_LOGOUT,
                description: "Disconnect ClickUp and clear cached data",
            },
            action: PaletteAction::ClickUpLogout,
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: palette_ids::GITHUB_REFRESH,
                description: "Refresh linked GitHub issues",
            },
            action: PaletteAction::GithubRefresh,
        },
    ]
}
