use serde::{Deserialize, Serialize};

use workdeck_core::SearchRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// A GitHub issue of a linked repository, as the backend forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub url: String,
    pub date_created: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl SearchRecord for Issue {
    fn primary_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub last_page: bool,
}
