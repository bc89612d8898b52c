use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::debug;
use workdeck_bridge::{command_ids, ShellInvoker};
use workdeck_core::{filter_by_query, merge_direct_lookup};
use workdeck_query::{
    command_fetcher, QueryClient, QueryKey, QueryOptions, TypedSnapshot,
};

use crate::issue::{Issue, IssuePage};

pub const DEFAULT_ISSUE_STALE_TIME: Duration = Duration::from_secs(30);

pub mod keys {
    pub const PREFIX: &str = "github";
    pub const ISSUES: &str = "github.issues";
    pub const ISSUE: &str = "github.issue";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GithubClientConfig {
    pub issue_stale_time: Duration,
    pub gc_time: Duration,
    pub list_retry: u32,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            issue_stale_time: DEFAULT_ISSUE_STALE_TIME,
            gc_time: workdeck_query::DEFAULT_GC_TIME,
            list_retry: workdeck_query::DEFAULT_RETRY,
        }
    }
}

#[derive(Clone)]
pub struct GithubClient {
    invoker: Arc<dyn ShellInvoker>,
    queries: QueryClient,
    config: GithubClientConfig,
}

impl GithubClient {
    pub fn new(
        invoker: Arc<dyn ShellInvoker>,
        queries: QueryClient,
        config: GithubClientConfig,
    ) -> Self {
        Self {
            invoker,
            queries,
            config,
        }
    }

    /// One page of issues for a linked repository (`owner/name`). Idle
    /// when no repository is linked yet.
    pub async fn issues(
        &self,
        repository: Option<&str>,
        include_closed: bool,
        page: u32,
    ) -> TypedSnapshot<IssuePage> {
        let repo = repository.unwrap_or_default().to_owned();
        self.queries
            .query(
                QueryKey::new(keys::ISSUES)
                    .param(repo.clone())
                    .param(include_closed)
                    .param(page),
                self.issue_options().enabled(repository.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::GITHUB_LIST_ISSUES,
                    json!({
                        "repository": repo,
                        "includeClosed": include_closed,
                        "page": page,
                    }),
                ),
            )
            .await
            .typed(command_ids::GITHUB_LIST_ISSUES)
    }

    pub async fn issue(&self, repository: Option<&str>, number: u64) -> TypedSnapshot<Issue> {
        let repo = repository.unwrap_or_default().to_owned();
        self.queries
            .query(
                QueryKey::new(keys::ISSUE).param(repo.clone()).param(number as i64),
                self.issue_options().enabled(repository.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::GITHUB_GET_ISSUE,
                    json!({ "repository": repo, "number": number }),
                ),
            )
            .await
            .typed(command_ids::GITHUB_GET_ISSUE)
    }

    /// Filter a fetched page by the user's query; a query that is a bare
    /// issue number additionally tries a direct lookup, merged best-effort.
    pub async fn search_issues(
        &self,
        repository: &str,
        page: &IssuePage,
        query: &str,
    ) -> Vec<Issue> {
        let direct_hit = match query.trim().parse::<u64>() {
            Ok(number) => self.lookup_issue(repository, number).await,
            Err(_) => None,
        };
        let filtered = filter_by_query(&page.issues, query);
        merge_direct_lookup(filtered, direct_hit.as_ref())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Best-effort issue lookup by number; failures read as "not found".
    async fn lookup_issue(&self, repository: &str, number: u64) -> Option<Issue> {
        let result = self
            .invoker
            .invoke(
                command_ids::GITHUB_GET_ISSUE,
                json!({ "repository": repository, "number": number }),
            )
            .await;
        let payload = match result {
            Ok(payload) if !payload.is_null() => payload,
            Ok(_) => return None,
            Err(error) => {
                debug!(%error, "issue lookup failed; treating as not found");
                return None;
            }
        };
        serde_json::from_value(payload).ok()
    }

    fn issue_options(&self) -> QueryOptions {
        QueryOptions::default()
            .stale_time(self.config.issue_stale_time)
            .gc_time(self.config.gc_time)
            .retry(self.config.list_retry)
    }
}
