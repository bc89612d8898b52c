use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::info;
use integration_clickup::{ClickUpClient, ClickUpClientConfig};
use integration_github::{GithubClient, GithubClientConfig};
use workdeck_bridge::{NullInvoker, ShellEnvironment, ShellEvents, ShellInvoker};
use workdeck_config::WorkdeckConfig;
use workdeck_query::QueryClient;

use crate::commands::CommandRegistry;
use crate::error::AppError;
use crate::sessions::SessionDirectory;

/// Everything the shell needs to drive the client layer. Built once at
/// startup, cheap to clone pieces out of.
pub struct WorkdeckApp {
    environment: ShellEnvironment,
    invoker: Arc<dyn ShellInvoker>,
    events: Arc<ShellEvents>,
    queries: QueryClient,
    clickup: ClickUpClient,
    github: GithubClient,
    sessions: SessionDirectory,
    registry: CommandRegistry,
    auth_listener: JoinHandle<()>,
    session_listener: JoinHandle<()>,
}

impl WorkdeckApp {
    /// Wire the layer together. `native_invoker` is the shell's RPC
    /// transport; `None` (or a browser config) degrades every read to
    /// empty defaults instead of erroring. Must run inside the runtime:
    /// event subscriptions are spawned here.
    pub fn bootstrap(
        config: &WorkdeckConfig,
        native_invoker: Option<Arc<dyn ShellInvoker>>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let environment = match &native_invoker {
            Some(_) if config.is_native() => ShellEnvironment::Native,
            _ => ShellEnvironment::Browser,
        };
        let invoker: Arc<dyn ShellInvoker> = match environment {
            ShellEnvironment::Native => {
                native_invoker.expect("native environment requires an invoker")
            }
            ShellEnvironment::Browser => Arc::new(NullInvoker),
        };

        let queries = QueryClient::new();
        let events = Arc::new(ShellEvents::default());
        let clickup = ClickUpClient::new(
            Arc::clone(&invoker),
            queries.clone(),
            ClickUpClientConfig {
                auth_stale_time: config.auth_stale_time(),
                hierarchy_stale_time: config.hierarchy_stale_time(),
                task_stale_time: config.task_stale_time(),
                gc_time: config.gc_time(),
                list_retry: config.query.list_retry,
            },
        );
        let github = GithubClient::new(
            Arc::clone(&invoker),
            queries.clone(),
            GithubClientConfig {
                issue_stale_time: config.issue_stale_time(),
                gc_time: config.gc_time(),
                list_retry: config.query.list_retry,
            },
        );
        let sessions = SessionDirectory::new(Arc::clone(&invoker), queries.clone());
        let auth_listener = clickup.spawn_auth_subscription(&events);
        let session_listener = sessions.spawn_change_subscription(&events);
        info!(environment = ?environment, "workdeck client layer bootstrapped");

        Ok(Self {
            environment,
            invoker,
            events,
            queries,
            clickup,
            github,
            sessions,
            registry: CommandRegistry::new()?,
            auth_listener,
            session_listener,
        })
    }

    pub fn environment(&self) -> ShellEnvironment {
        self.environment
    }

    pub fn invoker(&self) -> &Arc<dyn ShellInvoker> {
        &self.invoker
    }

    /// The hub the shell pumps backend events into.
    pub fn events(&self) -> &Arc<ShellEvents> {
        &self.events
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn clickup(&self) -> &ClickUpClient {
        &self.clickup
    }

    pub fn github(&self) -> &GithubClient {
        &self.github
    }

    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Periodically evict cache entries unused past their collection
    /// window. One coarse timer for the whole cache.
    pub fn spawn_cache_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let queries = self.queries.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // the first tick fires immediately
            loop {
                ticker.tick().await;
                queries.sweep(Instant::now());
            }
        })
    }
}

impl Drop for WorkdeckApp {
    fn drop(&mut self) {
        self.auth_listener.abort();
        self.session_listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn browser_bootstrap_serves_empty_defaults() {
        let config = WorkdeckConfig::default();
        let app = WorkdeckApp::bootstrap(&config, None).expect("bootstrap succeeds");
        assert_eq!(app.environment(), ShellEnvironment::Browser);

        let workspaces = app.clickup().workspaces().await;
        assert_eq!(workspaces.error, None);
        assert_eq!(
            workspaces.data.as_deref(),
            Some(&[][..]),
            "browser reads degrade to empty, never to errors"
        );

        let issues = app.github().issues(Some("acme/tool"), false, 0).await;
        assert_eq!(issues.error, None);
        assert!(issues.data.expect("issue page decodes").issues.is_empty());
    }

    #[tokio::test]
    async fn native_config_without_an_invoker_still_degrades() {
        let config = WorkdeckConfig::default();
        assert!(config.is_native());
        let app = WorkdeckApp::bootstrap(&config, None).expect("bootstrap succeeds");
        assert_eq!(app.environment(), ShellEnvironment::Browser);
    }
}
