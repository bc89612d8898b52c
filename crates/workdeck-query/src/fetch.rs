use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use workdeck_bridge::{BridgeError, ShellInvoker};

pub type CommandFuture = Pin<Box<dyn Future<Output = Result<Value, BridgeError>> + Send>>;

/// Fetcher over one bridge command with fixed arguments, as the cache
/// expects it: callable once per attempt, cheap to clone into retries.
pub fn command_fetcher(
    invoker: Arc<dyn ShellInvoker>,
    command: &'static str,
    args: Value,
) -> impl Fn() -> CommandFuture + Send + Sync + 'static {
    move || {
        let invoker = Arc::clone(&invoker);
        let args = args.clone();
        Box::pin(async move { invoker.invoke(command, args).await })
    }
}
