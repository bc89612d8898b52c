//! The boundary to the native shell: RPC command invocation, event
//! subscription and the capability gate between native and browser contexts.

pub mod error;
pub mod events;
pub mod invoker;
pub mod vocabulary;

pub use error::BridgeError;
pub use events::{EventSubscription, ShellEvents, ShellEventsConfig, DEFAULT_EVENT_BUFFER_CAPACITY};
pub use invoker::{NullInvoker, ShellEnvironment, ShellInvoker};
pub use vocabulary::{command_ids, event_ids};
