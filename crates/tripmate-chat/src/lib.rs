//! Conversation reconciler for the Tripmate chat client
//!
//! [`ChatStore`] owns the live transcript, the tool-status index and the
//! conversation list. Streamed [`ChatEvent`](tripmate_types::ChatEvent)s are
//! folded in arrival order by [`ChatState::apply_event`]; each fold is
//! synchronous, so observers never see a half-applied event.

pub mod observer;
pub mod projection;
pub mod state;
pub mod store;
pub mod tool_status;

pub use observer::{NoopObserver, StoreEvent, StoreObserver, TracingObserver};
pub use projection::{preview, update_conversation_order, ELLIPSIS, PREVIEW_LIMIT};
pub use state::ChatState;
pub use store::{ChatStore, StoreOptions};
pub use tool_status::ToolStatusIndex;
