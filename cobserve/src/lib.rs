//! Ready-made [`ChatObserver`](cchat::ChatObserver) implementations.
//!
//! ```rust
//! use cobserve::{FanoutChatObserver, MetricsChatObserver, SafeChatObserver, TracingChatObserver};
//!
//! let _observer = FanoutChatObserver::new()
//!     .with(SafeChatObserver::new(TracingChatObserver))
//!     .with(MetricsChatObserver);
//! ```

mod fanout;
mod metrics_observer;
mod safe_observer;
mod tracing_observer;

pub use fanout::FanoutChatObserver;
pub use metrics_observer::MetricsChatObserver;
pub use safe_observer::SafeChatObserver;
pub use tracing_observer::TracingChatObserver;

pub mod prelude {
    pub use crate::{
        FanoutChatObserver, MetricsChatObserver, SafeChatObserver, TracingChatObserver,
    };
}

#[cfg(test)]
mod tests;
