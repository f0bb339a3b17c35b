//! `metrics` counters and histograms for turns and function dispatch.
//!
//! ```rust
//! use cchat::ChatObserver;
//! use cobserve::MetricsChatObserver;
//!
//! fn accepts_observer(_observer: &dyn ChatObserver) {}
//!
//! accepts_observer(&MetricsChatObserver);
//! ```

use std::time::Duration;

use cchat::{ChatError, ChatObserver};
use ccommon::ConversationId;
use cfunction::FunctionError;
use cprovider::{FunctionCallMessage, ProviderRequest};

/// Provider request counts are only recorded while the bot's debug flag is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsChatObserver;

impl ChatObserver for MetricsChatObserver {
    fn on_turn_start(&self, _conversation: &ConversationId, _prompt: &str) {
        metrics::counter!("colloquy_turn_start_total").increment(1);
    }

    fn on_request(&self, _conversation: &ConversationId, _round_trip: u32, request: &ProviderRequest) {
        metrics::counter!(
            "colloquy_provider_request_total",
            "provider" => request.provider.to_string()
        )
        .increment(1);
    }

    fn on_function_start(&self, _conversation: &ConversationId, call: &FunctionCallMessage) {
        metrics::counter!(
            "colloquy_function_start_total",
            "function_name" => call.function_name().to_string()
        )
        .increment(1);
    }

    fn on_function_success(
        &self,
        _conversation: &ConversationId,
        call: &FunctionCallMessage,
        _result: &str,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "colloquy_function_success_total",
            "function_name" => call.function_name().to_string()
        )
        .increment(1);
        metrics::histogram!(
            "colloquy_function_duration_seconds",
            "function_name" => call.function_name().to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_function_failure(
        &self,
        _conversation: &ConversationId,
        call: &FunctionCallMessage,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "colloquy_function_failure_total",
            "function_name" => call.function_name().to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "colloquy_function_duration_seconds",
            "function_name" => call.function_name().to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_turn_complete(&self, _conversation: &ConversationId, round_trips: u32, elapsed: Duration) {
        metrics::counter!("colloquy_turn_success_total").increment(1);
        metrics::histogram!("colloquy_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
        metrics::histogram!("colloquy_round_trips_per_turn", "status" => "success")
            .record(round_trips as f64);
    }

    fn on_turn_failure(
        &self,
        _conversation: &ConversationId,
        error: &ChatError,
        round_trips: u32,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "colloquy_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("colloquy_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
        metrics::histogram!("colloquy_round_trips_per_turn", "status" => "failure")
            .record(round_trips as f64);
    }
}
