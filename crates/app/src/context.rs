//! Per-request context threaded from the driving adapter to the publisher.

use tokio_util::sync::CancellationToken;

/// Correlation data and cancellation for one logical request.
///
/// The publisher copies the ids onto every message it dispatches and stops
/// between messages once `cancellation` fires.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub cancellation: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            correlation_id: None,
            causation_id: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl RequestContext {
    /// Uncancelled context without correlation data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    #[must_use]
    pub fn with_causation_id(mut self, causation_id: impl Into<String>) -> Self {
        self.causation_id = Some(causation_id.into());
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
