use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::json;
use shared_event_bus::{EventPublisher, EventRecord};
use shared_logging::{JsonLogger, LogLevel, LogRecord};

use crate::orchestrator::ChatOutcome;

/// Builder configuring telemetry for chat exchanges.
pub struct ChatTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl ChatTelemetryBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            event_publisher: None,
        }
    }

    /// Sets the JSON log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Assigns the event publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    /// Finalizes the builder.
    pub fn build(self) -> Result<ChatTelemetry> {
        let logger = self.log_path.map(JsonLogger::new).transpose()?;
        Ok(ChatTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
                publisher: self.event_publisher,
            }),
        })
    }
}

/// Telemetry handle shared by the orchestrator and the session shell.
#[derive(Clone)]
pub struct ChatTelemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl fmt::Debug for ChatTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTelemetry")
            .field("module", &self.inner.module)
            .finish()
    }
}

impl ChatTelemetry {
    /// Records one completed exchange: a structured log line plus a
    /// `chat.turn.completed` event when a publisher is attached.
    pub async fn record_exchange(&self, outcome: &ChatOutcome) -> Result<()> {
        let payload = json!({
            "resolution": outcome.resolution.label(),
            "trace": outcome.trace.iter().map(|state| state.label()).collect::<Vec<_>>(),
            "advisory": outcome.advisory.is_some(),
        });

        if let Some(logger) = &self.inner.logger {
            let mut record =
                LogRecord::new(&self.inner.module, LogLevel::Info, "exchange completed");
            record = record.with_metadata("exchange", payload.clone());
            logger.log(&record)?;
        }
        if let Some(publisher) = &self.inner.publisher {
            publisher
                .publish(EventRecord::new(
                    &self.inner.module,
                    "chat.turn.completed",
                    payload,
                ))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{OrchestratorState, Resolution};
    use shared_event_bus::MemoryEventBus;
    use tempfile::tempdir;
    use tokio::runtime::Runtime;

    fn outcome() -> ChatOutcome {
        ChatOutcome {
            reply: "Cement is a binding material.".into(),
            advisory: Some("did you mean: what is cement".into()),
            resolution: Resolution::Knowledge,
            trace: vec![OrchestratorState::Idle, OrchestratorState::Done],
        }
    }

    #[test]
    fn logs_and_publishes_exchanges() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let dir = tempdir().unwrap();
            let bus = Arc::new(MemoryEventBus::new(8));
            let telemetry = ChatTelemetryBuilder::new("chat")
                .log_path(dir.path().join("chat.log"))
                .event_publisher(bus.clone())
                .build()
                .unwrap();

            telemetry.record_exchange(&outcome()).await.unwrap();

            let log = std::fs::read_to_string(dir.path().join("chat.log")).unwrap();
            assert!(log.contains("\"resolution\":\"knowledge\""));
            assert_eq!(bus.snapshot().len(), 1);
            assert_eq!(bus.snapshot()[0].event_type, "chat.turn.completed");
        });
    }

    #[test]
    fn bare_telemetry_is_a_no_op() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let telemetry = ChatTelemetryBuilder::new("chat").build().unwrap();
            telemetry.record_exchange(&outcome()).await.unwrap();
        });
    }
}
