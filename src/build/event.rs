use std::sync::Mutex;

/// Lifecycle of one build stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageEvent {
    Started {
        name: String,
        has_progress: bool,
        total_steps: Option<usize>,
    },
    Progressed {
        name: String,
        message: Option<String>,
    },
    Completed {
        name: String,
    },
    Failed {
        name: String,
        message: String,
    },
}

impl StageEvent {
    pub fn started(name: &str) -> Self {
        Self::Started {
            name: name.to_string(),
            has_progress: false,
            total_steps: None,
        }
    }

    pub fn started_with_progress(name: &str, total_steps: usize) -> Self {
        Self::Started {
            name: name.to_string(),
            has_progress: true,
            total_steps: Some(total_steps),
        }
    }

    pub fn progressed(name: &str, message: impl Into<String>) -> Self {
        Self::Progressed {
            name: name.to_string(),
            message: Some(message.into()),
        }
    }

    pub fn completed(name: &str) -> Self {
        Self::Completed {
            name: name.to_string(),
        }
    }

    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Started { name, .. }
            | Self::Progressed { name, .. }
            | Self::Completed { name }
            | Self::Failed { name, .. } => name,
        }
    }
}

/// Receives stage events from the orchestrator.
pub trait StageListener: Send + Sync {
    fn on_event(&self, event: &StageEvent);
}

/// Renders stage events as log lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingStageListener;

impl StageListener for TracingStageListener {
    fn on_event(&self, event: &StageEvent) {
        match event {
            StageEvent::Started {
                name, total_steps, ..
            } => match total_steps {
                Some(steps) => tracing::info!(stage = %name, steps, "stage started"),
                None => tracing::info!(stage = %name, "stage started"),
            },
            StageEvent::Progressed { name, message } => {
                tracing::debug!(stage = %name, item = message.as_deref().unwrap_or(""), "progress");
            }
            StageEvent::Completed { name } => tracing::info!(stage = %name, "stage completed"),
            StageEvent::Failed { name, message } => {
                tracing::error!(stage = %name, "{name}: {message}");
            }
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingStageListener {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingStageListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

impl StageListener for RecordingStageListener {
    fn on_event(&self, event: &StageEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/event.rs"]
mod tests;
