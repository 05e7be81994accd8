use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// User-facing notifications, with identical (message, severity) pairs collapsed
/// inside the dedup window.
pub struct Notifier {
    window: Duration,
    recent: Mutex<HashMap<(String, Severity), Instant>>,
}

impl Notifier {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `false` when the notification was suppressed as a duplicate.
    pub fn notify(&self, message: &str, severity: Severity) -> bool {
        self.notify_at(message, severity, Instant::now())
    }

    pub fn notify_at(&self, message: &str, severity: Severity, now: Instant) -> bool {
        let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.retain(|_, shown_at| now.saturating_duration_since(*shown_at) < self.window);

        let key = (message.to_string(), severity);
        if recent.contains_key(&key) {
            tracing::debug!("Suppressed duplicate {} notification: {}", severity, message);
            return false;
        }
        recent.insert(key, now);
        drop(recent);

        match severity {
            Severity::Info => tracing::info!("ℹ️ {}", message),
            Severity::Success => tracing::info!("✅ {}", message),
            Severity::Warning => tracing::warn!("⚠️ {}", message),
            Severity::Error => tracing::error!("❌ {}", message),
        }
        true
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_WINDOW)
    }
}
