use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Info => "ℹ️",
            ToastLevel::Success => "✅",
            ToastLevel::Warning => "⚠️",
            ToastLevel::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// The single toast slot. A new toast replaces the one on screen.
#[derive(Debug)]
pub struct Notifier {
    duration: Duration,
    current: Option<Toast>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn show(&mut self, level: ToastLevel, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::debug!("toast {:?}: {}", level, message);
        self.current = Some(Toast {
            level,
            message,
            expires_at: now + self.duration,
        });
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Drop the toast once its time is up
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| t.expires_at <= now) {
            self.current = None;
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|t| t.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_millis(3000));

        notifier.show(ToastLevel::Success, "ok", start);
        notifier.expire(start + Duration::from_millis(2999));
        assert!(notifier.current().is_some());

        notifier.expire(start + Duration::from_millis(3000));
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_new_toast_replaces_old() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));

        notifier.show(ToastLevel::Info, "first", start);
        notifier.show(ToastLevel::Error, "second", start);

        let toast = notifier.current().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.level, ToastLevel::Error);
    }
}
