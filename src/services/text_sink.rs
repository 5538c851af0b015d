use crate::error::SyncError;
use anyhow::Result;
use std::time::Duration;
#[cfg(target_os = "linux")]
use std::time::Instant;
#[cfg(target_os = "linux")]
use tracing::info;

/// Somewhere a finished summary can be handed off to
pub trait TextSink {
    fn name(&self) -> &str;

    fn publish(&mut self, text: &str) -> Result<()>;
}

/// How long the Linux clipboard owner stays alive by default
pub const DEFAULT_CLIPBOARD_HOLD: Duration = Duration::from_secs(60);

/// The system clipboard.
///
/// On Linux the clipboard content lives in the owning process, so
/// `publish` blocks until another program (usually a clipboard manager)
/// takes the selection over, or until `hold` runs out. Other platforms
/// return as soon as the text is set.
#[derive(Debug, Clone)]
pub struct ClipboardSink {
    pub hold: Duration,
}

impl ClipboardSink {
    pub fn with_hold(hold: Duration) -> Self {
        Self { hold }
    }
}

impl Default for ClipboardSink {
    fn default() -> Self {
        Self::with_hold(DEFAULT_CLIPBOARD_HOLD)
    }
}

impl TextSink for ClipboardSink {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn publish(&mut self, text: &str) -> Result<()> {
        let publish_error = |e: arboard::Error| SyncError::Publish {
            sink: self.name().to_string(),
            reason: e.to_string(),
        };

        let mut clipboard = arboard::Clipboard::new().map_err(publish_error)?;

        #[cfg(target_os = "linux")]
        {
            use arboard::SetExtLinux;

            info!(
                "Holding clipboard selection for up to {}s",
                self.hold.as_secs()
            );
            clipboard
                .set()
                .wait_until(Instant::now() + self.hold)
                .text(text.to_owned())
                .map_err(publish_error)?;
        }

        #[cfg(not(target_os = "linux"))]
        clipboard.set_text(text.to_owned()).map_err(publish_error)?;

        Ok(())
    }
}

/// Keeps everything published in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub published: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.published.last().map(String::as_str)
    }
}

impl TextSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn publish(&mut self, text: &str) -> Result<()> {
        self.published.push(text.to_string());
        Ok(())
    }
}
