//! Typing Simulation: an artificial pause before each reply.
//!
//! The delay scales with the reply's length at an assumed reading speed and
//! is clamped to a configured window. [`ReplyScheduler`] keeps at most one
//! delayed reply in flight: scheduling a new one aborts the pending task.

use crate::ai::engine::Message;
use crate::config::TypingConfig;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Typing simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingParams {
    /// How long the typing indicator should show (milliseconds).
    pub duration_ms: u64,
    /// Typing speed description for the indicator animation.
    pub speed: TypingSpeed,
}

impl TypingParams {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingSpeed {
    Fast,   // < 1500ms
    Normal, // 1500-2499ms
    Slow,   // 2500ms+
}

/// Delay for a reply of `reply_len` characters.
pub fn calculate_typing_delay(reply_len: usize, config: &TypingConfig) -> TypingParams {
    let chars_per_minute = config.words_per_minute * config.avg_word_length;
    let per_char_ms = if chars_per_minute > 0.0 {
        60_000.0 / chars_per_minute
    } else {
        0.0
    };

    let min = config.min_delay_ms as f64;
    let max = (config.max_delay_ms as f64).max(min);
    let duration_ms = (reply_len as f64 * per_char_ms).clamp(min, max) as u64;

    let speed = match duration_ms {
        0..=1499 => TypingSpeed::Fast,
        1500..=2499 => TypingSpeed::Normal,
        _ => TypingSpeed::Slow,
    };

    TypingParams { duration_ms, speed }
}

/// Delivers system messages after a delay, one at a time.
pub struct ReplyScheduler {
    tx: mpsc::UnboundedSender<Message>,
    pending: Option<JoinHandle<()>>,
}

impl ReplyScheduler {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx, pending: None }
    }

    /// Replace any pending reply with `reply`, sent after `delay`.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, reply: Message, delay: Duration) {
        if self.cancel() {
            tracing::debug!("[Typing] Pending reply superseded");
        }
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(reply).is_err() {
                tracing::debug!("[Typing] Receiver gone, reply dropped");
            }
        }));
    }

    /// Abort the pending reply. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_replies_hit_the_floor() {
        let params = calculate_typing_delay(5, &TypingConfig::default());
        assert_eq!(params.duration_ms, 1000);
        assert_eq!(params.speed, TypingSpeed::Fast);
    }

    #[test]
    fn delay_scales_with_length() {
        // 200 wpm * 5 chars = 1000 chars/min, 60ms per char.
        let params = calculate_typing_delay(30, &TypingConfig::default());
        assert_eq!(params.duration_ms, 1800);
        assert_eq!(params.speed, TypingSpeed::Normal);
    }

    #[test]
    fn long_replies_hit_the_ceiling() {
        let params = calculate_typing_delay(10_000, &TypingConfig::default());
        assert_eq!(params.duration_ms, 3000);
        assert_eq!(params.speed, TypingSpeed::Slow);
    }

    #[test]
    fn degenerate_config_stays_within_bounds() {
        let config = TypingConfig {
            words_per_minute: 0.0,
            avg_word_length: 5.0,
            min_delay_ms: 500,
            max_delay_ms: 100,
        };
        let params = calculate_typing_delay(50, &config);
        assert_eq!(params.duration_ms, 500);
    }

    #[tokio::test]
    async fn reply_arrives_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = ReplyScheduler::new(tx);
        scheduler.schedule(Message::system("hello", vec![]), Duration::from_millis(10));
        assert!(scheduler.is_pending());

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.text, "hello");
    }

    #[tokio::test]
    async fn resubmit_cancels_pending_reply() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = ReplyScheduler::new(tx);
        scheduler.schedule(Message::system("stale", vec![]), Duration::from_millis(200));
        scheduler.schedule(Message::system("fresh", vec![]), Duration::from_millis(10));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.text, "fresh");

        let nothing = tokio::time::timeout(Duration::from_millis(400), rx.recv()).await;
        assert!(nothing.is_err(), "stale reply should never be delivered");
    }

    #[tokio::test]
    async fn cancel_reports_whether_anything_was_pending() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = ReplyScheduler::new(tx);
        assert!(!scheduler.cancel());

        scheduler.schedule(Message::system("later", vec![]), Duration::from_secs(5));
        assert!(scheduler.cancel());
        assert!(!scheduler.is_pending());
    }
}
