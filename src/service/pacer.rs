use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spaces upstream calls at least `1 / rate` seconds apart.
///
/// Callers that arrive early wait for their slot; nobody is turned away.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Option<Duration>,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    /// `0` disables pacing.
    pub fn per_second(rate: u32) -> Self {
        let min_interval = (rate > 0).then(|| Duration::from_secs(1) / rate);
        Self { min_interval, last_start: Mutex::new(None) }
    }

    pub async fn wait_turn(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };

        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + interval;
            if ready_at > Instant::now() {
                debug!("Pacing upstream call for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());
    }
}
