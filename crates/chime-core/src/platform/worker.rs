use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ConfigError;
use crate::poller::{Tick, TickParams, WorkerHandle, WorkerSpawner};

/// Spawns a tokio task that ticks on a fixed cadence parsed from the
/// worker source: "500ms", "2s", or a plain number of seconds. The first
/// tick fires immediately.
pub struct IntervalSpawner;

fn parse_cadence(source: &str) -> Result<Duration, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "worker_source".to_string(),
        message,
    };

    let source = source.trim();
    if let Some(ms) = source.strip_suffix("ms") {
        let ms: u64 = ms
            .trim()
            .parse()
            .map_err(|_| invalid(format!("cannot parse '{source}' as a cadence")))?;
        if ms == 0 {
            return Err(invalid("cadence must be positive".to_string()));
        }
        return Ok(Duration::from_millis(ms));
    }

    let secs: u64 = source
        .strip_suffix('s')
        .unwrap_or(source)
        .trim()
        .parse()
        .map_err(|_| invalid(format!("cannot parse '{source}' as a cadence")))?;
    if secs == 0 {
        return Err(invalid("cadence must be positive".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

struct IntervalWorker {
    params_tx: mpsc::UnboundedSender<TickParams>,
    task: JoinHandle<()>,
}

impl WorkerHandle for IntervalWorker {
    fn post(&self, params: TickParams) {
        let _ = self.params_tx.send(params);
    }

    fn terminate(self: Box<Self>) {
        self.task.abort();
    }
}

impl WorkerSpawner for IntervalSpawner {
    fn spawn(
        &self,
        source: &str,
        ticks: mpsc::UnboundedSender<Tick>,
    ) -> Result<Box<dyn WorkerHandle>, ConfigError> {
        let cadence = parse_cadence(source)?;
        let (params_tx, mut params_rx) = mpsc::unbounded_channel::<TickParams>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(cadence);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if ticks.send(Tick).is_err() {
                            break; // consumer gone
                        }
                    }
                    Some(params) = params_rx.recv() => {
                        debug!("tick worker configured: second={}", params.second);
                    }
                }
            }
        });

        Ok(Box::new(IntervalWorker { params_tx, task }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn parses_cadence_specs() {
        assert_eq!(parse_cadence("1s").unwrap(), StdDuration::from_secs(1));
        assert_eq!(parse_cadence("500ms").unwrap(), StdDuration::from_millis(500));
        assert_eq!(parse_cadence("2").unwrap(), StdDuration::from_secs(2));
        assert_eq!(parse_cadence(" 3s ").unwrap(), StdDuration::from_secs(3));
    }

    #[test]
    fn rejects_invalid_cadence() {
        assert!(parse_cadence("soon").is_err());
        assert!(parse_cadence("0").is_err());
        assert!(parse_cadence("0ms").is_err());
    }

    #[tokio::test]
    async fn worker_delivers_ticks() {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
        let handle = IntervalSpawner.spawn("10ms", tick_tx).unwrap();
        handle.post(TickParams { second: 60 });

        for _ in 0..2 {
            tokio::time::timeout(StdDuration::from_secs(1), tick_rx.recv())
                .await
                .expect("tick not delivered")
                .expect("worker closed the channel");
        }
        handle.terminate();
    }
}
