use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use clap::Args;
use log::{error, info};

use chime_core::platform::{AlarmSound, DesktopNotifier, DesktopPermission, IntervalSpawner};
use chime_core::{ChangeHook, Config, Ports, Selectable, TargetTime, Watcher};

#[derive(Args)]
pub struct WatchArgs {
    /// Target times (RFC 3339, or HH:MM[:SS] for the next occurrence)
    #[arg(long = "at", required = true)]
    at: Vec<String>,

    /// Trigger window in seconds (overrides config)
    #[arg(long)]
    window: Option<u64>,

    /// Worker source / cadence spec (overrides config)
    #[arg(long)]
    source: Option<String>,

    /// Alarm sound file (overrides config)
    #[arg(long)]
    alarm: Option<PathBuf>,
}

/// The CLI has no interactive checkboxes; every watched target is on.
struct AlwaysSelected;

impl Selectable for AlwaysSelected {
    fn checked(&self) -> bool {
        true
    }
    fn subscribe(&self, _hook: ChangeHook) {}
}

/// A fixed target time parsed from the command line.
struct FixedTarget(DateTime<Utc>);

impl TargetTime for FixedTarget {
    fn current(&self) -> DateTime<Utc> {
        self.0
    }
    fn subscribe(&self, _hook: ChangeHook) {}
}

fn parse_target(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("cannot parse '{raw}' as RFC 3339 or HH:MM"))?;

    let now = Local::now();
    let naive = now.date_naive().and_time(time);
    let local = match naive.and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => {
            return Err(format!("'{raw}' is not a valid local time today").into())
        }
    };
    // A clock time already behind us means the next occurrence, tomorrow.
    let local = if local <= now {
        local + chrono::Duration::days(1)
    } else {
        local
    };
    Ok(local.with_timezone(&Utc))
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(window) = args.window {
        config.watch.window_seconds = window;
    }
    if let Some(source) = &args.source {
        config.watch.worker_source = source.clone();
    }
    if let Some(alarm) = &args.alarm {
        config.notifications.alarm = Some(alarm.display().to_string());
    }

    let targets = args
        .at
        .iter()
        .map(|raw| parse_target(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_watch(config, targets))
}

async fn run_watch(
    config: Config,
    targets: Vec<DateTime<Utc>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let alarm = config
        .notifications
        .alarm
        .clone()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let ports = Ports {
        alerts: Arc::new(DesktopNotifier::new()),
        audio: Arc::new(AlarmSound::new(alarm)),
        permission: Arc::new(DesktopPermission),
        worker: Arc::new(IntervalSpawner),
    };
    let watcher = Watcher::new(ports, &config);
    let mut events = watcher.events().ok_or("event stream already taken")?;

    for target in targets {
        info!("watching target {target}");
        watcher.add(Arc::new(AlwaysSelected), Arc::new(FixedTarget(target)));
    }

    // Denial leaves the feature disabled; not fatal.
    if let Err(e) = watcher.request_permission().await {
        error!("{e}");
        return Ok(());
    }

    watcher.start()?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => error!("failed to serialize event: {e}"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    watcher.stop();
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_targets() {
        let dt = parse_target("2026-08-07T12:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap());
    }

    #[test]
    fn clock_time_resolves_to_the_future() {
        let dt = parse_target("23:59").unwrap();
        assert!(dt > Utc::now());
        let dt = parse_target("00:00").unwrap();
        assert!(dt > Utc::now());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_target("noon-ish").is_err());
        assert!(parse_target("25:99").is_err());
    }
}
