use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use crate::event::Event;
use crate::format::Formatter;
use crate::sink::Transport;

pub const DEFAULT_QUIET: Duration = Duration::from_secs(5);

/// Coalesces bursts of events per container into one notification sent
/// after `quiet` has elapsed without another event for that container.
pub struct Notifier {
    shared: Arc<Shared>,
}

struct Shared {
    table:     Mutex<HashMap<String, Pending>>,
    serial:    AtomicU64,
    quiet:     Duration,
    formatter: Formatter,
    transport: Arc<dyn Transport>,
}

struct Pending {
    event:  Event,
    serial: u64,
    timer:  JoinHandle<()>,
}

impl Notifier {
    pub fn new(formatter: Formatter, transport: Arc<dyn Transport>, quiet: Duration) -> Self {
        let shared = Arc::new(Shared {
            table:     Mutex::new(HashMap::new()),
            serial:    AtomicU64::new(0),
            quiet:     quiet,
            formatter: formatter,
            transport: transport,
        });
        Self { shared }
    }

    pub fn handle(&self, event: Event) {
        let mut table = self.shared.table.lock();
        let serial    = self.shared.serial.fetch_add(1, Ordering::Relaxed);

        match table.entry(event.id.clone()) {
            Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();

                debug!("rearm {} with {} event", event.id, event.status);

                pending.timer.abort();
                pending.timer  = self.arm(&event.id, serial);
                pending.serial = serial;

                if event.time_nano >= pending.event.time_nano {
                    pending.event = event;
                }
            }
            Entry::Vacant(entry) => {
                let timer = self.arm(entry.key(), serial);
                entry.insert(Pending { event, serial, timer });
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.shared.table.lock().len()
    }

    fn arm(&self, id: &str, serial: u64) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let id     = id.to_owned();
        tokio::spawn(async move {
            sleep(shared.quiet).await;
            shared.fire(&id, serial).await;
        })
    }
}

impl Shared {
    async fn fire(&self, id: &str, serial: u64) {
        let event = {
            let mut table = self.table.lock();
            let current   = table.get(id).map(|p| p.serial) == Some(serial);
            match current {
                true  => table.remove(id).map(|p| p.event),
                false => None,
            }
        };

        if let Some(event) = event {
            self.dispatch(event).await;
        }
    }

    async fn dispatch(&self, event: Event) {
        let message = self.formatter.format(&event, Utc::now());

        info!("{}", message.fallback);

        if let Err(e) = self.transport.send(message).await {
            warn!("notify {} failed: {:?}", event.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{formatter, named, Recorder};

    const QUIET: Duration = Duration::from_secs(5);

    fn notifier(recorder: &Arc<Recorder>) -> Notifier {
        Notifier::new(formatter(), recorder.clone(), QUIET)
    }

    async fn wait(secs: u64) {
        sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn latest_timestamp_wins() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "start", 100, "img:100"));
        notifier.handle(named("c1", "start", 200, "img:200"));
        notifier.handle(named("c1", "start", 150, "img:150"));

        wait(6).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].field("Image"), Some("img:200"));
        assert_eq!(notifier.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn equal_timestamp_replaces() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "start", 100, "first"));
        notifier.handle(named("c1", "start", 100, "second"));

        wait(6).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].field("Image"), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_event_rearms() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "start", 100, "nginx"));
        wait(3).await;
        notifier.handle(named("c1", "die", 200, "nginx"));
        wait(3).await;

        assert!(recorder.messages().is_empty());
        assert_eq!(notifier.pending(), 1);

        wait(3).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].username.ends_with("container DIED"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_event_extends_window() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "die", 200, "nginx"));
        wait(3).await;
        notifier.handle(named("c1", "start", 100, "nginx"));
        wait(3).await;

        assert!(recorder.messages().is_empty());
        assert_eq!(notifier.pending(), 1);

        wait(3).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].username.ends_with("container DIED"));
        assert_eq!(notifier.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_isolated() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("a", "start", 100, "img-a"));
        wait(3).await;
        notifier.handle(named("b", "start", 500, "img-b"));
        wait(3).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].field("Image"), Some("img-a"));
        assert_eq!(notifier.pending(), 1);

        wait(3).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].field("Image"), Some("img-b"));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_to_idle_after_dispatch() {
        let recorder = Arc::new(Recorder::default());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "start", 200, "nginx"));
        wait(6).await;
        notifier.handle(named("c1", "die", 100, "nginx"));
        wait(6).await;

        let sent = recorder.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].username.ends_with("container DIED"));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_contained() {
        let recorder = Arc::new(Recorder::failing());
        let notifier = notifier(&recorder);

        notifier.handle(named("c1", "start", 1, "nginx"));
        wait(6).await;
        notifier.handle(named("c2", "start", 1, "nginx"));
        wait(6).await;

        assert_eq!(recorder.messages().len(), 2);
        assert_eq!(notifier.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_quiet_period() {
        let recorder = Arc::new(Recorder::default());
        let notifier = Notifier::new(formatter(), recorder.clone(), Duration::from_millis(0));

        notifier.handle(named("c1", "start", 1, "nginx"));
        wait(1).await;

        assert_eq!(recorder.messages().len(), 1);
    }
}
