use std::sync::Arc;
use anyhow::{anyhow, Result};
use log::trace;
use tokio::sync::mpsc::Receiver;
use crate::enrich::Enricher;
use crate::event::Event;
use crate::filter::Filter;
use crate::notify::Notifier;

pub struct Pipeline {
    status:   Filter,
    enricher: Enricher,
    name:     Filter,
    notifier: Notifier,
}

impl Pipeline {
    pub fn new(status: Filter, enricher: Enricher, name: Filter, notifier: Notifier) -> Self {
        Self { status, enricher, name, notifier }
    }

    /// Consumes events until the source closes, which is always an error.
    pub async fn run(self: Arc<Self>, mut rx: Receiver<Event>) -> Result<()> {
        while let Some(event) = rx.recv().await {
            trace!("{:?}", event);

            if !self.status.matches(&event) {
                if event.is_destroy() {
                    self.enricher.evict(&event.id);
                }
                continue;
            }

            let this = self.clone();
            tokio::spawn(async move {
                this.process(event).await;
            });
        }

        Err(anyhow!("event source closed"))
    }

    pub async fn process(&self, event: Event) {
        let event = self.enricher.enrich(event).await;

        match self.name.apply(event) {
            Some(event) => self.notifier.handle(event),
            None        => trace!("filtered by name"),
        }
    }

    #[cfg(test)]
    pub(crate) fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    #[cfg(test)]
    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
