use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use shiplift::Docker;
use crate::data::Container;
use crate::event::Event;

#[async_trait]
pub trait Inspect: Send + Sync {
    async fn inspect(&self, id: &str) -> Result<Container>;
}

#[async_trait]
impl Inspect for Docker {
    async fn inspect(&self, id: &str) -> Result<Container> {
        let c = self.containers().get(id).inspect().await?;
        Ok(Container {
            id:    c.id,
            name:  c.name,
            image: c.config.image,
        })
    }
}

pub struct Enricher {
    cache:     RwLock<HashMap<String, Slot>>,
    epoch:     AtomicU64,
    inspector: Arc<dyn Inspect>,
}

/// A slot is created on the first miss for an id and removed on eviction.
/// Lookups only store their result if the slot they started from is still
/// present, so an eviction during a lookup keeps the id cold.
struct Slot {
    epoch:     u64,
    container: Option<Arc<Container>>,
}

impl Enricher {
    pub fn new(inspector: Arc<dyn Inspect>) -> Self {
        let cache = RwLock::new(HashMap::new());
        let epoch = AtomicU64::new(0);
        Self { cache, epoch, inspector }
    }

    pub async fn enrich(&self, mut event: Event) -> Event {
        event.container = Some(self.get(&event.id).await);

        if event.is_destroy() {
            self.evict(&event.id);
        }

        event
    }

    pub async fn get(&self, id: &str) -> Arc<Container> {
        let cached = self.cache.read().get(id).and_then(|s| s.container.clone());

        if let Some(container) = cached {
            debug!("cache hit {}", id);
            return container;
        }

        debug!("cache miss {}", id);

        let epoch = self.reserve(id);

        match self.inspector.inspect(id).await {
            Ok(container) => {
                let container = Arc::new(container);
                let mut cache = self.cache.write();
                match cache.get_mut(id) {
                    Some(slot) if slot.epoch == epoch => {
                        slot.container = Some(container.clone());
                    }
                    _ => debug!("discarded lookup of evicted {}", id),
                }
                container
            }
            Err(e) => {
                warn!("inspect {} failed: {:?}", id, e);
                let mut cache = self.cache.write();
                let empty = cache.get(id).map(|s| {
                    s.epoch == epoch && s.container.is_none()
                }).unwrap_or(false);
                if empty {
                    cache.remove(id);
                }
                Arc::new(Container::unknown(id))
            }
        }
    }

    pub fn evict(&self, id: &str) {
        if self.cache.write().remove(id).is_some() {
            debug!("evicted {}", id);
        }
    }

    fn reserve(&self, id: &str) -> u64 {
        let mut cache = self.cache.write();
        let slot = cache.entry(id.to_owned()).or_insert_with(|| Slot {
            epoch:     self.epoch.fetch_add(1, Ordering::Relaxed),
            container: None,
        });
        slot.epoch
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cache.read().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
