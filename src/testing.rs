use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;
use crate::data::Container;
use crate::enrich::Inspect;
use crate::event::Event;
use crate::format::Formatter;
use crate::sink::{Message, Transport};

pub struct FakeDocker {
    names: HashMap<String, String>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl FakeDocker {
    pub fn new(containers: &[(&str, &str)]) -> Self {
        let names = containers.iter().map(|(id, name)| {
            (id.to_string(), name.to_string())
        }).collect();
        Self { names, calls: Mutex::new(HashMap::new()), delay: Duration::from_secs(0) }
    }

    pub fn slow(containers: &[(&str, &str)], delay: Duration) -> Self {
        Self { delay, ..Self::new(containers) }
    }

    pub fn calls(&self, id: &str) -> usize {
        self.calls.lock().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Inspect for FakeDocker {
    async fn inspect(&self, id: &str) -> Result<Container> {
        *self.calls.lock().entry(id.to_owned()).or_insert(0) += 1;

        if self.delay > Duration::from_secs(0) {
            sleep(self.delay).await;
        }

        match self.names.get(id) {
            Some(name) => Ok(Container {
                id:    id.to_owned(),
                name:  name.clone(),
                image: format!("{}:latest", &name[1..]),
            }),
            None => Err(anyhow!("no such container: {}", id)),
        }
    }
}

#[derive(Default)]
pub struct Recorder {
    messages: Mutex<Vec<Message>>,
    fail:     bool,
}

impl Recorder {
    pub fn failing() -> Self {
        Self { messages: Mutex::new(Vec::new()), fail: true }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, message: Message) -> Result<()> {
        self.messages.lock().push(message);
        match self.fail {
            true  => Err(anyhow!("connection refused")),
            false => Ok(()),
        }
    }
}

pub fn formatter() -> Formatter {
    Formatter {
        channel:  String::new(),
        hostname: "host".to_owned(),
        region:   "us-east-1".to_owned(),
    }
}

pub fn named(id: &str, status: &str, time_nano: u64, from: &str) -> Event {
    let mut event = Event::new(id, status, time_nano, from);
    event.container = Some(Arc::new(Container {
        id:    id.to_owned(),
        name:  format!("/{}", id),
        image: from.to_owned(),
    }));
    event
}
