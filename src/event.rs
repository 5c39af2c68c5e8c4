use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::Arc;
use anyhow::{anyhow, Error};
use serde::Deserialize;
use crate::data::Container;

pub const DESTROY: &str = "destroy";

#[derive(Clone, Debug)]
pub struct Event {
    pub id:        String,
    pub status:    String,
    pub time_nano: u64,
    pub from:      String,
    pub container: Option<Arc<Container>>,
}

impl Event {
    pub fn new(id: &str, status: &str, time_nano: u64, from: &str) -> Self {
        Self {
            id:        id.to_owned(),
            status:    status.to_owned(),
            time_nano: time_nano,
            from:      from.to_owned(),
            container: None,
        }
    }

    pub fn is_destroy(&self) -> bool {
        self.status == DESTROY
    }

    pub fn name(&self) -> &str {
        match &self.container {
            Some(c) => &c.name,
            None    => "",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Raw {
    #[serde(rename = "Type")]
    pub typ:       Option<String>,
    #[serde(rename = "Action")]
    pub action:    Option<String>,
    #[serde(rename = "Actor")]
    pub actor:     Option<Actor>,
    pub status:    Option<String>,
    pub id:        Option<String>,
    pub from:      Option<String>,
    pub time:      Option<u64>,
    #[serde(rename = "timeNano")]
    pub time_nano: Option<Nanos>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Actor {
    #[serde(rename = "ID")]
    pub id:         Option<String>,
    #[serde(rename = "Attributes", default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Nanos {
    Number(u64),
    String(String),
}

impl Nanos {
    fn value(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.parse().ok(),
        }
    }
}

impl TryFrom<Raw> for Event {
    type Error = Error;

    fn try_from(raw: Raw) -> Result<Self, Self::Error> {
        if let Some(typ) = raw.typ.as_deref() {
            if typ != "container" {
                return Err(anyhow!("ignored {} event", typ));
            }
        }

        let actor = raw.actor.unwrap_or_default();
        let mut attributes = actor.attributes;

        let id = raw.id.or(actor.id).ok_or_else(|| {
            anyhow!("event without id")
        })?;

        let status = raw.status.or(raw.action).ok_or_else(|| {
            anyhow!("event without status: {}", id)
        })?;

        let from = raw.from.or_else(|| {
            attributes.remove("image")
        }).unwrap_or_default();

        let time_nano = match raw.time_nano.as_ref().and_then(Nanos::value) {
            Some(nanos) => nanos,
            None        => raw.time.unwrap_or(0).saturating_mul(1_000_000_000),
        };

        Ok(Self {
            id:        id,
            status:    status,
            time_nano: time_nano,
            from:      from,
            container: None,
        })
    }
}

impl TryFrom<shiplift::rep::Event> for Event {
    type Error = Error;

    fn try_from(event: shiplift::rep::Event) -> Result<Self, Self::Error> {
        Event::try_from(Raw {
            typ:       Some(event.typ),
            action:    Some(event.action),
            actor:     Some(Actor {
                id:         Some(event.actor.id),
                attributes: event.actor.attributes,
            }),
            status:    event.status,
            id:        event.id,
            from:      event.from,
            time:      Some(event.time),
            time_nano: Some(Nanos::Number(event.time_nano)),
        })
    }
}
