use anyhow::Result;
use regex::Regex;
use crate::event::Event;

#[derive(Clone, Copy, Debug)]
pub enum Field {
    Status,
    Name,
}

#[derive(Debug)]
pub struct Filter {
    regex: Regex,
    field: Field,
}

impl Filter {
    pub fn new(field: Field, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Self { regex, field })
    }

    pub fn status(pattern: &str) -> Result<Self> {
        Self::new(Field::Status, pattern)
    }

    /// Matches against the enriched container name, so it must run after
    /// the enricher. Placeholder names are matched like any other name.
    pub fn name(pattern: &str) -> Result<Self> {
        Self::new(Field::Name, pattern)
    }

    pub fn matches(&self, event: &Event) -> bool {
        let value = match self.field {
            Field::Status => event.status.as_str(),
            Field::Name   => event.name(),
        };
        self.regex.is_match(value)
    }

    pub fn apply(&self, event: Event) -> Option<Event> {
        match self.matches(&event) {
            true  => Some(event),
            false => None,
        }
    }
}
