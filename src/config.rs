use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use anyhow::{anyhow, Context, Error, Result};
use reqwest::Url;
use crate::notify::DEFAULT_QUIET;

pub const STATUS_PATTERN: &str = "^(die|start)$";
pub const NAME_PATTERN:   &str = ".*";
pub const UNKNOWN:        &str = "UNKNOWN";

#[derive(Clone, Debug)]
pub struct Config {
    pub status_pattern: String,
    pub name_pattern:   String,
    pub webhook:        Url,
    pub channel:        String,
    pub region:         String,
    pub hostname:       String,
    pub debounce:       Duration,
    pub source:         Source,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    Docker,
    Stdin,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I: IntoIterator<Item = (String, String)>>(vars: I) -> Result<Self> {
        let vars = vars.into_iter().collect::<HashMap<_, _>>();
        let get  = |name: &str| vars.get(name).map(String::as_str);

        let webhook = get("SLACK_WEBHOOK_URL").ok_or_else(|| {
            anyhow!("SLACK_WEBHOOK_URL is not set")
        })?;
        let webhook = Url::parse(webhook).context("invalid SLACK_WEBHOOK_URL")?;

        let debounce = match get("DEBOUNCE_MS") {
            Some(ms) => Duration::from_millis(ms.parse().with_context(|| {
                format!("invalid DEBOUNCE_MS: {}", ms)
            })?),
            None     => DEFAULT_QUIET,
        };

        let source = get("EVENT_SOURCE").unwrap_or("docker").parse()?;

        let hostname = match get("DOCKER_HOSTNAME") {
            Some(name) => name.to_owned(),
            None       => local_hostname(),
        };

        Ok(Self {
            status_pattern: get("STATE_REGEXPR").unwrap_or(STATUS_PATTERN).to_owned(),
            name_pattern:   get("NAME_REGEXPR").unwrap_or(NAME_PATTERN).to_owned(),
            webhook:        webhook,
            channel:        get("SLACK_CHANNEL").unwrap_or("").to_owned(),
            region:         get("AWS_REGION").unwrap_or(UNKNOWN).to_owned(),
            hostname:       hostname,
            debounce:       debounce,
            source:         source,
        })
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        match arg {
            "docker" => Ok(Self::Docker),
            "stdin"  => Ok(Self::Stdin),
            _        => Err(anyhow!("invalid EVENT_SOURCE: {}", arg)),
        }
    }
}

fn local_hostname() -> String {
    hostname::get().ok().and_then(|name| {
        name.into_string().ok()
    }).unwrap_or_else(|| UNKNOWN.to_owned())
}
