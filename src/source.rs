use std::convert::TryFrom;
use std::future::Future;
use std::sync::Arc;
use anyhow::{anyhow, Result};
use futures::StreamExt;
use log::{debug, error, trace, warn};
use serde_json::Deserializer;
use shiplift::{Docker, EventsOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{channel, Receiver};
use crate::event::{Event, Raw};

const CAPACITY: usize = 1024;

/// Streams container events from the Docker daemon. The receiver closes
/// when the daemon connection fails or ends.
pub fn docker(docker: Arc<Docker>) -> Receiver<Event> {
    let (tx, rx) = channel(CAPACITY);

    spawn(async move {
        let opts       = EventsOptions::builder().build();
        let mut stream = Box::pin(docker.events(&opts));

        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event)                               => event,
                Err(shiplift::Error::SerdeJsonError(e)) => {
                    warn!("invalid event: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match Event::try_from(event) {
                Ok(event) => tx.send(event).await?,
                Err(e)    => trace!("skipped: {}", e),
            }
        }

        Err(anyhow!("docker event stream closed"))
    });

    rx
}

/// Decodes newline-delimited JSON events, as written by
/// `docker events --format '{{json .}}'`.
pub fn decode<R>(reader: R) -> Receiver<Event>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = channel(CAPACITY);

    spawn(async move {
        let mut reader = reader;
        let mut line   = Vec::new();

        while reader.read_until(b'\n', &mut line).await? > 0 {
            for event in parse(&line) {
                tx.send(event).await?;
            }
            line.clear();
        }

        Err(anyhow!("event stream closed"))
    });

    rx
}

/// Parses every JSON object in `line`. A malformed object drops the rest
/// of the line.
pub fn parse(line: &[u8]) -> Vec<Event> {
    let mut events = Vec::new();

    for raw in Deserializer::from_slice(line).into_iter::<Raw>() {
        let raw = match raw {
            Ok(raw) => raw,
            Err(e)  => {
                warn!("invalid event: {}", e);
                break;
            }
        };

        match Event::try_from(raw) {
            Ok(event) => events.push(event),
            Err(e)    => trace!("skipped: {}", e),
        }
    }

    events
}

pub fn spawn<F: Future<Output = Result<()>> + Send + 'static>(task: F) {
    tokio::spawn(async move {
        match task.await {
            Ok(()) => debug!("task finished"),
            Err(e) => error!("task failed: {:?}", e),
        }
    });
}
