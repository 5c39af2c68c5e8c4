use std::convert::TryInto;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, Request, Url};
use reqwest::header::{CONTENT_TYPE, USER_AGENT, HeaderMap};
use serde_json::{json, Map, Value};
use super::{Message, Transport};

pub struct SlackClient {
    client:   HttpClient,
    endpoint: Url,
}

impl SlackClient {
    pub fn new(endpoint: Url) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".try_into()?);
        headers.insert(USER_AGENT, env!("CARGO_PKG_NAME").try_into()?);

        let client = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Transport for SlackClient {
    async fn send(&self, message: Message) -> Result<()> {
        let payload = payload(&message);

        let endpoint = self.endpoint.clone();
        let mut req  = Request::new(Method::POST, endpoint);
        *req.body_mut() = Some(serde_json::to_vec(&payload)?.into());

        let res = self.client.execute(req).await?;

        if !res.status().is_success() {
            let status = res.status();
            let body   = res.text().await?;
            return Err(anyhow!("webhook returned {}: {}", status, body));
        }

        Ok(())
    }
}

pub fn payload(message: &Message) -> Value {
    let fields = message.fields.iter().map(|f| {
        json!({
            "title": f.title,
            "value": f.value,
            "short": true,
        })
    }).collect::<Vec<_>>();

    let mut attachment = Map::new();
    attachment.insert("fallback".to_owned(), json!(message.fallback));
    attachment.insert("fields".to_owned(), json!(fields));

    if let Some(color) = message.color {
        attachment.insert("color".to_owned(), json!(color));
    }

    let mut payload = Map::new();
    payload.insert("username".to_owned(), json!(message.username));
    payload.insert("text".to_owned(), json!(message.text));
    payload.insert("attachments".to_owned(), json!([attachment]));

    if !message.channel.is_empty() {
        payload.insert("channel".to_owned(), json!(message.channel));
    }

    if let Some(icon) = message.icon {
        payload.insert("icon_emoji".to_owned(), json!(icon));
    }

    Value::Object(payload)
}
