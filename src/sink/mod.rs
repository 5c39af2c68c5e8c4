use anyhow::Result;
use async_trait::async_trait;

pub use slack::SlackClient;

mod slack;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub channel:  String,
    pub username: String,
    pub icon:     Option<&'static str>,
    pub color:    Option<&'static str>,
    pub text:     String,
    pub fallback: String,
    pub fields:   Vec<Field>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub title: &'static str,
    pub value: String,
}

impl Message {
    pub fn field(&self, title: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.title == title).map(|f| f.value.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
}
