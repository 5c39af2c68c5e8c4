use chrono::{DateTime, SecondsFormat, Utc};
use crate::event::Event;
use crate::sink::{Field, Message};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Template {
    pub past:  &'static str,
    pub emoji: Option<&'static str>,
    pub color: Option<&'static str>,
}

const TEMPLATES: &[(&str, Template)] = &[
    ("start",   template("started",            ":trophy:",                  "#00FF00")),
    ("die",     template("died",               ":warning:",                 "#FF0000")),
    ("stop",    template("stopped",            ":octagonal_sign:",          "#FFA500")),
    ("restart", template("restarted",          ":arrows_counterclockwise:", "#0000FF")),
    ("kill",    template("killed",             ":skull:",                   "#FF0000")),
    ("oom",     template("ran out of memory",  ":boom:",                    "#FF0000")),
    ("destroy", template("destroyed",          ":wastebasket:",             "#808080")),
    ("pause",   Template { past: "paused",   emoji: None, color: None }),
    ("unpause", Template { past: "unpaused", emoji: None, color: None }),
];

const fn template(past: &'static str, emoji: &'static str, color: &'static str) -> Template {
    Template { past, emoji: Some(emoji), color: Some(color) }
}

impl Template {
    pub fn lookup(status: &str) -> Option<Template> {
        TEMPLATES.iter().find(|(s, _)| *s == status).map(|(_, t)| *t)
    }
}

#[derive(Clone, Debug)]
pub struct Formatter {
    pub channel:  String,
    pub hostname: String,
    pub region:   String,
}

impl Formatter {
    pub fn format(&self, event: &Event, now: DateTime<Utc>) -> Message {
        let template = Template::lookup(&event.status);

        let status    = template.map(|t| t.past).unwrap_or(event.status.as_str());
        let container = format!("docker{}", event.name());
        let image     = image(event);
        let summary   = format!("[{}] {} container {}", self.hostname, container, status.to_uppercase());

        let fields = vec![
            Field { title: "Timestamp", value: now.to_rfc3339_opts(SecondsFormat::Millis, true) },
            Field { title: "Region",    value: self.region.to_uppercase()                       },
            Field { title: "Container", value: container                                        },
            Field { title: "Image",     value: image                                            },
        ];

        Message {
            channel:  self.channel.clone(),
            username: summary.clone(),
            icon:     template.and_then(|t| t.emoji),
            color:    template.and_then(|t| t.color),
            text:     String::new(),
            fallback: summary,
            fields:   fields,
        }
    }
}

fn image(event: &Event) -> String {
    match &event.container {
        Some(c) if event.from.is_empty() => c.image.clone(),
        _                                => event.from.clone(),
    }
}
