use std::sync::Arc;
use anyhow::Result;
use env_logger::Builder;
use gumdrop::Options;
use log::{info, LevelFilter};
use shiplift::Docker;
use tokio::io::{stdin, BufReader};
use dockwatch::config::{Config, Source};
use dockwatch::enrich::Enricher;
use dockwatch::filter::Filter;
use dockwatch::format::Formatter;
use dockwatch::notify::Notifier;
use dockwatch::pipeline::Pipeline;
use dockwatch::sink::SlackClient;
use dockwatch::source;

#[derive(Options)]
pub struct Args {
    #[options()]
    help: bool,
    #[options(count)]
    verbose: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args_default_or_exit();

    let mut builder = Builder::from_default_env();
    builder.filter(None, match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    builder.init();

    let config = Config::from_env()?;
    let docker = Arc::new(Docker::new());

    info!("{:?}", docker.version().await?);

    let formatter = Formatter {
        channel:  config.channel.clone(),
        hostname: config.hostname.clone(),
        region:   config.region.clone(),
    };

    let slack    = Arc::new(SlackClient::new(config.webhook.clone())?);
    let notifier = Notifier::new(formatter, slack, config.debounce);
    let enricher = Enricher::new(docker.clone());

    let pipeline = Arc::new(Pipeline::new(
        Filter::status(&config.status_pattern)?,
        enricher,
        Filter::name(&config.name_pattern)?,
        notifier,
    ));

    let rx = match config.source {
        Source::Docker => source::docker(docker),
        Source::Stdin  => source::decode(BufReader::new(stdin())),
    };

    info!("watching {:?} events on {}", config.source, config.hostname);

    pipeline.run(rx).await
}
