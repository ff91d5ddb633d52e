use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openiptv::{
    catchup::CatchupResolver,
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    country::{group_channels_by_country, sort_countries},
    epg::{EpgGuide, parse_xmltv},
    models::{Channel, EpgProgram},
    parser::parse_playlist_with,
    sources::{HttpFetcher, TextFetcher},
    utils::{system_clock, url::UrlUtils},
};

#[derive(Parser)]
#[command(name = "openiptv")]
#[command(version)]
#[command(about = "Inspect IPTV playlists, XMLTV guides and catchup URLs")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a playlist and summarise it
    Parse {
        /// Playlist file path or http(s) URL
        source: String,
        /// Print every channel instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Build the catchup URL for a past programme
    Catchup {
        /// Playlist file path or http(s) URL
        source: String,
        /// Channel name
        #[arg(long)]
        channel: String,
        /// Programme start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Programme end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
    },
    /// Show now/next and today's schedule for a channel
    Epg {
        /// XMLTV file path or http(s) URL
        source: String,
        /// Channel display name
        #[arg(long)]
        channel: String,
    },
    /// Group playlist channels by country
    Countries {
        /// Playlist file path or http(s) URL
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("openiptv={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load_from_file(&cli.config)?;
    config.validate()?;
    info!("Configuration loaded from: {}", cli.config);

    let fetcher = HttpFetcher::from_config(&config.fetch)?;
    let options = config.catchup.parser_options();

    match cli.command {
        Command::Parse { source, json } => {
            let content = read_source(&fetcher, &source).await?;
            let result = parse_playlist_with(&content, &options);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let vod = result.channels.iter().filter(|c| c.is_vod == Some(true)).count();
                let summary = json!({
                    "totalParsed": result.total_parsed,
                    "catchupChannels": result.catchup_channels,
                    "vodChannels": vod,
                    "errors": result.errors,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Command::Catchup {
            source,
            channel,
            start,
            end,
        } => {
            if end <= start {
                bail!("--end must be after --start");
            }
            let content = read_source(&fetcher, &source).await?;
            let result = parse_playlist_with(&content, &options);
            let channel = find_channel(&result.channels, &channel)
                .with_context(|| format!("No channel named '{channel}' in playlist"))?;

            let resolver = CatchupResolver::new(system_clock(), config.catchup.zone()?);
            let program = EpgProgram::window(&channel.name, start, end);
            let output = json!({
                "channel": channel.name,
                "catchup": resolver.format_catchup_info(channel),
                "available": resolver.is_program_available(channel, &program),
                "url": resolver.build_catchup_url(channel, &program),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Epg { source, channel } => {
            let content = read_source(&fetcher, &source).await?;
            let zone = config.catchup.zone()?;
            let mut guide = EpgGuide::new(system_clock(), zone);
            guide.load(parse_xmltv(&content, &zone)?);

            let Some(found) = guide.find_channel(&channel) else {
                bail!("No guide channel matches '{channel}'");
            };
            let (current, next) = guide.current_program(&channel);
            let output = json!({
                "channel": found.name,
                "current": current,
                "progress": current.map(|p| guide.program_progress(p)),
                "remaining": current.map(|p| guide.time_remaining(p)),
                "next": next,
                "today": guide.today_schedule(&channel),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Countries { source } => {
            let content = read_source(&fetcher, &source).await?;
            let result = parse_playlist_with(&content, &options);
            let grouped = group_channels_by_country(&result.channels);
            for group in sort_countries(grouped, config.display.priority_countries.as_slice()) {
                println!(
                    "{} {} ({}): {}",
                    group.country.flag,
                    group.country.name,
                    group.country.code,
                    group.channels.len()
                );
            }
        }
    }

    Ok(())
}

async fn read_source(fetcher: &HttpFetcher, source: &str) -> Result<String> {
    if UrlUtils::is_http(source) {
        return Ok(fetcher.fetch_text(source).await?);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {source}"))
}

fn find_channel<'a>(channels: &'a [Channel], name: &str) -> Option<&'a Channel> {
    let wanted = name.trim().to_lowercase();
    channels
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .or_else(|| channels.iter().find(|c| c.name.to_lowercase().contains(&wanted)))
}
