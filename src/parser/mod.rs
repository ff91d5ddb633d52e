//! M3U/M3U8 playlist parsing
//!
//! A single forward pass over the playlist text. An `#EXTINF` line opens a
//! pending entry, the next stream URL line closes it and emits a
//! [`Channel`]. Everything else is skipped. Malformed entries are dropped
//! or recorded in [`ParseResult::errors`]; nothing aborts the parse.

pub mod extinf;

use tracing::{debug, info};

use crate::classification::classify_vod;
use crate::models::{Channel, DEFAULT_CATCHUP_DAYS, ParseResult};
use crate::utils::deterministic_uuid::generate_channel_id;
use crate::utils::url::UrlUtils;

pub use extinf::{EXTINF_TAG, ExtinfEntry, parse_extinf};

/// Knobs for [`parse_playlist_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Window used when a provider signals catchup without a day count
    pub default_catchup_days: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            default_catchup_days: DEFAULT_CATCHUP_DAYS,
        }
    }
}

/// Parse playlist text with default options
pub fn parse_playlist(content: &str) -> ParseResult {
    parse_playlist_with(content, &ParserOptions::default())
}

/// Parse playlist text into channels.
///
/// `order` is the zero-based position among emitted channels, so it stays
/// contiguous however many lines were skipped or dropped.
pub fn parse_playlist_with(content: &str, options: &ParserOptions) -> ParseResult {
    let mut channels: Vec<Channel> = Vec::new();
    let mut errors = Vec::new();
    let mut pending: Option<ExtinfEntry> = None;
    let mut catchup_channels = 0;
    let mut dropped = 0usize;

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        let line_number = index + 1;

        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_TAG) {
            if pending.take().is_some() {
                dropped += 1;
                debug!("Dropping EXTINF entry without stream URL before line {}", line_number);
            }
            match parse_extinf(line, options.default_catchup_days) {
                Ok(entry) => pending = Some(entry),
                Err(e) => {
                    debug!("Failed to parse EXTINF at line {}: {}", line_number, e);
                    errors.push(format!("Error parsing line {line_number}: {e}"));
                }
            }
            continue;
        }

        if line.starts_with('#') || !UrlUtils::has_stream_scheme(line) {
            continue;
        }

        let Some(entry) = pending.take() else {
            debug!("Ignoring stream URL without EXTINF metadata at line {}", line_number);
            continue;
        };
        let Some(name) = entry.name else {
            dropped += 1;
            debug!("Dropping unnamed entry for stream URL at line {}", line_number);
            continue;
        };

        let vod = classify_vod(&name, entry.group.as_deref(), line);
        if entry.catchup.is_some() {
            catchup_channels += 1;
        }

        channels.push(Channel {
            id: generate_channel_id(&name, line),
            order: channels.len(),
            url: line.to_string(),
            logo: entry.logo,
            group: entry.group,
            tvg_id: entry.tvg_id,
            tvg_name: entry.tvg_name,
            tvg_chno: entry.tvg_chno,
            catchup: entry.catchup,
            is_vod: vod.as_ref().map(|_| true),
            vod_type: vod.as_ref().and_then(|v| v.vod_type),
            series_info: vod.and_then(|v| v.series_info),
            is_favorite: false,
            is_hidden: false,
            name,
        });
    }

    if pending.is_some() {
        dropped += 1;
    }

    info!(
        "Parsed {} channels ({} with catchup, {} dropped, {} errors)",
        channels.len(),
        catchup_channels,
        dropped,
        errors.len()
    );

    ParseResult {
        total_parsed: channels.len(),
        channels,
        errors,
        catchup_channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatchupInfo, CatchupType, VodType};

    #[test]
    fn test_bbc_scenario() {
        let playlist = "#EXTM3U\n\
            #EXTINF:-1 tvg-name=\"BBC\" group-title=\"UK News\" catchup=\"default\" catchup-days=\"3\",BBC News\n\
            http://example.com/bbc.m3u8\n";

        let result = parse_playlist(playlist);

        assert_eq!(result.total_parsed, 1);
        assert_eq!(result.catchup_channels, 1);
        assert!(result.errors.is_empty());

        let channel = &result.channels[0];
        assert_eq!(channel.name, "BBC News");
        assert_eq!(channel.tvg_name.as_deref(), Some("BBC"));
        assert_eq!(channel.group.as_deref(), Some("UK News"));
        assert_eq!(channel.order, 0);
        assert_eq!(
            channel.catchup,
            Some(CatchupInfo {
                kind: CatchupType::Default,
                days: 3,
                source: None
            })
        );
        assert_eq!(channel.is_vod, None);
    }

    #[test]
    fn test_order_is_contiguous_despite_dropped_entries() {
        let playlist = "#EXTM3U\n\
            #EXTINF:-1,First\n\
            http://example.com/1.ts\n\
            #EXTINF:-1,Orphan\n\
            #EXTINF:-1 tvg-id=\"x\",\n\
            http://example.com/unnamed.ts\n\
            http://example.com/stray.ts\n\
            #EXTINF:-1,Second\n\
            # a comment between metadata and url\n\
            http://example.com/2.ts\n\
            #EXTINF:-1,Trailing\n";

        let result = parse_playlist(playlist);

        let names: Vec<_> = result.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        let orders: Vec<_> = result.channels.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_errors_are_recorded_with_line_numbers() {
        let playlist = "#EXTM3U\n\
            #EXTINF-1,Broken\n\
            http://example.com/broken.ts\n\
            #EXTINF:-1,Fine\n\
            http://example.com/fine.ts\n\
            #EXTINFO:-1,Also broken\n\
            http://example.com/also.ts\n";

        let result = parse_playlist(playlist);

        assert_eq!(result.total_parsed, 1);
        assert_eq!(result.channels[0].name, "Fine");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("Error parsing line 2:"));
        assert!(result.errors[1].starts_with("Error parsing line 6:"));
    }

    #[test]
    fn test_loosely_formatted_extinf_lines() {
        let playlist = "#EXTM3U\n\
            #EXTINF -1 tvg-id=\"a\",Spaced\n\
            http://example.com/spaced.ts\n\
            #EXTINF:-1 tvg-id=\"b\"tvg-name=\"Packed\",\n\
            http://example.com/packed.ts\n";

        let result = parse_playlist(playlist);

        assert!(result.errors.is_empty());
        let names: Vec<_> = result.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Spaced", "Packed"]);
        assert_eq!(result.channels[1].tvg_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_non_stream_lines_are_ignored() {
        let playlist = "#EXTINF:-1,Local\n\
            /media/local.ts\n\
            ftp://example.com/a.ts\n\
            RTSP://camera.local/feed\n";

        let result = parse_playlist(playlist);

        assert_eq!(result.total_parsed, 1);
        assert_eq!(result.channels[0].url, "RTSP://camera.local/feed");
    }

    #[test]
    fn test_ids_are_stable_across_parses() {
        let playlist = "#EXTINF:-1,A\nhttp://example.com/a.ts\n#EXTINF:-1,B\nhttp://example.com/b.ts\n";
        let first = parse_playlist(playlist);
        let second = parse_playlist(&format!("#EXTM3U\n\n{playlist}"));

        assert_eq!(first.channels[0].id, second.channels[0].id);
        assert_eq!(first.channels[1].id, second.channels[1].id);
        assert_ne!(first.channels[0].id, first.channels[1].id);
    }

    #[test]
    fn test_vod_fields_are_merged() {
        let playlist = "#EXTINF:-1 group-title=\"TV Series\",Breaking Bad S01E05\n\
            http://example.com/series/u/p/1.mkv\n";

        let channel = &parse_playlist(playlist).channels[0];

        assert_eq!(channel.is_vod, Some(true));
        assert_eq!(channel.vod_type, Some(VodType::Episode));
        let info = channel.series_info.as_ref().unwrap();
        assert_eq!(info.name, "Breaking Bad");
        assert_eq!((info.season, info.episode), (Some(1), Some(5)));
    }

    #[test]
    fn test_crlf_and_whitespace() {
        let playlist = "#EXTM3U\r\n  #EXTINF:-1,Padded  \r\n  http://example.com/p.ts  \r\n";
        let result = parse_playlist(playlist);
        assert_eq!(result.channels[0].name, "Padded");
        assert_eq!(result.channels[0].url, "http://example.com/p.ts");
    }

    #[test]
    fn test_empty_input_is_a_successful_parse() {
        let result = parse_playlist("");
        assert_eq!(result.total_parsed, 0);
        assert!(result.errors.is_empty());
    }
}
