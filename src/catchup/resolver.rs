use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use url::Url;

use super::Placeholders;
use crate::models::{CatchupType, Channel, EpgProgram};
use crate::utils::clock::{Clock, system_clock};
use crate::utils::time::{LocalZone, days_before};

/// The `/<file>.m3u8...` tail replaced by Flussonic-style archive paths
static PLAYLIST_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[^/]*\.m3u8.*$").expect("valid playlist tail regex"));

const XC_TIMESHIFT_PATH: &str = "/streaming/timeshift.php";

/// Builds catchup URLs and answers availability questions for programmes
#[derive(Debug, Clone)]
pub struct CatchupResolver {
    clock: Arc<dyn Clock>,
    zone: LocalZone,
}

impl Default for CatchupResolver {
    fn default() -> Self {
        Self::new(system_clock(), LocalZone::System)
    }
}

/// Epoch-second values shared by every URL scheme
struct ProgramWindow {
    start: i64,
    end: i64,
    duration: i64,
    now: i64,
    offset: i64,
}

impl CatchupResolver {
    pub fn new(clock: Arc<dyn Clock>, zone: LocalZone) -> Self {
        Self { clock, zone }
    }

    pub fn zone(&self) -> LocalZone {
        self.zone
    }

    /// Catchup descriptor present with a non-empty window
    pub fn has_catchup(&self, channel: &Channel) -> bool {
        channel.has_catchup()
    }

    pub fn catchup_days(&self, channel: &Channel) -> u32 {
        channel.catchup.as_ref().map_or(0, |c| c.days)
    }

    /// Ended, and ended inside the rolling catchup window
    pub fn is_program_available(&self, channel: &Channel, program: &EpgProgram) -> bool {
        if !self.has_catchup(channel) {
            return false;
        }

        let now = self.clock.now();
        if program.end >= now {
            return false;
        }

        days_before(now, self.catchup_days(channel)).is_none_or(|window_start| program.end > window_start)
    }

    /// `start <= now < end`
    pub fn is_live(&self, program: &EpgProgram) -> bool {
        let now = self.clock.now();
        program.start <= now && program.end > now
    }

    /// Restart a programme that is on air right now through the archive
    pub fn watch_from_start_url(&self, channel: &Channel, program: &EpgProgram) -> Option<String> {
        if !self.has_catchup(channel) || !self.is_live(program) {
            return None;
        }
        self.build_catchup_url(channel, program)
    }

    /// Oldest instant still inside the channel's catchup window; a window
    /// reaching past the representable range starts at [`DateTime::<Utc>::MIN_UTC`]
    pub fn earliest_catchup_time(&self, channel: &Channel) -> Option<DateTime<Utc>> {
        if !self.has_catchup(channel) {
            return None;
        }
        Some(days_before(self.clock.now(), self.catchup_days(channel)).unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// "1 day catchup", "7 days catchup", or empty without catchup
    pub fn format_catchup_info(&self, channel: &Channel) -> String {
        if !self.has_catchup(channel) {
            return String::new();
        }
        match self.catchup_days(channel) {
            1 => "1 day catchup".to_string(),
            days => format!("{days} days catchup"),
        }
    }

    /// Resolve the archive URL for `program` on `channel`.
    ///
    /// `None` means no URL can be built: no descriptor, an unknown provider
    /// convention, or an XC live URL that does not parse.
    pub fn build_catchup_url(&self, channel: &Channel, program: &EpgProgram) -> Option<String> {
        let catchup = channel.catchup.as_ref()?;
        let live_url = channel.url.as_str();
        let source = catchup.source.as_deref();
        let window = self.window(program);

        let url = match &catchup.kind {
            CatchupType::Default => match source {
                Some(template) => self.full_placeholders(&window, program).apply(template),
                None => format!("{live_url}?utc={}&lutc={}", window.start, window.end),
            },
            CatchupType::Append => {
                let separator = if live_url.contains('?') { '&' } else { '?' };
                format!("{live_url}{separator}utc={}&lutc={}", window.start, window.end)
            }
            CatchupType::Shift | CatchupType::Flussonic | CatchupType::Fs => match source {
                Some(template) => self.flussonic_placeholders(&window, program).apply(template),
                None => {
                    let base = PLAYLIST_TAIL.replace(live_url, "");
                    format!("{base}/timeshift_abs-{}.m3u8", window.start)
                }
            },
            CatchupType::Xc => match source {
                Some(template) => self.xc_placeholders(&window, program).apply(template),
                None => xc_timeshift_url(live_url, &window)?,
            },
            CatchupType::Vod => source.unwrap_or(live_url).to_string(),
            CatchupType::Other(kind) => {
                debug!("No catchup URL scheme for type '{}' on '{}'", kind, channel.name);
                return None;
            }
        };

        Some(url)
    }

    fn window(&self, program: &EpgProgram) -> ProgramWindow {
        let start = program.start.timestamp();
        let end = program.end.timestamp();
        let now = self.clock.now().timestamp();
        ProgramWindow {
            start,
            end,
            duration: end - start,
            now,
            offset: now - start,
        }
    }

    fn calendar(&self, program: &EpgProgram, values: Placeholders) -> Placeholders {
        let parts = self.zone.calendar_parts(program.start);
        values
            .with("Y", parts.year)
            .with("m", parts.month)
            .with("d", parts.day)
            .with("H", parts.hour)
            .with("M", parts.minute)
            .with("S", parts.second)
    }

    fn full_placeholders(&self, w: &ProgramWindow, program: &EpgProgram) -> Placeholders {
        let values = Placeholders::new()
            .with("utc", w.start)
            .with("lutc", w.end)
            .with("start", w.start)
            .with("end", w.end)
            .with("duration", w.duration)
            .with("timestamp", w.now)
            .with("offset", w.offset);
        self.calendar(program, values)
    }

    /// Flussonic archives address by programme start, so `{timestamp}` is
    /// the start and `{offset}` is not offered
    fn flussonic_placeholders(&self, w: &ProgramWindow, program: &EpgProgram) -> Placeholders {
        let values = Placeholders::new()
            .with("utc", w.start)
            .with("lutc", w.end)
            .with("start", w.start)
            .with("end", w.end)
            .with("duration", w.duration)
            .with("timestamp", w.start);
        self.calendar(program, values)
    }

    fn xc_placeholders(&self, w: &ProgramWindow, program: &EpgProgram) -> Placeholders {
        let values = Placeholders::new()
            .with("utc", w.start)
            .with("start", w.start)
            .with("duration", w.duration);
        self.calendar(program, values)
    }
}

/// Rewrite an Xtream Codes live URL into its timeshift endpoint
fn xc_timeshift_url(live_url: &str, w: &ProgramWindow) -> Option<String> {
    let mut url = match Url::parse(live_url) {
        Ok(url) => url,
        Err(e) => {
            debug!("Cannot build XC timeshift URL from '{}': {}", live_url, e);
            return None;
        }
    };

    url.set_path(XC_TIMESHIFT_PATH);

    // Existing keys keep their position, repeats are dropped, missing ones go last
    let mut replacements = [
        ("start", Some(w.start.to_string())),
        ("duration", Some(w.duration.to_string())),
    ];
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        match replacements.iter_mut().find(|(name, _)| *name == key) {
            Some((name, replacement)) => {
                if let Some(value) = replacement.take() {
                    pairs.push((name.to_string(), value));
                }
            }
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }
    for (name, replacement) in replacements {
        if let Some(value) = replacement {
            pairs.push((name.to_string(), value));
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);

    Some(url.to_string())
}
