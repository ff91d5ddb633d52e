use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{EpgChannel, EpgData, EpgProgram};
use crate::utils::clock::{Clock, system_clock};
use crate::utils::time::{LocalZone, days_before, format_duration, format_remaining, format_time_ago};

/// Today's programmes split around "now"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodaySchedule<'a> {
    pub past: Vec<&'a EpgProgram>,
    pub current: Option<&'a EpgProgram>,
    pub upcoming: Vec<&'a EpgProgram>,
}

/// Queryable programme guide.
///
/// Channels are looked up by display name, so the names of playlist
/// channels can be used directly. Day boundaries are taken in the guide's
/// [`LocalZone`].
#[derive(Debug, Clone)]
pub struct EpgGuide {
    data: EpgData,
    clock: Arc<dyn Clock>,
    zone: LocalZone,
}

impl Default for EpgGuide {
    fn default() -> Self {
        Self::new(system_clock(), LocalZone::System)
    }
}

impl EpgGuide {
    pub fn new(clock: Arc<dyn Clock>, zone: LocalZone) -> Self {
        Self {
            data: EpgData::new(),
            clock,
            zone,
        }
    }

    /// Replace the guide contents
    pub fn load(&mut self, data: EpgData) {
        self.data = data;
    }

    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Case-insensitive lookup: an exact name first, then a name that
    /// contains the query or is contained in it
    pub fn find_channel(&self, name: &str) -> Option<&EpgChannel> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        self.data
            .values()
            .find(|c| c.name.to_lowercase() == wanted)
            .or_else(|| {
                self.data.values().find(|c| {
                    let candidate = c.name.to_lowercase();
                    candidate.contains(&wanted) || wanted.contains(&candidate)
                })
            })
    }

    /// The programme on air and the one after it
    pub fn current_program(&self, name: &str) -> (Option<&EpgProgram>, Option<&EpgProgram>) {
        let Some(channel) = self.find_channel(name) else {
            return (None, None);
        };
        let now = self.clock.now();

        for (i, program) in channel.programs.iter().enumerate() {
            if program.start <= now && program.end > now {
                return (Some(program), channel.programs.get(i + 1));
            }
            if program.start > now {
                return (None, Some(program));
            }
        }
        (None, None)
    }

    /// Programmes that start or end within the given local calendar day
    pub fn programs_for_date(&self, name: &str, date: NaiveDate) -> Vec<&EpgProgram> {
        let Some(channel) = self.find_channel(name) else {
            return Vec::new();
        };
        let (day_start, day_end) = self.zone.day_bounds(date);
        let within = |t: DateTime<Utc>| t >= day_start && t < day_end;

        channel
            .programs
            .iter()
            .filter(|p| within(p.start) || within(p.end))
            .collect()
    }

    /// Ended programmes from the last `days` days, most recent first
    pub fn past_programs(&self, name: &str, days: u32) -> Vec<&EpgProgram> {
        let Some(channel) = self.find_channel(name) else {
            return Vec::new();
        };
        let now = self.clock.now();
        let cutoff = days_before(now, days);

        let mut programs: Vec<_> = channel
            .programs
            .iter()
            .filter(|p| p.end < now && cutoff.is_none_or(|cutoff| p.end > cutoff))
            .collect();
        programs.sort_by(|a, b| b.start.cmp(&a.start));
        programs
    }

    /// Programmes overlapping `[from, to)`, in start order
    pub fn programs_in_range(
        &self,
        name: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&EpgProgram> {
        let Some(channel) = self.find_channel(name) else {
            return Vec::new();
        };
        channel
            .programs
            .iter()
            .filter(|p| p.start < to && p.end > from)
            .collect()
    }

    pub fn today_schedule(&self, name: &str) -> TodaySchedule<'_> {
        let now = self.clock.now();
        let (day_start, day_end) = self.zone.day_bounds(self.zone.date_of(now));

        let mut schedule = TodaySchedule::default();
        for program in self.programs_in_range(name, day_start, day_end) {
            if program.end <= now {
                schedule.past.push(program);
            } else if program.start <= now {
                schedule.current = Some(program);
            } else {
                schedule.upcoming.push(program);
            }
        }
        schedule
    }

    /// Elapsed share of a programme in percent, clamped to `0..=100`
    pub fn program_progress(&self, program: &EpgProgram) -> f64 {
        let now = self.clock.now();
        let total = (program.end - program.start).num_milliseconds();
        if total <= 0 {
            return if now >= program.end { 100.0 } else { 0.0 };
        }
        let elapsed = (now - program.start).num_milliseconds();
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// "45 min" or "1h 5m" until the programme ends
    pub fn time_remaining(&self, program: &EpgProgram) -> String {
        format_remaining(program.end - self.clock.now())
    }

    /// "30 min", "2h" or "1h 30m"
    pub fn program_duration(&self, program: &EpgProgram) -> String {
        format_duration(program.end - program.start)
    }

    /// How long ago the programme ended
    pub fn time_ago(&self, program: &EpgProgram) -> String {
        format_time_ago(self.clock.now() - program.end)
    }
}
