//! Electronic programme guide
//!
//! [`parse_xmltv`] turns an XMLTV document into [`EpgData`]; [`EpgGuide`]
//! answers the schedule questions a player asks about it.

pub mod guide;

pub use guide::{EpgGuide, TodaySchedule};

use std::collections::HashMap;
use tracing::{debug, info};

use crate::errors::AppResult;
use crate::models::{EpgChannel, EpgData, EpgProgram};
use crate::utils::time::{LocalZone, parse_xmltv_timestamp};
use crate::utils::xmltv_parser::{XmltvChannel, read_xmltv};

/// Parse an XMLTV document.
///
/// Timestamps without an explicit offset are read as wall-clock time in
/// `zone`. Channels without an id or display name, and programmes that
/// are incomplete, unparseable or point at an unknown channel, are
/// skipped. Only channels that end up with programmes are returned.
pub fn parse_xmltv(xml: &str, zone: &LocalZone) -> AppResult<EpgData> {
    let document = read_xmltv(xml)?;

    let mut known: HashMap<String, XmltvChannel> = HashMap::new();
    for channel in document.channels {
        if let Some(id) = channel.id.clone().filter(|id| !id.is_empty())
            && channel.display_name.is_some()
        {
            known.insert(id, channel);
        }
    }

    let mut data = EpgData::new();
    let mut skipped = 0usize;

    for programme in document.programmes {
        let (Some(channel_id), Some(start_raw), Some(stop_raw), Some(title)) = (
            programme.channel.filter(|c| !c.is_empty()),
            programme.start.filter(|s| !s.is_empty()),
            programme.stop.filter(|s| !s.is_empty()),
            programme.title,
        ) else {
            skipped += 1;
            continue;
        };

        let Some(channel) = known.get(&channel_id) else {
            skipped += 1;
            continue;
        };

        let (Some(start), Some(end)) = (
            parse_xmltv_timestamp(&start_raw, zone),
            parse_xmltv_timestamp(&stop_raw, zone),
        ) else {
            debug!(
                "Skipping programme '{}' on {} with unreadable times '{}'/'{}'",
                title, channel_id, start_raw, stop_raw
            );
            skipped += 1;
            continue;
        };

        let entry = data.entry(channel_id.clone()).or_insert_with(|| EpgChannel {
            id: channel_id.clone(),
            name: channel.display_name.clone().unwrap_or_default(),
            icon: channel.icon.clone(),
            programs: Vec::new(),
        });

        entry.programs.push(EpgProgram {
            id: format!("{channel_id}_{start_raw}"),
            channel_id,
            title,
            description: programme.description,
            start,
            end,
            category: programme.category,
            rating: programme.rating,
            image: programme.icon,
        });
    }

    let mut total = 0usize;
    for channel in data.values_mut() {
        channel.programs.sort_by_key(|p| p.start);
        total += channel.programs.len();
    }

    if skipped > 0 {
        debug!("Skipped {} XMLTV programmes", skipped);
    }
    info!("Parsed XMLTV guide: {} channels, {} programmes", data.len(), total);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use chrono::{TimeZone, Utc};

    fn utc() -> LocalZone {
        LocalZone::Named(chrono_tz::UTC)
    }

    #[test]
    fn test_parse_sorts_and_filters() {
        let xml = r#"<tv>
  <channel id="a"><display-name>Alpha</display-name></channel>
  <channel id="b"><display-name>Beta</display-name></channel>
  <channel id="noname"></channel>
  <programme channel="a" start="20240101130000 +0000" stop="20240101140000 +0000"><title>Second</title></programme>
  <programme channel="a" start="20240101120000 +0000" stop="20240101130000 +0000"><title>First</title></programme>
  <programme channel="a" start="20240101150000 +0000" stop="20240101160000 +0000"></programme>
  <programme channel="noname" start="20240101120000" stop="20240101130000"><title>Orphan</title></programme>
  <programme channel="ghost" start="20240101120000" stop="20240101130000"><title>Ghost</title></programme>
  <programme channel="a" start="garbage" stop="20240101130000"><title>Bad time</title></programme>
</tv>"#;

        let data = parse_xmltv(xml, &utc()).unwrap();
        assert_eq!(data.len(), 1, "channel b has no programmes");

        let alpha = &data["a"];
        assert_eq!(alpha.name, "Alpha");
        let titles: Vec<_> = alpha.programs.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
        assert_eq!(alpha.programs[0].id, "a_20240101120000 +0000");
        assert_eq!(alpha.programs[0].channel_id, "a");
    }

    #[test]
    fn test_offsets_and_configured_zone() {
        let xml = r#"<tv>
  <channel id="a"><display-name>Alpha</display-name></channel>
  <programme channel="a" start="20240101120000 +0300" stop="20240101130000 +0300"><title>Offset</title></programme>
  <programme channel="a" start="20240701120000" stop="20240701130000"><title>Local</title></programme>
</tv>"#;

        let zone = LocalZone::Named(chrono_tz::Europe::London);
        let data = parse_xmltv(xml, &zone).unwrap();
        let programs = &data["a"].programs;

        assert_eq!(programs[0].start, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        // London is on BST in July
        assert_eq!(programs[1].start, Utc.with_ymd_and_hms(2024, 7, 1, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_xmltv("<tv><programme></tv>", &utc()).unwrap_err();
        assert!(matches!(err, AppError::Xmltv { .. }));
    }
}
