//! Quick-XML based XMLTV reader
//!
//! Streams an XMLTV document and collects the raw `<channel>` and
//! `<programme>` records. Attribute values and text are unescaped but
//! otherwise left untouched; timestamp interpretation and validation live
//! in the EPG layer.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use crate::errors::{AppError, AppResult};

/// A `<channel>` element as written in the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmltvChannel {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub icon: Option<String>,
}

/// A `<programme>` element as written in the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmltvProgramme {
    pub channel: Option<String>,
    pub start: Option<String>,
    pub stop: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub rating: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default)]
pub struct XmltvDocument {
    pub channels: Vec<XmltvChannel>,
    pub programmes: Vec<XmltvProgramme>,
}

enum Current {
    None,
    Channel(XmltvChannel),
    Programme(XmltvProgramme),
}

/// Read every channel and programme from `content`
pub fn read_xmltv(content: &str) -> AppResult<XmltvDocument> {
    let mut reader = Reader::from_str(content);

    let mut document = XmltvDocument::default();
    let mut current = Current::None;
    let mut element_stack: Vec<String> = Vec::new();
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "channel" => {
                        let attrs = parse_attributes(e);
                        current = Current::Channel(XmltvChannel {
                            id: attrs.get("id").cloned(),
                            ..Default::default()
                        });
                    }
                    "programme" => {
                        let attrs = parse_attributes(e);
                        current = Current::Programme(XmltvProgramme {
                            channel: attrs.get("channel").cloned(),
                            start: attrs.get("start").cloned(),
                            stop: attrs.get("stop").cloned(),
                            ..Default::default()
                        });
                    }
                    "icon" => set_icon(&mut current, e),
                    _ => {}
                }

                element_stack.push(name);
                current_text.clear();
            }

            Ok(Event::End(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| AppError::xmltv(format!("Invalid UTF-8 in XML element name: {e}")))?
                    .to_string();
                element_stack.pop();
                let parent = element_stack.last().map(String::as_str);
                let text = current_text.trim();

                match (&mut current, name.as_str()) {
                    (Current::Channel(channel), "display-name") => {
                        if channel.display_name.is_none() && !text.is_empty() {
                            channel.display_name = Some(text.to_string());
                        }
                    }
                    (Current::Programme(programme), "title") => {
                        set_first(&mut programme.title, text);
                    }
                    (Current::Programme(programme), "desc") => {
                        set_first(&mut programme.description, text);
                    }
                    (Current::Programme(programme), "category") => {
                        set_first(&mut programme.category, text);
                    }
                    (Current::Programme(programme), "value") if parent == Some("rating") => {
                        set_first(&mut programme.rating, text);
                    }
                    _ => {}
                }

                if name == "channel" || name == "programme" {
                    match std::mem::replace(&mut current, Current::None) {
                        Current::Channel(channel) => document.channels.push(channel),
                        Current::Programme(programme) => document.programmes.push(programme),
                        Current::None => {}
                    }
                }

                current_text.clear();
            }

            Ok(Event::Empty(ref e)) => {
                if element_name(e)? == "icon" {
                    set_icon(&mut current, e);
                }
            }

            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|e| AppError::xmltv(format!("Invalid text in XML: {e}")))?;
                current_text.push_str(&text);
            }

            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| AppError::xmltv(format!("Invalid UTF-8 in CDATA: {e}")))?;
                current_text.push_str(text);
            }

            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    current_text.push(ch);
                } else {
                    let entity = e
                        .decode()
                        .map_err(|e| AppError::xmltv(format!("Invalid entity in XML: {e}")))?;
                    match resolve_predefined_entity(&entity) {
                        Some(resolved) => current_text.push_str(resolved),
                        None => {
                            current_text.push('&');
                            current_text.push_str(&entity);
                            current_text.push(';');
                        }
                    }
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(AppError::xmltv(format!(
                    "XML parsing error at position {}: {e}",
                    reader.error_position()
                )));
            }

            _ => {}
        }
    }

    Ok(document)
}

fn element_name(element: &BytesStart) -> AppResult<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(|e| AppError::xmltv(format!("Invalid UTF-8 in XML element name: {e}")))
}

fn set_first(slot: &mut Option<String>, text: &str) {
    if slot.is_none() && !text.is_empty() {
        *slot = Some(text.to_string());
    }
}

fn set_icon(current: &mut Current, element: &BytesStart) {
    let Some(src) = parse_attributes(element).remove("src") else {
        return;
    };
    match current {
        Current::Channel(channel) if channel.icon.is_none() => channel.icon = Some(src),
        Current::Programme(programme) if programme.icon.is_none() => programme.icon = Some(src),
        _ => {}
    }
}

/// Parse XML attributes into a HashMap, unescaping values
fn parse_attributes(element: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();

    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            let value = unescape(value).map_or_else(|_| value.to_string(), |v| v.into_owned());
            attrs.insert(key.to_string(), value);
        }
    }
    attrs
}
