//! Parsing of the monitored users list (`users.xml`).
//!
//! Two shapes are accepted inside `<users>`:
//!
//! ```xml
//! <user><email>jane@example.com</email><name>Jane Doe</name></user>
//! <user>legacy@example.com</user>
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

use super::{CalendarError, MonitoredUser};

/// Read and parse the users file. Only a missing file is an error.
pub fn load_monitored_users(path: &Path) -> Result<Vec<MonitoredUser>, CalendarError> {
    let xml = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(CalendarError::ConfigurationMissing(format!(
                "{} not found. Create it with <users><user><email>user@domain.com</email><name>Full Name</name></user></users>",
                path.display()
            )));
        }
        Err(err) => {
            return Err(CalendarError::Internal(anyhow::anyhow!(
                "Failed to read {}: {}",
                path.display(),
                err
            )));
        }
    };

    Ok(parse_users_xml(&xml))
}

#[derive(Default)]
struct UserEntry {
    email: String,
    name: String,
    plain: String,
}

impl UserEntry {
    fn finish(self) -> Option<MonitoredUser> {
        let email = match self.email.trim() {
            "" => self.plain.trim(),
            email => email,
        };
        if email.is_empty() {
            return None;
        }
        let name = self.name.trim();
        Some(MonitoredUser {
            email: email.to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
        })
    }

    fn push_text(&mut self, field: Option<&str>, text: &str) {
        match field {
            Some("email") => self.email.push_str(text),
            Some("name") => self.name.push_str(text),
            Some(_) => {}
            None => self.plain.push_str(text),
        }
    }
}

/// Parse `users.xml` content in document order, skipping entries without an
/// email. A syntax error ends parsing and keeps what was read before it.
pub fn parse_users_xml(xml: &[u8]) -> Vec<MonitoredUser> {
    // Text is trimmed per entry so entity references keep their spacing.
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut users = Vec::new();
    let mut entry: Option<UserEntry> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if local_name == "user" {
                    entry = Some(UserEntry::default());
                    field = None;
                } else if entry.is_some() && field.is_none() {
                    field = Some(local_name);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(entry) = entry.as_mut() {
                    entry.push_text(field.as_deref(), &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(entry) = entry.as_mut() {
                    entry.push_text(field.as_deref(), &String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(entry) = entry.as_mut() {
                    let resolved = match e.resolve_char_ref() {
                        Ok(Some(c)) => Some(c.to_string()),
                        _ => resolve_predefined_entity(&String::from_utf8_lossy(e))
                            .map(String::from),
                    };
                    if let Some(text) = resolved {
                        entry.push_text(field.as_deref(), &text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if local_name == "user" {
                    if let Some(user) = entry.take().and_then(UserEntry::finish) {
                        users.push(user);
                    }
                    field = None;
                } else if field.as_deref() == Some(local_name.as_str()) {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::warn!(
                    position = reader.error_position(),
                    "Stopped reading users config: {}",
                    err
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    users
}
