//! Catchup URL template substitution
//!
//! Providers hardcode these token names in `catchup-source` templates:
//!
//! | token         | value                                   |
//! |---------------|-----------------------------------------|
//! | `{utc}`       | programme start, epoch seconds          |
//! | `{lutc}`      | programme end, epoch seconds            |
//! | `{start}`     | programme start, epoch seconds          |
//! | `{end}`       | programme end, epoch seconds            |
//! | `{duration}`  | end - start, seconds                    |
//! | `{timestamp}` | now (start for Flussonic-style sources) |
//! | `{offset}`    | now - start, seconds                    |
//! | `{Y}` ... `{S}` | zero-padded calendar parts of start   |

/// Ordered token/value pairs for one substitution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: Vec<(&'static str, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: &'static str, value: impl ToString) -> Self {
        self.values.push((token, value.to_string()));
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every literal `{token}`; unknown tokens stay as they are
    pub fn apply(&self, template: &str) -> String {
        self.values
            .iter()
            .fold(template.to_string(), |acc, (token, value)| {
                acc.replace(&format!("{{{token}}}"), value)
            })
    }
}
