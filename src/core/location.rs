//! Address handling for share links.
//!
//! A [`Location`] is whatever shows the current address to the user. Reading the
//! snapshot parameter and stripping it after a decision go through this trait so the
//! bootstrap never navigates or reloads anything itself.

use crate::errors::{Error, Result};

/// Read access to query parameters plus in-place removal.
pub trait Location {
    /// First value of the query parameter `name`, if present.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Removes every occurrence of `name` from the visible address, leaving the
    /// rest of the address as it was.
    fn strip_query_param(&mut self, name: &str);
}

/// A parsed URL split into base, decoded query pairs, and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBar {
    base: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl AddressBar {
    /// Parses `url`. Only the query is decoded; base and fragment are kept verbatim.
    pub fn parse(url: &str) -> Result<Self> {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };
        let (base, query) = match rest.split_once('?') {
            Some((base, query)) => (base, query),
            None => (rest, ""),
        };

        let query: Vec<(String, String)> =
            serde_urlencoded::from_str(query).map_err(|e| Error::Address {
                message: e.to_string(),
            })?;

        Ok(Self {
            base: base.to_string(),
            query,
            fragment,
        })
    }

    /// Sets `name` to `value`, replacing any existing occurrences.
    pub fn set_query_param(&mut self, name: &str, value: impl Into<String>) {
        self.strip_query_param(name);
        self.query.push((name.to_string(), value.into()));
    }

    /// The full address as text.
    pub fn href(&self) -> Result<String> {
        let mut href = self.base.clone();
        if !self.query.is_empty() {
            let encoded =
                serde_urlencoded::to_string(&self.query).map_err(|e| Error::Address {
                    message: e.to_string(),
                })?;
            href.push('?');
            href.push_str(&encoded);
        }
        if let Some(fragment) = &self.fragment {
            href.push('#');
            href.push_str(fragment);
        }
        Ok(href)
    }
}

impl Location for AddressBar {
    fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn strip_query_param(&mut self, name: &str) {
        self.query.retain(|(key, _)| key != name);
    }
}
