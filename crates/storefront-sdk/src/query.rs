//! Query-string construction
//!
//! Parameters are typed structs; `None` fields are left out and everything
//! else is form-urlencoded.

use serde::Serialize;

use crate::error::{Error, Result};

/// Page selection shared by most listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Paging<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<&'a str>,
    pub page: u32,
    pub size: u32,
}

impl<'a> Paging<'a> {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            lang: None,
            page,
            size,
        }
    }

    pub fn with_lang(mut self, lang: &'a str) -> Self {
        self.lang = Some(lang);
        self
    }
}

/// Append `params` to `path` as a query string.
pub fn with_query<T: Serialize + ?Sized>(path: &str, params: &T) -> Result<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| Error::Validation(format!("encoding query for {path}: {e}")))?;
    if query.is_empty() {
        Ok(path.to_owned())
    } else {
        Ok(format!("{path}?{query}"))
    }
}
