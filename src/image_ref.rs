use std::borrow::Cow;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::{Error, Result};

const URL_SCHEMES: [&str; 4] = ["http", "https", "file", "blob"];

/// A reference to one wall image. Identity is the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// `data:image/...` URI carrying the encoded bytes inline.
    Inline(String),
    /// Absolute URL.
    Url(String),
    /// Bare key served from the wall's own `/images/` route.
    Key(String),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let malformed = || Error::MalformedImageRef(raw.to_string());
        if trimmed.is_empty() {
            return Err(malformed());
        }

        if let Some(rest) = trimmed.strip_prefix("data:") {
            let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;
            if !header.starts_with("image/") || payload.is_empty() {
                return Err(malformed());
            }
            return Ok(Self::Inline(trimmed.to_string()));
        }

        if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|_| malformed())?;
            if !URL_SCHEMES.contains(&url.scheme()) {
                return Err(malformed());
            }
            if matches!(url.scheme(), "http" | "https") && url.host_str().is_none() {
                return Err(malformed());
            }
            return Ok(Self::Url(trimmed.to_string()));
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(malformed());
        }
        Ok(Self::Key(trimmed.to_string()))
    }

    /// Encode `bytes` as a base64 data URI.
    pub fn inline(mime: &str, bytes: &[u8]) -> Self {
        Self::Inline(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Inline(s) | ImageRef::Url(s) | ImageRef::Key(s) => s,
        }
    }

    /// Value suitable for an `<img src>` attribute.
    pub fn src(&self) -> Cow<'_, str> {
        match self {
            ImageRef::Key(key) => Cow::Owned(format!("/images/{}", key.trim_start_matches('/'))),
            other => Cow::Borrowed(other.as_str()),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageRef::Inline(_))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_references() {
        assert!(matches!(
            ImageRef::parse("https://images.example.com/a.jpg").unwrap(),
            ImageRef::Url(_)
        ));
        assert!(matches!(
            ImageRef::parse("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            ImageRef::Inline(_)
        ));
        let key = ImageRef::parse("k3y9zq").unwrap();
        assert_eq!(key.src(), "/images/k3y9zq");
    }

    #[test]
    fn rejects_malformed_references() {
        for raw in [
            "",
            "   ",
            "data:text/plain,hello",
            "data:image/png;base64,",
            "data:image/png",
            "https://",
            "ftp://example.com/a.png",
            "two words",
        ] {
            assert!(ImageRef::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn inline_round_trips_through_parse() {
        let inline = ImageRef::inline("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(inline.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(ImageRef::parse(inline.as_str()).unwrap(), inline);
    }
}
