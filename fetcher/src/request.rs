use std::fmt::{Display, Formatter, Result as FmtResult};

use sha2::{Digest, Sha256};

/// A GET for one image URL with its extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
}

/// Identity of a request for response caching: URL and headers.
/// Header names are compared case-insensitively and their order is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint(String);

pub struct RequestBuilder {
    request: Request,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn fingerprint(&self) -> RequestFingerprint {
        let mut headers: Vec<(String, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.as_str()))
            .collect();
        headers.sort();

        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());

        for (key, value) in headers {
            hasher.update(b"\n");
            hasher.update(key.as_bytes());
            hasher.update(b":");
            hasher.update(value.as_bytes());
        }

        RequestFingerprint(hex::encode(hasher.finalize()))
    }
}

impl RequestFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequestFingerprint {
    fn fmt(&self, format: &mut Formatter) -> FmtResult {
        write!(format, "{}", self.0)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            request: Request::default(),
        }
    }

    pub fn set_url(mut self, url: impl Into<String>) -> Self {
        self.request.url = url.into();

        self
    }

    /// Sets a header, replacing any previous value with the same name.
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();

        self.request
            .headers
            .retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.request.headers.push((name, value.into()));

        self
    }

    pub fn set_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self = self.set_header(key, value);
        }

        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}
