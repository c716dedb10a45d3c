//! The parsed, immutable form of a cURL invocation.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An HTTP verb. `-X/--request` overrides the method unconditionally, with
/// no restriction to a fixed verb set (the original passes `method`
/// straight through to its HTTP client with no whitelist), so anything
/// outside the common set is carried verbatim in `Other` rather than
/// collapsed to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Other(String),
}

impl HttpMethod {
    #[must_use]
    pub fn parse(verb: &str) -> Self {
        let upper = verb.to_ascii_uppercase();
        match upper.as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(upper),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(verb) => verb.as_str(),
        }
    }
}

/// Serialized as the plain verb string (`"GET"`, `"PURGE"`, ...) and
/// deserialized through [`HttpMethod::parse`], so the round trip
/// faithfully preserves verbs outside the common set.
impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(HttpMethod::parse(&raw))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// The structured output of the cURL template parser (C1). Insertion order
/// of `headers`/`cookies` is preserved, matching the original's use of
/// Python's insertion-ordered `dict`.
///
/// `Serialize`/`Deserialize` give the embedding server SSE/JSON-ready access
/// to a parsed template; `max_time` goes through [`duration_secs`] since
/// `Duration` has no `serde` impl of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub auth: Option<BasicAuth>,
    #[serde(with = "duration_secs")]
    pub max_time: Option<Duration>,
    pub verify_tls: bool,
}

impl RequestTemplate {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// `Option<Duration>` as fractional seconds, the only shape `serde_json`
/// needs for `max_time` on the wire.
mod duration_secs {
    use super::{Deserialize, Deserializer, Duration, Serialize, Serializer};

    /// # Errors
    ///
    /// Returns an error if the underlying `Serializer` does.
    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(Duration::as_secs_f64).serialize(serializer)
    }

    /// # Errors
    ///
    /// Returns an error if the underlying `Deserializer` does.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let seconds = Option::<f64>::deserialize(deserializer)?;
        Ok(seconds.map(Duration::from_secs_f64))
    }
}
