//! cURL template parser (C1): turns tokenized cURL argv into a
//! [`RequestTemplate`]. A straight structural port of
//! `curlparser.parser.parse` (see `original_source/curlparser/parser.py`),
//! expressed as a hand-rolled token scanner rather than `clap` since the
//! grammar is free-form cURL syntax, not a fixed CLI schema.

use std::time::Duration;

use url::Url;

use crate::error::CurlError;

use super::template::{BasicAuth, HttpMethod, RequestTemplate};
use super::tokenize::tokenize;

/// Parses the raw text of a cURL invocation into a [`RequestTemplate`].
///
/// # Errors
///
/// Returns [`CurlError`] when the command cannot be tokenized, does not
/// start with `curl`, or the URL is missing/invalid.
pub fn parse_curl(raw: &str) -> Result<RequestTemplate, CurlError> {
    let tokens = tokenize(raw)?;
    let mut iter = tokens.iter();

    let command = iter.next().ok_or(CurlError::EmptyCommand)?;
    if command != "curl" {
        return Err(CurlError::NotCurl {
            found: command.clone(),
        });
    }

    let mut url: Option<String> = None;
    let mut explicit_method: Option<String> = None;
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut cookies: Vec<(String, String)> = Vec::new();
    let mut body: Option<String> = None;
    let mut auth: Option<BasicAuth> = None;
    let mut user_agent: Option<String> = None;
    let mut max_time: Option<Duration> = None;
    let mut insecure = false;

    while let Some(token) = iter.next() {
        match token.as_str() {
            "-X" | "--request" => {
                explicit_method = Some(take_value(&mut iter, token)?);
            }
            "-H" | "--header" => {
                let raw_header = take_value(&mut iter, token)?;
                if let Some((key, value)) = raw_header.split_once(':') {
                    headers.push((key.trim().to_owned(), value.trim().to_owned()));
                }
            }
            "-b" | "--cookie" => {
                let raw_cookie = take_value(&mut iter, token)?;
                if let Some((key, value)) = raw_cookie.split_once('=') {
                    cookies.push((key.trim().to_owned(), value.trim().to_owned()));
                }
            }
            "-d" | "--data" | "--data-ascii" | "--data-binary" | "--data-raw" => {
                body = Some(take_value(&mut iter, token)?);
            }
            "-u" | "--user" => {
                let raw_user = take_value(&mut iter, token)?;
                auth = Some(match raw_user.split_once(':') {
                    Some((username, password)) => BasicAuth {
                        username: username.to_owned(),
                        password: password.to_owned(),
                    },
                    None => BasicAuth {
                        username: raw_user,
                        password: String::new(),
                    },
                });
            }
            "-A" | "--user-agent" => {
                user_agent = Some(take_value(&mut iter, token)?);
            }
            "-m" | "--max-time" => {
                let raw_seconds = take_value(&mut iter, token)?;
                if let Ok(seconds) = raw_seconds.parse::<f64>() {
                    max_time = Some(Duration::from_secs_f64(seconds.max(0.0)));
                }
            }
            "-k" | "--insecure" => insecure = true,
            "-s" | "--silent" | "-I" | "--head" => {}
            _ if url.is_none() => url = Some(token.clone()),
            _ => {}
        }
    }

    let url = url.ok_or(CurlError::MissingUrl)?;
    let parsed_url = Url::parse(&url).map_err(|source| CurlError::InvalidUrl {
        url: url.clone(),
        source,
    })?;
    if parsed_url.scheme().is_empty() || parsed_url.host_str().is_none() {
        return Err(CurlError::UrlMissingHost { url });
    }

    let mut method = HttpMethod::Get;
    if body.is_some() {
        method = HttpMethod::Post;
    }
    if let Some(verb) = explicit_method.as_deref() {
        method = HttpMethod::parse(verb);
    }

    if let Some(user_agent) = user_agent {
        set_header_if_absent(&mut headers, "User-Agent", user_agent);
    }

    if let Some(raw_body) = body.as_deref() {
        let content_type = if serde_json::from_str::<serde_json::Value>(raw_body).is_ok() {
            "application/json"
        } else {
            "application/x-www-form-urlencoded"
        };
        set_header_if_absent(&mut headers, "Content-Type", content_type.to_owned());
    }

    Ok(RequestTemplate {
        method,
        url,
        headers,
        cookies,
        body: body.map(String::into_bytes),
        auth,
        max_time,
        verify_tls: !insecure,
    })
}

fn take_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String, CurlError> {
    iter.next().cloned().ok_or_else(|| CurlError::MissingFlagValue {
        flag: flag.to_owned(),
    })
}

/// An explicit `-H` always wins over a value the parser would otherwise
/// infer (`User-Agent`, `Content-Type`).
fn set_header_if_absent(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    if headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name)) {
        return;
    }
    headers.push((name.to_owned(), value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_curl_command() -> Result<(), String> {
        match parse_curl("wget http://x") {
            Err(CurlError::NotCurl { .. }) => Ok(()),
            Err(other) => Err(format!("unexpected error variant: {}", other)),
            Ok(_) => Err("expected an error".to_owned()),
        }
    }

    #[test]
    fn rejects_missing_url() {
        assert!(parse_curl("curl").is_err());
    }

    #[test]
    fn defaults_to_get_without_body() -> Result<(), String> {
        let template =
            parse_curl("curl http://example.com/ping").map_err(|err| err.to_string())?;
        if template.method != HttpMethod::Get {
            return Err("expected GET".to_owned());
        }
        if template.url != "http://example.com/ping" {
            return Err(format!("unexpected url: {}", template.url));
        }
        Ok(())
    }

    #[test]
    fn body_without_explicit_verb_implies_post() -> Result<(), String> {
        let template = parse_curl("curl -d 'hello' http://example.com")
            .map_err(|err| err.to_string())?;
        if template.method != HttpMethod::Post {
            return Err("expected POST".to_owned());
        }
        Ok(())
    }

    #[test]
    fn explicit_verb_overrides_body_inference() -> Result<(), String> {
        let template = parse_curl("curl -X PUT -d 'hello' http://example.com")
            .map_err(|err| err.to_string())?;
        if template.method != HttpMethod::Put {
            return Err("expected PUT".to_owned());
        }
        Ok(())
    }

    #[test]
    fn json_body_sets_json_content_type() -> Result<(), String> {
        let template = parse_curl(r#"curl -d '{"a":1}' http://example.com"#)
            .map_err(|err| err.to_string())?;
        if template.header("Content-Type") != Some("application/json") {
            return Err(format!("unexpected content-type: {:?}", template.header("Content-Type")));
        }
        Ok(())
    }

    #[test]
    fn non_json_body_sets_form_content_type() -> Result<(), String> {
        let template =
            parse_curl("curl -d 'a=1&b=2' http://example.com").map_err(|err| err.to_string())?;
        if template.header("Content-Type") != Some("application/x-www-form-urlencoded") {
            return Err("unexpected content-type".to_owned());
        }
        Ok(())
    }

    #[test]
    fn explicit_content_type_header_wins() -> Result<(), String> {
        let template = parse_curl(r#"curl -H 'Content-Type: text/plain' -d '{"a":1}' http://example.com"#)
            .map_err(|err| err.to_string())?;
        if template.header("Content-Type") != Some("text/plain") {
            return Err("explicit content-type header should win".to_owned());
        }
        Ok(())
    }

    #[test]
    fn malformed_headers_and_cookies_are_dropped() -> Result<(), String> {
        let template = parse_curl("curl -H 'NoColon' -b 'nopair' http://example.com")
            .map_err(|err| err.to_string())?;
        if !template.headers.is_empty() {
            return Err("malformed header should have been dropped".to_owned());
        }
        if !template.cookies.is_empty() {
            return Err("malformed cookie should have been dropped".to_owned());
        }
        Ok(())
    }

    #[test]
    fn cookie_and_header_order_is_preserved() -> Result<(), String> {
        let template = parse_curl(
            "curl -H 'A: 1' -H 'B: 2' -b 'x=1' -b 'y=2' http://example.com",
        )
        .map_err(|err| err.to_string())?;
        if template.headers != vec![("A".to_owned(), "1".to_owned()), ("B".to_owned(), "2".to_owned())] {
            return Err(format!("unexpected header order: {:?}", template.headers));
        }
        if template.cookies != vec![("x".to_owned(), "1".to_owned()), ("y".to_owned(), "2".to_owned())] {
            return Err(format!("unexpected cookie order: {:?}", template.cookies));
        }
        Ok(())
    }

    #[test]
    fn user_pass_splits_on_first_colon() -> Result<(), String> {
        let template =
            parse_curl("curl -u admin:p:w http://example.com").map_err(|err| err.to_string())?;
        let auth = template.auth.ok_or("expected auth")?;
        if auth.username != "admin" || auth.password != "p:w" {
            return Err(format!("unexpected auth split: {:?}/{:?}", auth.username, auth.password));
        }
        Ok(())
    }

    #[test]
    fn insecure_flag_disables_tls_verification() -> Result<(), String> {
        let template =
            parse_curl("curl -k http://example.com").map_err(|err| err.to_string())?;
        if template.verify_tls {
            return Err("expected verify_tls=false".to_owned());
        }
        Ok(())
    }

    #[test]
    fn max_time_is_parsed_as_seconds() -> Result<(), String> {
        let template =
            parse_curl("curl -m 5 http://example.com").map_err(|err| err.to_string())?;
        if template.max_time != Some(Duration::from_secs(5)) {
            return Err(format!("unexpected max_time: {:?}", template.max_time));
        }
        Ok(())
    }

    /// `-X/--request` overrides the method unconditionally; there is no
    /// restriction to a fixed verb set, so a verb outside the common seven
    /// must be carried through rather than silently becoming GET.
    #[test]
    fn explicit_verb_outside_the_common_set_is_preserved() -> Result<(), String> {
        let template =
            parse_curl("curl -X PURGE http://example.com").map_err(|err| err.to_string())?;
        if template.method.as_str() != "PURGE" {
            return Err(format!("expected PURGE, got {}", template.method.as_str()));
        }

        let template =
            parse_curl("curl -X PROPFIND http://example.com").map_err(|err| err.to_string())?;
        if template.method.as_str() != "PROPFIND" {
            return Err(format!("expected PROPFIND, got {}", template.method.as_str()));
        }
        Ok(())
    }
}
