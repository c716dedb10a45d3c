//! Turns raw cURL invocation text into a POSIX-shell-quoted token stream.

use crate::error::CurlError;

/// Collapses backslash-newline continuations to a single space, then splits
/// the result the way a POSIX shell would, honoring single/double quotes.
pub fn tokenize(raw: &str) -> Result<Vec<String>, CurlError> {
    let collapsed = raw.replace("\\\n", " ");
    shell_words::split(&collapsed).map_err(|source| CurlError::Tokenize { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_line_continuations() -> Result<(), String> {
        let tokens = tokenize("curl \\\n  -H 'Accept: json' \\\n  http://x")
            .map_err(|err| format!("tokenize failed: {}", err))?;
        if tokens != vec!["curl", "-H", "Accept: json", "http://x"] {
            return Err(format!("unexpected tokens: {:?}", tokens));
        }
        Ok(())
    }

    #[test]
    fn preserves_quoted_whitespace() -> Result<(), String> {
        let tokens =
            tokenize("curl -d 'a b c' http://x").map_err(|err| format!("tokenize failed: {}", err))?;
        if tokens != vec!["curl", "-d", "a b c", "http://x"] {
            return Err(format!("unexpected tokens: {:?}", tokens));
        }
        Ok(())
    }

    #[test]
    fn rejects_unterminated_quotes() {
        assert!(tokenize("curl 'unterminated").is_err());
    }
}
