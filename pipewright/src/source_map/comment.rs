//! `sourceMappingURL` comments.

use std::ops::Range;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r#"(?m)(?://[#@][ \t]*sourceMappingURL=([^\s'"]+)[ \t]*\r?$)|(?:/\*[#@][ \t]*sourceMappingURL=([^\s*'"]+)[ \t]*\*/[ \t]*$)"#,
            )
            .ok()
        })
        .as_ref()
}

/// A located `sourceMappingURL` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference<'a> {
    url: &'a str,
    range: Range<usize>,
}

impl<'a> Reference<'a> {
    pub(crate) fn url(&self) -> &'a str {
        self.url
    }

    /// `text` with the comment cut out. Surrounding line breaks are kept.
    pub(crate) fn strip(&self, text: &str) -> String {
        let mut stripped = String::with_capacity(text.len() - self.range.len());
        stripped.push_str(&text[..self.range.start]);
        stripped.push_str(&text[self.range.end..]);
        stripped
    }
}

/// The trailing `sourceMappingURL` comment of `text`, if any.
///
/// Only the last such comment counts, and only when nothing but blank
/// lines and other comment lines follow it.
pub(crate) fn find_reference(text: &str) -> Option<Reference<'_>> {
    let captures = pattern()?.captures_iter(text).last()?;
    let whole = captures.get(0)?;
    if !only_comments(&text[whole.end()..]) {
        return None;
    }
    let url = captures.get(1).or_else(|| captures.get(2))?;
    Some(Reference {
        url: url.as_str(),
        range: whole.range(),
    })
}

fn only_comments(rest: &str) -> bool {
    rest.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with("//") || (line.starts_with("/*") && line.ends_with("*/"))
    })
}

/// Decode a `data:` URL.
///
/// Returns `None` if `url` is not a data URL at all, and the decoding
/// failure as a message if it is one but cannot be read.
pub(crate) fn decode_data_url(url: &str) -> Option<Result<String, String>> {
    let rest = url.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err("data URL has no payload".to_string()));
    };
    if !header.split(';').any(|part| part == "base64") {
        return Some(Ok(payload.to_string()));
    }
    Some(
        STANDARD
            .decode(payload)
            .map_err(|e| format!("invalid base64 payload: {e}"))
            .and_then(|bytes| {
                String::from_utf8(bytes).map_err(|e| format!("payload is not UTF-8: {e}"))
            }),
    )
}

/// Encode a source-map JSON document as a `data:` URL.
///
/// # Examples
///
/// ```
/// use pipewright::source_map::inline_source_map_url;
///
/// let url = inline_source_map_url("{}");
/// assert_eq!(url, "data:application/json;charset=utf-8;base64,e30=");
/// ```
#[must_use]
pub fn inline_source_map_url(json: &str) -> String {
    format!("{DATA_URL_PREFIX}{}", STANDARD.encode(json))
}

/// Append a `//# sourceMappingURL=` comment on its own line.
///
/// # Examples
///
/// ```
/// use pipewright::source_map::append_source_map_comment;
///
/// assert_eq!(
///     append_source_map_comment("a();", "a.js.map"),
///     "a();\n//# sourceMappingURL=a.js.map\n"
/// );
/// ```
#[must_use]
pub fn append_source_map_comment(contents: &str, url: &str) -> String {
    let separator = if contents.is_empty() || contents.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    format!("{contents}{separator}//# sourceMappingURL={url}\n")
}
