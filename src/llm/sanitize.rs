//! Allow-list cleanup of model output before it reaches the browser.
//!
//! The prompts are built from README and issue text anyone can write, so the
//! reply is untrusted markup.

const ALLOWED_TAGS: [&str; 8] = ["h4", "p", "ul", "ol", "li", "strong", "em", "code"];
const DROPPED_WITH_CONTENT: [&str; 2] = ["script", "style"];

/// Keep only the formatting tags the analyses are asked to use.
///
/// Allowed tags lose every attribute; `<a>` keeps an `http(s)` `href` only.
/// Other tags are removed but their text stays, except `<script>` and
/// `<style>` which go with their content.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];

        let Some(close) = after.find('>') else {
            out.push_str(&html_escape::encode_text(after));
            return out;
        };

        let inner = &after[1..close];
        if inner.starts_with(['!', '?']) {
            // Comment or declaration.
            rest = &after[close + 1..];
            continue;
        }

        match Tag::parse(inner) {
            Some(tag) => {
                rest = &after[close + 1..];
                if !tag.closing && DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) {
                    rest = skip_past_closing(rest, &tag.name);
                } else {
                    render_tag(&tag, &mut out);
                }
            }
            None => {
                // Not a tag, just a less-than sign in the text.
                out.push_str("&lt;");
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

struct Tag<'a> {
    name: String,
    closing: bool,
    attributes: &'a str,
}

impl<'a> Tag<'a> {
    fn parse(inner: &'a str) -> Option<Self> {
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let name_len = body
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        if name_len == 0 {
            return None;
        }

        Some(Self {
            name: body[..name_len].to_ascii_lowercase(),
            closing,
            attributes: &body[name_len..],
        })
    }
}

fn render_tag(tag: &Tag, out: &mut String) {
    let name = tag.name.as_str();
    if name != "a" && !ALLOWED_TAGS.contains(&name) {
        return;
    }

    if tag.closing {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
        return;
    }

    if name == "a" {
        let href = attribute(tag.attributes, "href")
            .map(str::trim)
            .filter(|href| is_web_link(href));
        match href {
            Some(href) => {
                out.push_str("<a href=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(href));
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
            }
            None => out.push_str("<a>"),
        }
    } else {
        out.push('<');
        out.push_str(name);
        out.push('>');
    }
}

/// Value of attribute `name`, quoted or bare.
fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = attributes;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let key_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        rest = rest[key_len..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start();
                let (value, remaining) = match after_eq.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let body = &after_eq[1..];
                        match body.find(quote) {
                            Some(end) => (&body[..end], &body[end + 1..]),
                            None => (body, ""),
                        }
                    }
                    _ => {
                        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                        (&after_eq[..end], &after_eq[end..])
                    }
                };
                rest = remaining;
                Some(value)
            }
            None => None,
        };

        if key.eq_ignore_ascii_case(name) {
            return value;
        }
    }
}

fn is_web_link(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Skip to just past `</name ...>`, or to the end if it never closes.
fn skip_past_closing<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let closing = format!("</{}", name);
    lower
        .find(&closing)
        .and_then(|start| rest[start..].find('>').map(|end| &rest[start + end + 1..]))
        .unwrap_or("")
}
