// ─── Message decoration ───
// Splits a log message into typed segments for highlighting in the game
// output window. Pure display transform; records themselves stay raw.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};
use serde::Serialize;

static RE_DECORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<prefix>^>\s)",
        r"|(?P<heading>(?P<marker>={2,3})\s(?P<title>.+?)\s={2,3})",
        r"|\[(?P<bracket>[a-zA-Z0-9]{1,20})\]",
        r"|\((?P<paren>[a-zA-Z0-9]{1,20})\)",
        r"|\s(?P<class>[a-zA-Z][a-zA-Z0-9$/\-_]*(?:\.[a-zA-Z<][a-zA-Z0-9$>/\-_]*)+(?:\([^)]*\))?)",
        r"|\s(?P<decimal>\d+(?:\.\d+)*)\b",
    ))
    .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "kebab-case")]
pub enum MessageSegment {
    Plain(String),
    /// Leading `> ` of launcher-style status lines.
    Prefix(String),
    /// `== title ==` or `=== title ===`
    Heading { marker: String, title: String },
    /// Content of a short `[token]`.
    Bracket(String),
    /// Content of a short `(token)`.
    Parentheses(String),
    /// Dotted, class-like identifier such as `net.minecraft.client.Main`.
    JavaClass(String),
    Decimal(String),
}

pub fn decorate_message(message: &str) -> Vec<MessageSegment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut last = 0;

    for caps in RE_DECORATION.captures_iter(message) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        plain.push_str(&message[last..whole.start()]);
        last = whole.end();

        let (leading, segment) = classify(&caps);
        plain.push_str(leading);
        if !plain.is_empty() {
            segments.push(MessageSegment::Plain(std::mem::take(&mut plain)));
        }
        segments.push(segment);
    }

    plain.push_str(&message[last..]);
    if !plain.is_empty() {
        segments.push(MessageSegment::Plain(plain));
    }
    segments
}

/// Returns the whitespace consumed in front of the token and the segment.
fn classify<'m>(caps: &Captures<'m>) -> (&'m str, MessageSegment) {
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    if let Some(prefix) = text("prefix") {
        return ("", MessageSegment::Prefix(prefix));
    }
    if let (Some(marker), Some(title)) = (text("marker"), text("title")) {
        return ("", MessageSegment::Heading { marker, title });
    }
    if let Some(bracket) = text("bracket") {
        return ("", MessageSegment::Bracket(bracket));
    }
    if let Some(paren) = text("paren") {
        return ("", MessageSegment::Parentheses(paren));
    }

    let Some(whole) = caps.get(0) else {
        return ("", MessageSegment::Plain(String::new()));
    };
    match (caps.name("class"), caps.name("decimal")) {
        (Some(class), _) => (
            leading(whole, class),
            MessageSegment::JavaClass(class.as_str().to_string()),
        ),
        (_, Some(decimal)) => (
            leading(whole, decimal),
            MessageSegment::Decimal(decimal.as_str().to_string()),
        ),
        _ => ("", MessageSegment::Plain(whole.as_str().to_string())),
    }
}

fn leading<'m>(whole: Match<'m>, token: Match<'m>) -> &'m str {
    &whole.as_str()[..token.start() - whole.start()]
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// HTML rendering used by the game output window.
pub fn render_html(message: &str) -> String {
    decorate_message(message)
        .iter()
        .map(|segment| match segment {
            MessageSegment::Plain(text) => escape_html(text),
            MessageSegment::Prefix(text) => format!("<b type='prefix'>{}</b>", escape_html(text)),
            MessageSegment::Heading { marker, title } => format!(
                "<b type='heading'>{marker} <b type='heading-content'>{}</b> {marker}</b>",
                escape_html(title)
            ),
            MessageSegment::Bracket(text) => format!(
                "<b type='bracket'>[<b type='bracket-content'>{}</b>]</b>",
                escape_html(text)
            ),
            MessageSegment::Parentheses(text) => format!(
                "<b type='parentheses'>(<b type='parentheses-content'>{}</b>)</b>",
                escape_html(text)
            ),
            MessageSegment::JavaClass(text) => {
                format!("<b type='java-class'>{}</b>", escape_html(text))
            }
            MessageSegment::Decimal(text) => format!("<b type='decimal'>{}</b>", escape_html(text)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_brackets_classes_and_numbers() {
        let segments = decorate_message("[Client] Loading net.minecraft.client.Main 42 times");
        assert_eq!(
            segments,
            vec![
                MessageSegment::Bracket("Client".into()),
                MessageSegment::Plain(" Loading ".into()),
                MessageSegment::JavaClass("net.minecraft.client.Main".into()),
                MessageSegment::Plain(" ".into()),
                MessageSegment::Decimal("42".into()),
                MessageSegment::Plain(" times".into()),
            ]
        );
    }

    #[test]
    fn headings_and_prefix() {
        assert_eq!(
            decorate_message("== Starting version 1.8.9 =="),
            vec![MessageSegment::Heading {
                marker: "==".into(),
                title: "Starting version 1.8.9".into()
            }]
        );
        assert_eq!(
            decorate_message("> Java is installed"),
            vec![
                MessageSegment::Prefix("> ".into()),
                MessageSegment::Plain("Java is installed".into()),
            ]
        );
    }

    #[test]
    fn long_bracket_tokens_stay_plain() {
        let message = "[ThisTokenIsWayTooLongToHighlight]";
        assert_eq!(
            decorate_message(message),
            vec![MessageSegment::Plain(message.into())]
        );
    }

    #[test]
    fn html_is_escaped_and_wrapped() {
        assert_eq!(
            render_html("(main) <init> 3.5"),
            "<b type='parentheses'>(<b type='parentheses-content'>main</b>)</b> &lt;init&gt; <b type='decimal'>3.5</b>"
        );
    }
}
