// ─── Log Stream Parser ───
// Turns raw stdout/stderr chunks of the game into log records. The game
// writes log4j XML events (XMLLayout); chunk boundaries fall anywhere,
// including inside tags and multi-byte characters, so bytes are buffered
// until an event or a line is complete.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::record::{LogLevel, LogRecord, StreamKind};

const EVENT_OPEN: &[u8] = b"<log4j:Event";
const EVENT_CLOSE: &[u8] = b"</log4j:Event>";
const EVENT_TAG: &[u8] = b"log4j:Event";
const MESSAGE_TAG: &[u8] = b"log4j:Message";
const THROWABLE_TAG: &[u8] = b"log4j:Throwable";

/// Upper bound for a single buffered event before it is flushed as text.
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Outside an event; buffered bytes are an incomplete plain line.
    Idle,
    /// The buffer starts with `<log4j:Event` and waits for the closing tag.
    Accumulating,
}

/// Incremental parser for one output stream of one game process.
#[derive(Debug)]
pub struct LogStreamParser {
    stream: StreamKind,
    state: ParserState,
    buffer: Vec<u8>,
    /// Leading bytes of `buffer` already searched in the current state.
    scanned: usize,
}

impl LogStreamParser {
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            state: ParserState::Idle,
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feed the next chunk and return every record it completed, in order.
    /// Only bytes not yet searched are scanned again, with enough overlap to
    /// catch a tag split across chunks.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogRecord> {
        self.buffer.extend_from_slice(chunk);
        let mut records = Vec::new();

        loop {
            match self.state {
                ParserState::Idle => {
                    let from = self.scanned.saturating_sub(EVENT_OPEN.len() - 1);
                    if let Some(start) = find(&self.buffer, EVENT_OPEN, from) {
                        let prefix: Vec<u8> = self.buffer.drain(..start).collect();
                        self.push_plain(&prefix, &mut records);
                        self.state = ParserState::Accumulating;
                        self.scanned = 0;
                        continue;
                    }

                    // Text after the last newline may still turn into an
                    // event tag or a longer line.
                    if let Some(newline) = self.buffer[from..].iter().rposition(|b| *b == b'\n') {
                        let lines: Vec<u8> = self.buffer.drain(..=from + newline).collect();
                        self.push_plain(&lines, &mut records);
                    }

                    if self.buffer.len() > MAX_EVENT_BYTES {
                        let cut = flush_point(&self.buffer);
                        debug!("Line exceeds {} bytes, flushing {} bytes", MAX_EVENT_BYTES, cut);
                        let text: Vec<u8> = self.buffer.drain(..cut).collect();
                        self.push_plain(&text, &mut records);
                    }
                    self.scanned = self.buffer.len();
                    break;
                }
                ParserState::Accumulating => {
                    let from = EVENT_OPEN
                        .len()
                        .max(self.scanned.saturating_sub(EVENT_CLOSE.len() - 1));
                    let close = find(&self.buffer, EVENT_CLOSE, from);
                    let reopen = find(&self.buffer, EVENT_OPEN, from);

                    match (close, reopen) {
                        (close, Some(reopen)) if close.map_or(true, |c| reopen < c) => {
                            let abandoned = self.buffer.drain(..reopen).count();
                            debug!("Abandoned unterminated log4j event ({} bytes)", abandoned);
                            self.scanned = 0;
                        }
                        (Some(close), _) => {
                            let end = close + EVENT_CLOSE.len();
                            let fragment: Vec<u8> = self.buffer.drain(..end).collect();
                            records.push(self.parse_fragment(&fragment));
                            self.state = ParserState::Idle;
                            self.scanned = 0;
                        }
                        _ => {
                            if self.buffer.len() > MAX_EVENT_BYTES {
                                debug!("log4j event exceeds {} bytes, flushing", MAX_EVENT_BYTES);
                                let text = std::mem::take(&mut self.buffer);
                                records.push(self.stream.plain_record(&String::from_utf8_lossy(&text)));
                                self.state = ParserState::Idle;
                            }
                            self.scanned = self.buffer.len();
                            break;
                        }
                    }
                }
            }
        }

        records
    }

    /// Flush whatever is still buffered once the stream has ended. A
    /// trailing partial line becomes a plain record; an unterminated event
    /// becomes one fallback record carrying its raw text.
    pub fn finish(&mut self) -> Vec<LogRecord> {
        let rest = std::mem::take(&mut self.buffer);
        let mut records = Vec::new();
        match self.state {
            ParserState::Idle => self.push_plain(&rest, &mut records),
            ParserState::Accumulating => {
                let text = String::from_utf8_lossy(&rest);
                if !text.trim().is_empty() {
                    records.push(self.stream.plain_record(text.trim_end()));
                }
            }
        }
        self.state = ParserState::Idle;
        self.scanned = 0;
        records
    }

    fn push_plain(&self, bytes: &[u8], records: &mut Vec<LogRecord>) {
        if bytes.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(bytes);
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }
            records.push(self.stream.plain_record(line));
        }
    }

    fn parse_fragment(&self, fragment: &[u8]) -> LogRecord {
        let xml = String::from_utf8_lossy(fragment);
        match parse_event(&xml, self.stream) {
            Some(record) => record,
            None => {
                debug!("Unparseable log4j event, forwarding raw text");
                self.stream.plain_record(&xml)
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if haystack.len() < from + needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Where an oversized idle buffer can be cut: before a trailing partial
/// `<log4j:Event` tag, or else before a trailing incomplete UTF-8 sequence.
fn flush_point(buffer: &[u8]) -> usize {
    for len in (1..EVENT_OPEN.len()).rev() {
        if buffer.ends_with(&EVENT_OPEN[..len]) {
            return buffer.len() - len;
        }
    }

    let tail = buffer.len().saturating_sub(3);
    if let Some(lead) = (tail..buffer.len()).rev().find(|&i| buffer[i] & 0xC0 != 0x80) {
        let width = match buffer[lead] {
            b if b >= 0xF0 => 4,
            b if b >= 0xE0 => 3,
            b if b >= 0xC0 => 2,
            _ => 1,
        };
        if lead + width > buffer.len() {
            return lead;
        }
    }
    buffer.len()
}

#[derive(Default)]
struct EventAttributes {
    level: Option<String>,
    logger: Option<String>,
    thread: Option<String>,
    timestamp: Option<i64>,
}

fn event_attributes(start: &BytesStart<'_>) -> Option<EventAttributes> {
    let mut attrs = EventAttributes::default();
    for attr in start.attributes() {
        let attr = attr.ok()?;
        let value = attr.unescape_value().ok()?.to_string();
        match attr.key.as_ref() {
            b"level" => attrs.level = Some(value),
            b"logger" => attrs.logger = Some(value),
            b"thread" => attrs.thread = Some(value),
            b"timestamp" => attrs.timestamp = value.trim().parse().ok(),
            _ => {}
        }
    }
    Some(attrs)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Message,
    Throwable,
}

/// Parse one complete `<log4j:Event>` fragment. `None` on malformed XML.
fn parse_event(xml: &str, stream: StreamKind) -> Option<LogRecord> {
    let mut reader = Reader::from_str(xml);
    let mut attrs: Option<EventAttributes> = None;
    let mut section = Section::Other;
    let mut message = String::new();
    let mut throwable = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                EVENT_TAG => attrs = Some(event_attributes(&e)?),
                MESSAGE_TAG => section = Section::Message,
                THROWABLE_TAG => section = Section::Throwable,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == EVENT_TAG => {
                attrs = Some(event_attributes(&e)?);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                EVENT_TAG => break,
                MESSAGE_TAG | THROWABLE_TAG => section = Section::Other,
                _ => {}
            },
            Ok(Event::Text(text)) => {
                let text = text.unescape().ok()?;
                append(section, &text, &mut message, &mut throwable);
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8_lossy(&data.into_inner()).to_string();
                append(section, &text, &mut message, &mut throwable);
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            Ok(_) => {}
        }
    }

    let attrs = attrs?;
    if !throwable.is_empty() {
        if !message.is_empty() && !message.ends_with('\n') {
            message.push('\n');
        }
        message.push_str(&throwable);
    }

    Some(LogRecord {
        level: attrs
            .level
            .as_deref()
            .map(LogLevel::parse)
            .unwrap_or_else(|| stream.default_level()),
        logger: attrs
            .logger
            .unwrap_or_else(|| stream.default_logger().to_string()),
        thread: attrs.thread.unwrap_or_default(),
        timestamp: attrs
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        message,
    })
}

fn append(section: Section, text: &str, message: &mut String, throwable: &mut String) {
    match section {
        Section::Message => message.push_str(text),
        Section::Throwable => throwable.push_str(text),
        Section::Other => {}
    }
}
