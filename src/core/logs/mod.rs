mod format;
mod parser;
mod record;

pub use format::{decorate_message, render_html, MessageSegment};
pub use parser::{LogStreamParser, ParserState, MAX_EVENT_BYTES};
pub use record::{LogLevel, LogRecord, StreamKind};
