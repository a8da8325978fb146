//! Cross-context messaging between page, background and popup.
//!
//! `protocol` is the wire shape, `background` answers requests, `content` is
//! the page-side focus logic, and `host` drives all of it from JSON lines.

pub mod background;
pub mod content;
pub mod host;
pub mod protocol;

pub use background::BackgroundRouter;
pub use content::{
    format_post_context, ChannelError, ContentFlow, CorrectionOutcome, LocalChannel,
    MessageChannel, SuggestionOutcome,
};
pub use host::{Host, HostCommand, HostOutput};
pub use protocol::{Request, Response};
