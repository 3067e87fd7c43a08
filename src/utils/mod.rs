pub mod logging;
pub mod secrets;
pub mod terminal;

pub use logging::{LogTarget, init_logging};
pub use secrets::normalize_token;
pub use terminal::{sanitize_line, strip_ansi_codes};
