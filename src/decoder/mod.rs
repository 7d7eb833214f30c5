//! Streaming decoder for the binary chat log format.
//!
//! # Record layout
//!
//! | Field       | Size | Encoding                                       |
//! |-------------|------|------------------------------------------------|
//! | timestamp   | 4    | big-endian seconds since the Unix epoch        |
//! | kind        | 1    | see [`crate::models::RecordKind`]              |
//! | name length | 1    | placeholder byte for headless records          |
//! | name        | L    | UTF-8                                          |
//! | body length | 2    | big-endian                                     |
//! | body        | N    | UTF-8                                          |
//!
//! # Recovery
//!
//! Damage inside a record never stops decoding. The record is returned with
//! its [`crate::models::Integrity`] flags raised, and after every attempt the
//! [`resync`] scan finds the next plausible header. Bytes that belong to no
//! record are reported as a gap.

pub mod cursor;
pub mod record;
pub mod resync;
pub mod state;

pub use cursor::ByteCursor;
pub use record::{Decoded, RecordDecoder, sanitize_text};
pub use resync::{ResyncOutcome, is_plausible_header, resynchronize};
pub use state::DecodeState;
