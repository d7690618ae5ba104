//! # ndc-core
//!
//! Decoder for host-to-terminal messages of the NDC/Diebold-style ATM
//! protocol.
//!
//! A host message is a 2-byte big-endian length prefix followed by a body of
//! fields separated by FS (`0x1C`).  The leading character of the body selects
//! the message class; data commands branch again into subclass grammars that
//! carry repeated records (state tables, screens, FIT entries).
//!
//! The crate is split into:
//!
//! - **`protocol`** – Framing, field splitting, record segmentation and the
//!   [`Decoder`] that turns a body into a typed [`DecodedMessage`].
//!
//! - **`tables`** – Code tables that annotate single-character flags with
//!   their meaning.
//!
//! - **`config`** – TOML configuration for record widths and the screen
//!   boundary strategy.
//!
//! Decoding is pure: no I/O, no shared mutable state.  A [`Decoder`] can be
//! shared across threads.
//!
//! ```rust
//! use ndc_core::parse_host_message;
//!
//! let msg = parse_host_message(b"\x00\x0c10\x1c000\x1c000\x1c2").unwrap();
//! assert_eq!(msg.class_name(), "Terminal Command");
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod tables;

pub use config::{ConfigError, DecoderConfig, ScreenBoundaryKind};
pub use error::DecodeError;
pub use protocol::decoder::{parse, parse_host_message, Decoder};
pub use protocol::frame::{get_incoming_message_length, FrameReader};
pub use protocol::messages::DecodedMessage;
pub use tables::{
    get_card_return_flag_description, get_command_code_description,
    get_function_identifier_description, get_printer_flag_description, CodeDescription, CodeTable,
};
