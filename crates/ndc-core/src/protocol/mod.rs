//! Protocol module: framing, field splitting, record segmentation and the
//! message decoder.

pub mod decoder;
pub mod fields;
pub mod frame;
pub mod messages;
pub mod segment;

pub use decoder::{parse, parse_host_message, Decoder};
pub use frame::{get_incoming_message_length, FrameReader};
pub use messages::*;
pub use segment::{AutoBoundary, IndexScanBoundary, ScreenBoundary, SeparatorBoundary};
