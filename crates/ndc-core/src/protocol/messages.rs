//! Decoded host-to-terminal messages.
//!
//! One variant per message class.  Every text field is a byte-for-byte copy of
//! a contiguous range of the original message; composite fields (such as the
//! serial number / function identifier / screen number field of a transaction
//! reply) are decomposed into their parts.

use serde::{Deserialize, Serialize};

use crate::protocol::fields::{latin1, GS};
use crate::tables::CodeDescription;

// ── Top level ─────────────────────────────────────────────────────────────────

/// A decoded host message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedMessage {
    TerminalCommand(TerminalCommand),
    TransactionReply(TransactionReply),
    DataCommand(DataCommand),
}

impl DecodedMessage {
    /// Returns the protocol name of the message class.
    pub fn class_name(&self) -> &'static str {
        match self {
            DecodedMessage::TerminalCommand(_) => "Terminal Command",
            DecodedMessage::TransactionReply(_) => "Transaction Reply Command",
            DecodedMessage::DataCommand(_) => "Data Command",
        }
    }

    /// Logical Unit Number of the addressed terminal.
    pub fn luno(&self) -> &str {
        match self {
            DecodedMessage::TerminalCommand(m) => &m.luno,
            DecodedMessage::TransactionReply(m) => &m.luno,
            DecodedMessage::DataCommand(m) => &m.luno,
        }
    }
}

// ── Terminal Command ──────────────────────────────────────────────────────────

/// Terminal Command (class `1`): an operational command such as going
/// out of service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCommand {
    pub luno: String,
    pub sequence_number: String,
    pub command_code: CodeDescription,
}

// ── Transaction Reply ─────────────────────────────────────────────────────────

/// Transaction Reply Command (class `4`): the host's answer to a transaction
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReply {
    pub luno: String,
    pub sequence_number: String,
    pub next_state: String,
    pub notes_to_dispense: String,
    pub transaction_serial_number: String,
    pub function_identifier: CodeDescription,
    pub screen_number: String,
    pub coordination_info: CoordinationInfo,
}

/// Tail of a transaction reply, selected by its first character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationInfo {
    /// Coordination number, card return flag, printer flag and printer data.
    Standard {
        message_coordination_number: String,
        card_return_flag: CodeDescription,
        printer_flag: CodeDescription,
        printer_data: PrinterData,
    },
    /// A `u`-prefixed screen display update, kept verbatim.
    ScreenDisplayUpdate(ScreenDisplayUpdate),
}

/// Screen display update trailer of a transaction reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDisplayUpdate {
    /// The whole field, including the leading `u`.
    pub raw: String,
}

impl ScreenDisplayUpdate {
    /// Splits the text after the leading `u` into its GS-delimited updates.
    pub fn updates(&self) -> Vec<String> {
        let body = self.raw.strip_prefix('u').unwrap_or(&self.raw);
        body.split(char::from(GS)).map(str::to_string).collect()
    }
}

/// Printer output carried by a transaction reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrinterData {
    #[default]
    None,
    Receipt(String),
    Journal(String),
    /// The same text for both printers, from printer flag `3`.
    Both(String),
    /// Receipt and journal text supplied independently.
    ReceiptAndJournal { receipt: String, journal: String },
}

impl PrinterData {
    /// Text destined for the receipt printer, if any.
    pub fn receipt(&self) -> Option<&str> {
        match self {
            PrinterData::Receipt(text) | PrinterData::Both(text) => Some(text),
            PrinterData::ReceiptAndJournal { receipt, .. } => Some(receipt),
            PrinterData::None | PrinterData::Journal(_) => None,
        }
    }

    /// Text destined for the journal printer, if any.
    pub fn journal(&self) -> Option<&str> {
        match self {
            PrinterData::Journal(text) | PrinterData::Both(text) => Some(text),
            PrinterData::ReceiptAndJournal { journal, .. } => Some(journal),
            PrinterData::None | PrinterData::Receipt(_) => None,
        }
    }
}

// ── Data Command ──────────────────────────────────────────────────────────────

/// Data Command (class `3`): configuration and interactive data pushed to the
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCommand {
    pub luno: String,
    pub sequence_number: String,
    pub subclass_payload: DataCommandPayload,
}

/// Subclass-specific body of a data command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataCommandPayload {
    InteractiveTransactionResponse(InteractiveTransactionResponse),
    StateTablesLoad { states: Vec<StateRecord> },
    ScreenDataLoad { screens: Vec<ScreenRecord> },
    FitDataLoad { entries: Vec<FitRecord> },
    ExtendedEncryptionKeyInfo(EncryptionKeyInfo),
}

impl DataCommandPayload {
    /// Protocol name of the data command subclass.
    pub fn subclass_name(&self) -> &'static str {
        match self {
            DataCommandPayload::InteractiveTransactionResponse(_) => {
                "Interactive Transaction Response"
            }
            DataCommandPayload::StateTablesLoad { .. }
            | DataCommandPayload::ScreenDataLoad { .. }
            | DataCommandPayload::FitDataLoad { .. } => "Customization Command",
            DataCommandPayload::ExtendedEncryptionKeyInfo(_) => {
                "Extended Encryption Key Information"
            }
        }
    }

    /// Message identifier of a customization load; `None` for other subclasses.
    pub fn message_identifier(&self) -> Option<&'static str> {
        match self {
            DataCommandPayload::StateTablesLoad { .. } => Some("State Tables load"),
            DataCommandPayload::ScreenDataLoad { .. } => Some("Screen Data load"),
            DataCommandPayload::FitDataLoad { .. } => Some("FIT Data load"),
            _ => None,
        }
    }
}

/// Interactive Transaction Response: a screen shown mid-transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveTransactionResponse {
    pub display_flag: char,
    /// Ten `0`/`1` flags enabling the keyboard keys.
    pub active_keys: String,
    pub screen_timer_field: String,
    pub screen_data_field: String,
}

/// Extended Encryption Key Information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionKeyInfo {
    pub modifier: CodeDescription,
    /// Declared key length, three characters as sent.
    pub new_key_length: String,
    /// Key data, kept verbatim regardless of the declared length.
    pub new_key_data: String,
}

impl EncryptionKeyInfo {
    /// The declared key length as a number, if it is numeric.
    pub fn declared_key_length(&self) -> Option<usize> {
        self.new_key_length.parse().ok()
    }
}

// ── Customization records ─────────────────────────────────────────────────────

/// Byte offset of the `n`th char of `text`, or its length when shorter.
///
/// Record text is Latin-1 decoded, so bytes above `0x7F` occupy two UTF-8
/// bytes and char counts differ from byte offsets.
fn char_boundary(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// One state table entry: state number, state type, eight 3-digit entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateRecord(pub String);

impl StateRecord {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self(latin1(bytes))
    }

    /// Three-character state number.
    pub fn number(&self) -> &str {
        &self.0[..char_boundary(&self.0, 3)]
    }

    /// State type letter (e.g. `A` for card read).
    pub fn state_type(&self) -> Option<char> {
        self.0.chars().nth(3)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One screen: a 3-character screen number followed by its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenRecord(pub String);

impl ScreenRecord {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self(latin1(bytes))
    }

    /// Three-character screen number.
    pub fn number(&self) -> &str {
        &self.0[..char_boundary(&self.0, 3)]
    }

    /// Screen data after the number, escape sequences included.
    pub fn data(&self) -> &str {
        &self.0[char_boundary(&self.0, 3)..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One Fixed Information Table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitRecord(pub String);

impl FitRecord {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self(latin1(bytes))
    }

    /// Three-character FIT number.
    pub fn number(&self) -> &str {
        &self.0[..char_boundary(&self.0, 3)]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
