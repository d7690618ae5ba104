//! Code tables that annotate single-character protocol flags with their
//! human-readable meaning.
//!
//! Every table is a compile-time `match`, so lookups are allocation-free and
//! the tables are immutable for the lifetime of the process.  A lookup always
//! echoes the queried code back alongside its label (see [`CodeDescription`]),
//! and an unlisted code is an error rather than a silently missing entry.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

pub mod host_command;
pub mod transaction_reply;

/// A code table entry: the queried code and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDescription {
    /// The code exactly as it appeared on the wire.
    pub code: char,
    /// Human-readable meaning of the code.
    pub label: Cow<'static, str>,
}

impl CodeDescription {
    /// Builds an entry from a static table label.
    pub const fn new(code: char, label: &'static str) -> Self {
        Self {
            code,
            label: Cow::Borrowed(label),
        }
    }

    /// Returns the label text.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for CodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.label)
    }
}

/// Identifies a lookup table; carried by [`DecodeError::UnknownCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeTable {
    FunctionIdentifier,
    CardReturnFlag,
    PrinterFlag,
    /// Leading selector of a follow-on printer data chunk.
    PrinterSelector,
    DataCommandSubclass,
    CustomizationIdentifier,
    EncryptionKeyModifier,
}

impl CodeTable {
    /// Returns the label for `code`, or `None` if the table has no entry.
    pub fn label(self, code: char) -> Option<&'static str> {
        match self {
            CodeTable::FunctionIdentifier => transaction_reply::function_identifier(code),
            CodeTable::CardReturnFlag => transaction_reply::card_return_flag(code),
            CodeTable::PrinterFlag => transaction_reply::printer_flag(code),
            CodeTable::PrinterSelector => transaction_reply::printer_selector(code),
            CodeTable::DataCommandSubclass => host_command::data_command_subclass(code),
            CodeTable::CustomizationIdentifier => host_command::customization_identifier(code),
            CodeTable::EncryptionKeyModifier => host_command::encryption_key_modifier(code),
        }
    }

    /// Looks up `code`, returning the one-entry description.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownCode`] if the table has no entry for `code`.
    pub fn describe(self, code: char) -> Result<CodeDescription, DecodeError> {
        self.label(code)
            .map(|label| CodeDescription::new(code, label))
            .ok_or(DecodeError::UnknownCode { table: self, code })
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeTable::FunctionIdentifier => "function identifier",
            CodeTable::CardReturnFlag => "card return flag",
            CodeTable::PrinterFlag => "printer flag",
            CodeTable::PrinterSelector => "printer selector",
            CodeTable::DataCommandSubclass => "data command subclass",
            CodeTable::CustomizationIdentifier => "customization identifier",
            CodeTable::EncryptionKeyModifier => "encryption key modifier",
        };
        f.write_str(name)
    }
}

/// Describes a transaction reply function identifier.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownCode`] for an unlisted identifier.
pub fn get_function_identifier_description(code: char) -> Result<CodeDescription, DecodeError> {
    CodeTable::FunctionIdentifier.describe(code)
}

/// Describes a card return flag.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownCode`] for an unlisted flag.
pub fn get_card_return_flag_description(code: char) -> Result<CodeDescription, DecodeError> {
    CodeTable::CardReturnFlag.describe(code)
}

/// Describes a printer flag.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownCode`] for an unlisted flag.
pub fn get_printer_flag_description(code: char) -> Result<CodeDescription, DecodeError> {
    CodeTable::PrinterFlag.describe(code)
}

/// Describes a terminal command code.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownCommandCode`] for an unlisted command.
pub fn get_command_code_description(code: char) -> Result<CodeDescription, DecodeError> {
    host_command::terminal_command(code)
        .map(|label| CodeDescription::new(code, label))
        .ok_or(DecodeError::UnknownCommandCode(code))
}
