//! Host message decoder.
//!
//! The leading character of the class field selects one of three grammars:
//!
//! | char | class                      |
//! |------|----------------------------|
//! | `1`  | Terminal Command           |
//! | `3`  | Data Command               |
//! | `4`  | Transaction Reply Command  |
//!
//! Data commands branch again on their subclass field into interactive
//! responses, customization loads (state tables, screens, FIT entries) and
//! encryption key records.

use std::fmt;

use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::protocol::fields::{latin1, split_fields, split_groups, split_leading_fields, FS};
use crate::protocol::frame::{get_incoming_message_length, FrameReader, LENGTH_PREFIX_SIZE};
use crate::protocol::messages::{
    CoordinationInfo, DataCommand, DataCommandPayload, DecodedMessage, EncryptionKeyInfo,
    FitRecord, InteractiveTransactionResponse, PrinterData, ScreenDisplayUpdate, ScreenRecord,
    StateRecord, TerminalCommand, TransactionReply,
};
use crate::protocol::segment::{segment_screens, split_fixed, RecordShape, ScreenBoundary};
use crate::tables::{
    get_card_return_flag_description, get_command_code_description,
    get_function_identifier_description, get_printer_flag_description, CodeTable,
};

/// Serial number (4) + function identifier (1) + screen number (3).
const REPLY_COMPOSITE_LEN: usize = 8;

/// Coordination number (1) + card return flag (1) + printer flag (1).
const COORDINATION_LEN: usize = 3;

/// Subclass digit (1) + display flag (1) + ten active key flags.
const ITR_SUBCLASS_LEN: usize = 12;

/// Width of the declared key length in an encryption key record.
const KEY_LENGTH_WIDTH: usize = 3;

// ── Decoder ───────────────────────────────────────────────────────────────────

/// Decodes host messages using a fixed record layout and screen boundary
/// strategy.
///
/// A `Decoder` holds no per-message state; one instance can be shared across
/// threads and used for any number of messages.
pub struct Decoder {
    state_table: RecordShape,
    fit: RecordShape,
    boundary: Box<dyn ScreenBoundary>,
}

impl Decoder {
    /// Builds a decoder from configuration.
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            state_table: config.state_table_shape(),
            fit: config.fit_shape(),
            boundary: config.screens.boundary.build(),
        }
    }

    /// Replaces the screen record boundary strategy.
    pub fn with_boundary(mut self, boundary: impl ScreenBoundary + 'static) -> Self {
        self.boundary = Box::new(boundary);
        self
    }

    /// Decodes one message body.
    ///
    /// `declared_length`, when supplied, must equal `message.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedMessage`] if the declared length runs
    /// past the body, [`DecodeError::LengthMismatch`] if it stops short, and
    /// otherwise whatever the selected grammar rejects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ndc_core::{Decoder, DecodedMessage};
    ///
    /// let decoder = Decoder::default();
    /// let msg = decoder.parse(b"10\x1c000\x1c000\x1c2", Some(12)).unwrap();
    /// let DecodedMessage::TerminalCommand(cmd) = msg else { panic!() };
    /// assert_eq!(cmd.command_code.label(), "Go out-of-service");
    /// ```
    pub fn parse(
        &self,
        message: &[u8],
        declared_length: Option<usize>,
    ) -> Result<DecodedMessage, DecodeError> {
        if let Some(declared) = declared_length {
            check_declared_length(declared, message.len())?;
        }

        let Some(&class) = message.first() else {
            return Err(DecodeError::TruncatedMessage {
                context: "message class",
                needed: 1,
                available: 0,
            });
        };

        match class {
            b'1' => decode_terminal_command(message).map(DecodedMessage::TerminalCommand),
            b'3' => self.decode_data_command(message).map(DecodedMessage::DataCommand),
            b'4' => decode_transaction_reply(message).map(DecodedMessage::TransactionReply),
            other => Err(DecodeError::UnknownMessageClass(char::from(other))),
        }
    }

    /// Decodes a host-framed message: a 2-byte big-endian length prefix
    /// followed by the body.
    ///
    /// # Errors
    ///
    /// As [`Decoder::parse`], with the prefix value as the declared length.
    pub fn parse_host_message(&self, buffer: &[u8]) -> Result<DecodedMessage, DecodeError> {
        let length = get_incoming_message_length(buffer);
        let body = buffer.get(LENGTH_PREFIX_SIZE..).unwrap_or_default();
        self.parse(body, Some(length))
    }

    /// Decodes every consecutive length-prefixed frame in `buffer`.
    ///
    /// A partial trailing frame yields one [`DecodeError::TruncatedMessage`]
    /// and ends the iteration.
    pub fn parse_frames<'a>(
        &'a self,
        buffer: &'a [u8],
    ) -> impl Iterator<Item = Result<DecodedMessage, DecodeError>> + 'a {
        FrameReader::new(buffer)
            .map(move |frame| frame.and_then(|body| self.parse(body, Some(body.len()))))
    }

    // ── Data Command ──────────────────────────────────────────────────────────

    fn decode_data_command(&self, message: &[u8]) -> Result<DataCommand, DecodeError> {
        let (head, rest) = split_leading_fields(message, 4);
        require_fields(&head, 4, "data command fields")?;

        let subclass_field = head[3];
        let Some(&subclass) = subclass_field.first() else {
            return Err(DecodeError::TruncatedMessage {
                context: "data command subclass",
                needed: 1,
                available: 0,
            });
        };
        trace!("data command subclass {:?}", char::from(subclass));

        let subclass_payload = match subclass {
            b'1' => self.decode_customization(subclass_field, rest.unwrap_or_default())?,
            b'2' => decode_interactive_response(subclass_field, rest)?,
            b'4' => decode_encryption_key_info(subclass_field, rest)?,
            other => {
                return Err(DecodeError::UnknownCode {
                    table: CodeTable::DataCommandSubclass,
                    code: char::from(other),
                })
            }
        };

        Ok(DataCommand {
            luno: latin1(head[1]),
            sequence_number: latin1(head[2]),
            subclass_payload,
        })
    }

    fn decode_customization(
        &self,
        subclass_field: &[u8],
        tail: &[u8],
    ) -> Result<DataCommandPayload, DecodeError> {
        let identifier = second_char(subclass_field, "customization identifier")?;

        match identifier {
            '1' => {
                let screens: Vec<ScreenRecord> = segment_screens(tail, self.boundary.as_ref())?
                    .into_iter()
                    .map(ScreenRecord::from_bytes)
                    .collect();
                debug!("screen data load: {} screens", screens.len());
                Ok(DataCommandPayload::ScreenDataLoad { screens })
            }
            '2' => {
                let states: Vec<StateRecord> = split_fixed(tail, self.state_table)?
                    .into_iter()
                    .map(StateRecord::from_bytes)
                    .collect();
                debug!("state tables load: {} states", states.len());
                Ok(DataCommandPayload::StateTablesLoad { states })
            }
            '5' => {
                let entries: Vec<FitRecord> = split_fixed(tail, self.fit)?
                    .into_iter()
                    .map(FitRecord::from_bytes)
                    .collect();
                debug!("FIT data load: {} entries", entries.len());
                Ok(DataCommandPayload::FitDataLoad { entries })
            }
            code => Err(DecodeError::UnknownCode {
                table: CodeTable::CustomizationIdentifier,
                code,
            }),
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state_table", &self.state_table)
            .field("fit", &self.fit)
            .finish_non_exhaustive()
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Decodes one message body with the default configuration.
///
/// # Errors
///
/// See [`Decoder::parse`].
pub fn parse(message: &[u8], declared_length: Option<usize>) -> Result<DecodedMessage, DecodeError> {
    Decoder::default().parse(message, declared_length)
}

/// Decodes one host-framed message with the default configuration.
///
/// # Errors
///
/// See [`Decoder::parse_host_message`].
pub fn parse_host_message(buffer: &[u8]) -> Result<DecodedMessage, DecodeError> {
    Decoder::default().parse_host_message(buffer)
}

// ── Terminal Command ──────────────────────────────────────────────────────────

fn decode_terminal_command(message: &[u8]) -> Result<TerminalCommand, DecodeError> {
    let fields = split_fields(message);
    require_fields(&fields, 4, "terminal command fields")?;

    let code = first_char(fields[3], "command code")?;
    let command_code = get_command_code_description(code)?;
    trace!("terminal command {command_code}");

    Ok(TerminalCommand {
        luno: latin1(fields[1]),
        sequence_number: latin1(fields[2]),
        command_code,
    })
}

// ── Transaction Reply ─────────────────────────────────────────────────────────

fn decode_transaction_reply(message: &[u8]) -> Result<TransactionReply, DecodeError> {
    let fields = split_fields(message);
    require_fields(&fields, 6, "transaction reply fields")?;

    let composite = fields[5];
    if composite.len() < REPLY_COMPOSITE_LEN {
        return Err(DecodeError::MalformedComposite {
            field: "serial number/function identifier/screen number",
            expected: REPLY_COMPOSITE_LEN,
            actual: composite.len(),
        });
    }
    let (packed, trailer) = composite.split_at(REPLY_COMPOSITE_LEN);
    let function_identifier = get_function_identifier_description(char::from(packed[4]))?;

    let coordination_info = match trailer.first() {
        // The screen display update may follow the composite without a separator.
        Some(b'u') => {
            trace!("in-field screen display update");
            screen_display_update(trailer)
        }
        Some(_) => {
            return Err(DecodeError::MalformedComposite {
                field: "serial number/function identifier/screen number",
                expected: REPLY_COMPOSITE_LEN,
                actual: composite.len(),
            })
        }
        None => {
            require_fields(&fields, 7, "transaction reply fields")?;
            decode_coordination(fields[6])?
        }
    };

    Ok(TransactionReply {
        luno: latin1(fields[1]),
        sequence_number: latin1(fields[2]),
        next_state: latin1(fields[3]),
        notes_to_dispense: latin1(fields[4]),
        transaction_serial_number: latin1(&packed[..4]),
        function_identifier,
        screen_number: latin1(&packed[5..]),
        coordination_info,
    })
}

fn screen_display_update(field: &[u8]) -> CoordinationInfo {
    CoordinationInfo::ScreenDisplayUpdate(ScreenDisplayUpdate { raw: latin1(field) })
}

fn decode_coordination(field: &[u8]) -> Result<CoordinationInfo, DecodeError> {
    if field.first() == Some(&b'u') {
        trace!("screen display update field");
        return Ok(screen_display_update(field));
    }
    if field.len() < COORDINATION_LEN {
        return Err(DecodeError::MalformedComposite {
            field: "coordination number/card return flag/printer flag",
            expected: COORDINATION_LEN,
            actual: field.len(),
        });
    }

    let card_return_flag = get_card_return_flag_description(char::from(field[1]))?;
    let printer_flag = get_printer_flag_description(char::from(field[2]))?;
    let printer_data = decode_printer_data(printer_flag.code, &field[COORDINATION_LEN..])?;

    Ok(CoordinationInfo::Standard {
        message_coordination_number: latin1(&field[..1]),
        card_return_flag,
        printer_flag,
        printer_data,
    })
}

/// Receipt and journal text collected across printer data chunks.
#[derive(Default)]
struct PrinterMerge {
    receipt: Option<String>,
    journal: Option<String>,
    /// Both printers were set from one chunk and nothing has diverged since.
    shared: bool,
}

impl PrinterMerge {
    fn append(slot: &mut Option<String>, text: &[u8]) {
        slot.get_or_insert_with(String::new).push_str(&latin1(text));
    }

    fn finish(self) -> PrinterData {
        match (self.receipt, self.journal) {
            (None, None) => PrinterData::None,
            (Some(receipt), None) => PrinterData::Receipt(receipt),
            (None, Some(journal)) => PrinterData::Journal(journal),
            (Some(text), Some(_)) if self.shared => PrinterData::Both(text),
            (Some(receipt), Some(journal)) => PrinterData::ReceiptAndJournal { receipt, journal },
        }
    }
}

fn decode_printer_data(printer_flag: char, payload: &[u8]) -> Result<PrinterData, DecodeError> {
    let mut chunks = split_groups(payload).into_iter();
    let mut merge = PrinterMerge::default();

    if let Some(first) = chunks.next() {
        match printer_flag {
            '1' => PrinterMerge::append(&mut merge.journal, first),
            '2' => PrinterMerge::append(&mut merge.receipt, first),
            '3' => {
                PrinterMerge::append(&mut merge.receipt, first);
                PrinterMerge::append(&mut merge.journal, first);
                merge.shared = true;
            }
            _ if !first.is_empty() => {
                return Err(DecodeError::MalformedComposite {
                    field: "printer data",
                    expected: 0,
                    actual: first.len(),
                })
            }
            _ => {}
        }
    }

    for chunk in chunks {
        let Some((&selector, text)) = chunk.split_first() else {
            return Err(DecodeError::MalformedComposite {
                field: "printer data chunk",
                expected: 1,
                actual: 0,
            });
        };
        let selector = CodeTable::PrinterSelector.describe(char::from(selector))?;
        match selector.code {
            '0' => PrinterMerge::append(&mut merge.receipt, text),
            _ => PrinterMerge::append(&mut merge.journal, text),
        }
        merge.shared = false;
    }

    Ok(merge.finish())
}

// ── Data Command subclasses ───────────────────────────────────────────────────

fn decode_interactive_response(
    subclass_field: &[u8],
    rest: Option<&[u8]>,
) -> Result<DataCommandPayload, DecodeError> {
    if subclass_field.len() < ITR_SUBCLASS_LEN {
        return Err(DecodeError::MalformedComposite {
            field: "display flag/active keys",
            expected: ITR_SUBCLASS_LEN,
            actual: subclass_field.len(),
        });
    }

    let mut tail = rest.map(|r| r.splitn(2, |&b| b == FS));
    let timer = tail.as_mut().and_then(Iterator::next);
    let data = tail.as_mut().and_then(Iterator::next);
    let (Some(timer), Some(data)) = (timer, data) else {
        return Err(DecodeError::TruncatedMessage {
            context: "interactive transaction response fields",
            needed: 6,
            available: 4 + usize::from(timer.is_some()),
        });
    };

    Ok(DataCommandPayload::InteractiveTransactionResponse(
        InteractiveTransactionResponse {
            display_flag: char::from(subclass_field[1]),
            active_keys: latin1(&subclass_field[2..ITR_SUBCLASS_LEN]),
            screen_timer_field: latin1(timer),
            screen_data_field: latin1(data),
        },
    ))
}

fn decode_encryption_key_info(
    subclass_field: &[u8],
    rest: Option<&[u8]>,
) -> Result<DataCommandPayload, DecodeError> {
    let modifier = CodeTable::EncryptionKeyModifier
        .describe(second_char(subclass_field, "encryption key modifier")?)?;

    let Some(tail) = rest else {
        return Err(DecodeError::TruncatedMessage {
            context: "encryption key fields",
            needed: 5,
            available: 4,
        });
    };
    if tail.len() < KEY_LENGTH_WIDTH {
        return Err(DecodeError::MalformedComposite {
            field: "new key length",
            expected: KEY_LENGTH_WIDTH,
            actual: tail.len(),
        });
    }
    let (length, data) = tail.split_at(KEY_LENGTH_WIDTH);

    let info = EncryptionKeyInfo {
        modifier,
        new_key_length: latin1(length),
        new_key_data: latin1(data),
    };
    if info.declared_key_length() != Some(data.len()) {
        debug!(
            "key length {} differs from {} data bytes; keeping data verbatim",
            info.new_key_length,
            data.len()
        );
    }
    Ok(DataCommandPayload::ExtendedEncryptionKeyInfo(info))
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn check_declared_length(declared: usize, actual: usize) -> Result<(), DecodeError> {
    if declared > actual {
        Err(DecodeError::TruncatedMessage {
            context: "declared message bytes",
            needed: declared,
            available: actual,
        })
    } else if declared < actual {
        Err(DecodeError::LengthMismatch { declared, actual })
    } else {
        Ok(())
    }
}

fn require_fields(fields: &[&[u8]], needed: usize, context: &'static str) -> Result<(), DecodeError> {
    if fields.len() < needed {
        Err(DecodeError::TruncatedMessage {
            context,
            needed,
            available: fields.len(),
        })
    } else {
        Ok(())
    }
}

fn first_char(field: &[u8], context: &'static str) -> Result<char, DecodeError> {
    field
        .first()
        .map(|&b| char::from(b))
        .ok_or(DecodeError::TruncatedMessage {
            context,
            needed: 1,
            available: 0,
        })
}

fn second_char(field: &[u8], context: &'static str) -> Result<char, DecodeError> {
    field
        .get(1)
        .map(|&b| char::from(b))
        .ok_or(DecodeError::TruncatedMessage {
            context,
            needed: 2,
            available: field.len(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::segment::{MockScreenBoundary, RecordSpan};
    use crate::tables::CodeDescription;

    fn reply(message: &[u8]) -> TransactionReply {
        match parse(message, None).unwrap() {
            DecodedMessage::TransactionReply(r) => r,
            other => panic!("expected transaction reply, got {other:?}"),
        }
    }

    fn printer_data(message: &[u8]) -> PrinterData {
        match reply(message).coordination_info {
            CoordinationInfo::Standard { printer_data, .. } => printer_data,
            other => panic!("expected standard coordination, got {other:?}"),
        }
    }

    fn payload(message: &[u8]) -> DataCommandPayload {
        match parse(message, None).unwrap() {
            DecodedMessage::DataCommand(d) => d.subclass_payload,
            other => panic!("expected data command, got {other:?}"),
        }
    }

    // ── Dispatch and length checks ───────────────────────────────────────────

    #[test]
    fn test_unknown_class_reports_leading_char() {
        let result = parse(b"22\x1c000\x1c000\x1c2", None);
        assert_eq!(result, Err(DecodeError::UnknownMessageClass('2')));
    }

    #[test]
    fn test_empty_message_is_truncated() {
        assert!(matches!(parse(b"", None), Err(DecodeError::TruncatedMessage { .. })));
    }

    #[test]
    fn test_declared_length_longer_than_body_is_truncated() {
        let result = parse(b"10\x1c000\x1c000\x1c2", Some(20));
        assert_eq!(
            result,
            Err(DecodeError::TruncatedMessage {
                context: "declared message bytes",
                needed: 20,
                available: 12,
            })
        );
    }

    #[test]
    fn test_declared_length_shorter_than_body_is_mismatch() {
        let result = parse(b"10\x1c000\x1c000\x1c2", Some(4));
        assert_eq!(result, Err(DecodeError::LengthMismatch { declared: 4, actual: 12 }));
    }

    #[test]
    fn test_host_message_shorter_than_prefix_is_truncated() {
        assert!(matches!(
            parse_host_message(b"\x00"),
            Err(DecodeError::TruncatedMessage { .. })
        ));
    }

    // ── Terminal Command ─────────────────────────────────────────────────────

    #[test]
    fn test_terminal_command_missing_code_field() {
        let result = parse(b"10\x1c000\x1c000", None);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedMessage {
                context: "terminal command fields",
                needed: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_terminal_command_unknown_code() {
        let result = parse(b"10\x1c000\x1c000\x1c9", None);
        assert_eq!(result, Err(DecodeError::UnknownCommandCode('9')));
    }

    #[test]
    fn test_terminal_command_empty_code_is_truncated() {
        let result = parse(b"10\x1c000\x1c000\x1c", None);
        assert!(matches!(
            result,
            Err(DecodeError::TruncatedMessage { context: "command code", .. })
        ));
    }

    // ── Transaction Reply ────────────────────────────────────────────────────

    #[test]
    fn test_reply_short_composite_is_malformed() {
        let result = parse(b"40\x1c000\x1c\x1c133\x1c\x1c0775906\x1c200", None);
        assert_eq!(
            result,
            Err(DecodeError::MalformedComposite {
                field: "serial number/function identifier/screen number",
                expected: 8,
                actual: 7,
            })
        );
    }

    #[test]
    fn test_reply_unknown_function_identifier() {
        let result = parse(b"40\x1c000\x1c\x1c133\x1c\x1c07756064\x1c200", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::FunctionIdentifier,
                code: '6',
            })
        );
    }

    #[test]
    fn test_reply_without_coordination_field_is_truncated() {
        let result = parse(b"40\x1c000\x1c\x1c133\x1c\x1c07759064", None);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedMessage {
                context: "transaction reply fields",
                needed: 7,
                available: 6,
            })
        );
    }

    #[test]
    fn test_reply_short_coordination_field_is_malformed() {
        let result = parse(b"40\x1c000\x1c\x1c133\x1c\x1c07759064\x1c20", None);
        assert!(matches!(
            result,
            Err(DecodeError::MalformedComposite { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_reply_unknown_card_return_flag() {
        let result = parse(b"40\x1c000\x1c\x1c133\x1c\x1c07759064\x1c290", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::CardReturnFlag,
                code: '9',
            })
        );
    }

    #[test]
    fn test_reply_trailing_garbage_in_composite_is_malformed() {
        let result = parse(b"40\x1c000\x1c\x1c142\x1c\x1c28805025X\x1c200", None);
        assert!(matches!(result, Err(DecodeError::MalformedComposite { actual: 9, .. })));
    }

    #[test]
    fn test_screen_display_update_in_own_field() {
        // Arrange
        let message = b"40\x1c000\x1c\x1c142\x1c\x1c28805025\x1cu09621000\x1d0000078SCREEN DATA";

        // Act
        let info = reply(message).coordination_info;

        // Assert
        assert_eq!(
            info,
            CoordinationInfo::ScreenDisplayUpdate(ScreenDisplayUpdate {
                raw: "u09621000\u{1d}0000078SCREEN DATA".to_string(),
            })
        );
    }

    #[test]
    fn test_printer_flag_three_sets_both() {
        let data = printer_data(b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG03SHARED");
        assert_eq!(data, PrinterData::Both("SHARED".to_string()));
    }

    #[test]
    fn test_follow_on_chunk_splits_shared_text() {
        // Arrange
        let message = b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG03SHARED\x1d1MORE";

        // Act
        let data = printer_data(message);

        // Assert
        assert_eq!(
            data,
            PrinterData::ReceiptAndJournal {
                receipt: "SHARED".to_string(),
                journal: "SHAREDMORE".to_string(),
            }
        );
    }

    #[test]
    fn test_follow_on_receipt_chunk_under_journal_flag() {
        let data = printer_data(b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG01JOURNAL\x1d0RECEIPT");
        assert_eq!(data.journal(), Some("JOURNAL"));
        assert_eq!(data.receipt(), Some("RECEIPT"));
    }

    #[test]
    fn test_flag_zero_rejects_printer_text() {
        // Arrange
        let message = b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG00LOST TEXT";

        // Act
        let result = parse(message, None);

        // Assert
        assert_eq!(
            result,
            Err(DecodeError::MalformedComposite {
                field: "printer data",
                expected: 0,
                actual: 9,
            })
        );
    }

    #[test]
    fn test_flag_zero_accepts_follow_on_chunk() {
        let data = printer_data(b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG00\x1d0RECEIPT");
        assert_eq!(data, PrinterData::Receipt("RECEIPT".to_string()));
    }

    #[test]
    fn test_unknown_printer_selector() {
        let result = parse(b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG02R\x1d7X", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::PrinterSelector,
                code: '7',
            })
        );
    }

    #[test]
    fn test_empty_follow_on_chunk_is_malformed() {
        let result = parse(b"40\x1c000\x1c\x1c142\x1c\x1c28355025\x1cG02R\x1d", None);
        assert!(matches!(
            result,
            Err(DecodeError::MalformedComposite { field: "printer data chunk", .. })
        ));
    }

    // ── Data Command ─────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_data_command_subclass() {
        let result = parse(b"30\x1c000\x1c000\x1c9", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::DataCommandSubclass,
                code: '9',
            })
        );
    }

    #[test]
    fn test_unknown_customization_identifier() {
        let result = parse(b"30\x1c000\x1c000\x1c13\x1cDATA", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::CustomizationIdentifier,
                code: '3',
            })
        );
    }

    #[test]
    fn test_customization_without_identifier_is_truncated() {
        let result = parse(b"30\x1c000\x1c000\x1c1", None);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedMessage {
                context: "customization identifier",
                needed: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn test_state_load_without_tail_has_no_states() {
        let payload = payload(b"30\x1c000\x1c000\x1c12");
        assert_eq!(payload, DataCommandPayload::StateTablesLoad { states: Vec::new() });
    }

    #[test]
    fn test_interactive_response_short_flags_is_malformed() {
        let result = parse(b"30\x1c000\x1c000\x1c21011\x1c074\x1cDATA", None);
        assert!(matches!(
            result,
            Err(DecodeError::MalformedComposite { expected: 12, actual: 5, .. })
        ));
    }

    #[test]
    fn test_interactive_response_without_data_field_is_truncated() {
        let result = parse(b"30\x1c000\x1c000\x1c210110011000\x1c074", None);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedMessage {
                context: "interactive transaction response fields",
                needed: 6,
                available: 5,
            })
        );
    }

    #[test]
    fn test_interactive_response_keeps_separators_in_screen_data() {
        let payload = payload(b"30\x1c000\x1c000\x1c210110011000\x1c074\x1cA\x1cB");
        let DataCommandPayload::InteractiveTransactionResponse(itr) = payload else {
            panic!("expected interactive response");
        };
        assert_eq!(itr.screen_data_field, "A\u{1c}B");
    }

    #[test]
    fn test_encryption_key_unknown_modifier() {
        let result = parse(b"30\x1c000\x1c000\x1c49\x1c030", None);
        assert_eq!(
            result,
            Err(DecodeError::UnknownCode {
                table: CodeTable::EncryptionKeyModifier,
                code: '9',
            })
        );
    }

    #[test]
    fn test_encryption_key_short_length_is_malformed() {
        let result = parse(b"30\x1c000\x1c000\x1c42\x1c03", None);
        assert_eq!(
            result,
            Err(DecodeError::MalformedComposite {
                field: "new key length",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_encryption_key_modifier_one() {
        let payload = payload(b"30\x1c000\x1c000\x1c41\x1c016ABCDEFABCDEFABCD");
        let DataCommandPayload::ExtendedEncryptionKeyInfo(info) = payload else {
            panic!("expected encryption key info");
        };
        assert_eq!(
            info.modifier,
            CodeDescription::new('1', "Decipher new master key with current master key")
        );
        assert_eq!(info.declared_key_length(), Some(16));
        assert_eq!(info.new_key_data, "ABCDEFABCDEFABCD");
    }

    // ── Configuration and strategy ───────────────────────────────────────────

    #[test]
    fn test_screen_load_delegates_to_installed_boundary() {
        // Arrange
        let mut boundary = MockScreenBoundary::new();
        boundary.expect_select().times(1).returning(|_| None);
        boundary
            .expect_next_record()
            .times(2)
            .returning(|_, start| RecordSpan { end: start + 4, next: start + 4 });
        let decoder = Decoder::default().with_boundary(boundary);

        // Act
        let payload = match decoder.parse(b"30\x1c000\x1c000\x1c11\x1c001A002B", None).unwrap() {
            DecodedMessage::DataCommand(d) => d.subclass_payload,
            other => panic!("expected data command, got {other:?}"),
        };

        // Assert
        assert_eq!(
            payload,
            DataCommandPayload::ScreenDataLoad {
                screens: vec![
                    ScreenRecord("001A".to_string()),
                    ScreenRecord("002B".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_configured_fit_width_is_used() {
        // Arrange
        let mut config = DecoderConfig::default();
        config.records.fit_width = 7;
        let decoder = Decoder::new(&config);

        // Act
        let result = decoder.parse(b"30\x1c000\x1c000\x1c15\x1c000111\x1c000222", None);

        // Assert
        let Ok(DecodedMessage::DataCommand(cmd)) = result else {
            panic!("expected data command, got {result:?}");
        };
        assert_eq!(
            cmd.subclass_payload,
            DataCommandPayload::FitDataLoad {
                entries: vec![
                    FitRecord("000111".to_string()),
                    FitRecord("000222".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_parse_frames_decodes_each_frame() {
        // Arrange
        let buffer = b"\x00\x0c10\x1c000\x1c000\x1c2\x00\x0c10\x1c000\x1c000\x1c3\x00\x05";
        let decoder = Decoder::default();

        // Act
        let results: Vec<_> = decoder.parse_frames(buffer).collect();

        // Assert
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().class_name(), "Terminal Command");
        assert_eq!(results[1].as_ref().unwrap().luno(), "000");
        assert!(matches!(results[2], Err(DecodeError::TruncatedMessage { .. })));
    }
}
