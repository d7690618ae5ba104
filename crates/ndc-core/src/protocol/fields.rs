//! Field Separator and Group Separator splitting.
//!
//! Message bodies are sequences of variable-length fields delimited by the
//! Field Separator (FS, `0x1C`).  Empty fields are significant: two adjacent
//! separators yield an empty field, and transaction replies routinely leave
//! the sequence number and notes-to-dispense fields empty.  A handful of
//! subfields (printer data, screen display updates) are further divided on the
//! Group Separator (GS, `0x1D`).

/// Field Separator.
pub const FS: u8 = 0x1C;

/// Group Separator.
pub const GS: u8 = 0x1D;

/// Escape sequence introducer.
pub const ESC: u8 = 0x1B;

/// Second byte of the `ESC \` string terminator.
pub const STRING_TERMINATOR: u8 = 0x5C;

/// Splits `bytes` on FS, preserving empty fields and source order.
///
/// An empty input yields a single empty field, so the result is never empty.
pub fn split_fields(bytes: &[u8]) -> Vec<&[u8]> {
    bytes.split(|&b| b == FS).collect()
}

/// Splits off the first `count` fields and returns them together with the
/// unsplit remainder after the `count`-th separator, if one exists.
///
/// Fewer than `count` fields are returned when the message runs out of
/// separators.
pub fn split_leading_fields(bytes: &[u8], count: usize) -> (Vec<&[u8]>, Option<&[u8]>) {
    let mut parts: Vec<&[u8]> = bytes.splitn(count + 1, |&b| b == FS).collect();
    let rest = if parts.len() > count { parts.pop() } else { None };
    (parts, rest)
}

/// Splits a single field on GS into its chunks.
pub fn split_groups(field: &[u8]) -> Vec<&[u8]> {
    field.split(|&b| b == GS).collect()
}

/// Joins fields with FS; the inverse of [`split_fields`].
pub fn join_fields(fields: &[&[u8]]) -> Vec<u8> {
    fields.join(&FS)
}

/// Copies a protocol byte range into text, one `char` per byte.
///
/// Protocol text is 8-bit; mapping each byte to the Unicode scalar of the same
/// value keeps the copy byte-for-byte and never fails.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
