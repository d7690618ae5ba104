//! Codes selecting Terminal Command and Data Command variants.

/// Terminal command codes.
pub fn terminal_command(code: char) -> Option<&'static str> {
    match code {
        '2' => Some("Go out-of-service"),
        '3' => Some("Send Configuration ID"),
        '4' => Some("Send Supply Counters"),
        _ => None,
    }
}

/// Data command subclasses (first character of the subclass field).
pub fn data_command_subclass(code: char) -> Option<&'static str> {
    match code {
        '1' => Some("Customization Command"),
        '2' => Some("Interactive Transaction Response"),
        '4' => Some("Extended Encryption Key Information"),
        _ => None,
    }
}

/// Customization command message identifiers (second character).
pub fn customization_identifier(code: char) -> Option<&'static str> {
    match code {
        '1' => Some("Screen Data load"),
        '2' => Some("State Tables load"),
        '5' => Some("FIT Data load"),
        _ => None,
    }
}

/// Extended Encryption Key Information modifiers.
pub fn encryption_key_modifier(code: char) -> Option<&'static str> {
    match code {
        '1' => Some("Decipher new master key with current master key"),
        '2' => Some("Decipher new comms key with current master key"),
        '3' => Some("Decipher new MAC key with current master key"),
        '4' => Some("Decipher new MAC key with current comms key"),
        _ => None,
    }
}
