//! Flags carried by the Transaction Reply command.

/// Function identifier: what the terminal does with the reply.
pub fn function_identifier(code: char) -> Option<&'static str> {
    match code {
        '1' | '7' => Some("Deposit and print"),
        '2' | '8' => Some("Dispense and print"),
        '3' | '9' => Some("Display and print"),
        '4' => Some("Print immediate"),
        '5' => Some("Set next state and print"),
        'A' => Some("Eject card and dispense and print (card before cash)"),
        'B' | 'C' => Some("Parallel dispense and print and card eject"),
        _ => None,
    }
}

/// Card return flag: when the card goes back to the customer.
pub fn card_return_flag(code: char) -> Option<&'static str> {
    match code {
        '0' => Some("Return card during the Close state"),
        '1' => Some("Retain card during the Close state"),
        '4' => Some("Return card while processing the transaction reply"),
        _ => None,
    }
}

/// Printer flag: which printers receive the first printer data chunk.
pub fn printer_flag(code: char) -> Option<&'static str> {
    match code {
        '0' => Some("Do not print"),
        '1' => Some("Print on journal printer only"),
        '2' => Some("Print on receipt printer only"),
        '3' => Some("Print on receipt and journal printer"),
        _ => None,
    }
}

/// Selector that opens every printer data chunk after the first.
pub fn printer_selector(code: char) -> Option<&'static str> {
    match code {
        '0' => Some("Receipt printer"),
        '1' => Some("Journal printer"),
        _ => None,
    }
}
