//! Notification filtering
//!
//! Decides whether a pushed notification is stored, and how the wearer is
//! alerted:
//!
//! | icon        | verdict                    |
//! |-------------|----------------------------|
//! | 1 (call)    | always accepted, ringing   |
//! | 2 (cancel)  | never stored, stops ringing|
//! | other       | rejected if only whitespace|

use heapless::String;
use inkwatch_protocol::{Notification, MAX_TEXT_LEN};

/// What to do with a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Store and alert; `call` selects the call vibration and ringing
    Accept { call: bool },
    /// A ringing call ended
    CancelCall,
    /// Nothing worth showing
    Reject,
}

/// Classify a notification, normalizing its text in place
///
/// Newlines, tabs and carriage returns become spaces so the text wraps as
/// one paragraph on the panel.
pub fn classify(notification: &mut Notification) -> Verdict {
    if notification.is_call_cancel() {
        return Verdict::CancelCall;
    }

    notification.text = normalize(&notification.text);

    if notification.is_call() {
        return Verdict::Accept { call: true };
    }

    if notification.text.chars().all(char::is_whitespace) {
        Verdict::Reject
    } else {
        Verdict::Accept { call: false }
    }
}

/// Replace line-breaking control characters with spaces
pub fn normalize(text: &str) -> String<MAX_TEXT_LEN> {
    let mut out = String::new();
    for c in text.chars() {
        let c = match c {
            '\n' | '\t' | '\r' => ' ',
            other => other,
        };
        // Same byte length as the input, always fits
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
