//! Make server-supplied text safe to print.
//!
//! Message bodies, names and error strings come from other users via the
//! backend. Escape sequences in them could rewrite the terminal, so they are
//! stripped before display.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';

fn is_disallowed_control(c: char) -> bool {
    match c {
        '\n' | '\t' | '\r' => false,
        '\x00'..='\x1f' | '\x7f' | '\u{80}'..='\u{9f}' => true,
        _ => false,
    }
}

/// Strip ANSI escape sequences and control characters other than newline,
/// tab and carriage return.
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(|c| c == ESC || is_disallowed_control(c)) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            match chars.next() {
                // CSI: parameters end at a final byte in 0x40..=0x7e.
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC/DCS/APC/PM/SOS: terminated by BEL or ESC \.
                Some(']' | 'P' | '_' | '^' | 'X') => {
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if c == '\u{9b}' {
            for next in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&next) {
                    break;
                }
            }
        } else if !is_disallowed_control(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
