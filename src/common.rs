//! Random types and utilties used by the library.

mod channel;

pub use channel::{Channel, InvalidChannelName};

use std::borrow::Cow;

/// Checks if `value` needs to be unescaped by looking for escaped characters.
///
/// If it must be unescaped, then it must reallocate and will return an owned string.
/// Otherwise, it returns a borrow of the original `value`.
pub fn maybe_unescape<'a>(value: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
  let mut value: Cow<'_, str> = value.into();
  for i in 0..value.len() {
    if value.as_bytes()[i] == b'\\' {
      value = Cow::Owned(actually_unescape(&value, i));
      break;
    }
  }
  value
}

#[inline]
fn actually_unescape(input: &str, start: usize) -> String {
  let mut out = String::with_capacity(input.len());
  out.push_str(&input[..start]);

  let mut escape = false;
  for char in input[start..].chars() {
    match char {
      '\\' if escape => {
        out.push('\\');
        escape = false;
      }
      '\\' => escape = true,
      ':' if escape => {
        out.push(';');
        escape = false;
      }
      's' if escape => {
        out.push(' ');
        escape = false;
      }
      'r' if escape => {
        out.push('\r');
        escape = false;
      }
      'n' if escape => {
        out.push('\n');
        escape = false;
      }
      // unknown escapes drop the backslash
      c if escape => {
        out.push(c);
        escape = false;
      }
      c => out.push(c),
    }
  }

  out
}
