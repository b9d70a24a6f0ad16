//! Percent-encoding for URI path segments and query values (RFC 3986).

use std::fmt::Write;

/// Percent-encodes everything outside the RFC 3986 unreserved set.
///
/// Multi-byte characters are encoded byte by byte from their UTF-8 form.
#[must_use]
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for c in value.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).as_bytes() {
                    let _ = write!(out, "%{b:02X}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(percent_encode("Az09-_.~"), "Az09-_.~");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(percent_encode("a b/c:d"), "a%20b%2Fc%3Ad");
        assert_eq!(percent_encode("x=y&z+"), "x%3Dy%26z%2B");
    }

    #[test]
    fn multibyte_characters_are_escaped_per_byte() {
        assert_eq!(percent_encode("é"), "%C3%A9");
    }
}
