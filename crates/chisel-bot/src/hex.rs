use std::fmt::Write as _;

/// Format bytes as a classic 16-per-line offset/hex/ASCII dump, for
/// debug-level payload logging.
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "  {:04x} ", line * 16);
        for byte in chunk {
            let _ = write!(out, " {:02x}", byte);
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  ");
        for &byte in chunk {
            out.push(if (0x20..0x7f).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_line_is_padded() {
        let dump = hexdump(b"AB\x00");
        let expected = format!("  0000  41 42 00{}  AB.\n", "   ".repeat(13));
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_multiple_lines_carry_offsets() {
        let dump = hexdump(&[0x41; 20]);
        let mut lines = dump.lines();
        assert!(lines.next().unwrap().starts_with("  0000 "));
        assert!(lines.next().unwrap().starts_with("  0010 "));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(hexdump(&[]).is_empty());
    }
}
