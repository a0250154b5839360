//! A1-style cell reference decoding.

/// Decode a reference like `"C7"` into a 1-based (row, col) pair.
///
/// An empty or unparseable reference decodes to the `(0, 0)` sentinel,
/// which every downstream consumer treats as invalid rather than a real
/// address.
pub fn parse_cell_ref(ref_text: &str) -> (u32, u32) {
    let letters_len = ref_text
        .bytes()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    let (letters, digits) = ref_text.split_at(letters_len);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (0, 0);
    }
    let Ok(row) = digits.parse::<u32>() else {
        return (0, 0);
    };
    (row, column_index(letters))
}

/// Decode column letters in base 26: A=1 … Z=26, AA=27, …
///
/// Returns 0 for an empty or non-letter string, and for a string long
/// enough to overflow (the sentinel again, never a panic).
pub fn column_index(letters: &str) -> u32 {
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return 0;
        }
        let next = col
            .checked_mul(26)
            .and_then(|c| c.checked_add((b - b'A' + 1) as u32));
        match next {
            Some(c) => col = c,
            None => return 0,
        }
    }
    col
}

/// Encode a 1-based column number as letters: 1="A", 27="AA", …
pub fn column_letters(mut col: u32) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        out.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), (1, 1));
        assert_eq!(parse_cell_ref("C7"), (7, 3));
        assert_eq!(parse_cell_ref("AA10"), (10, 27));
        assert_eq!(parse_cell_ref("XFD1048576"), (1_048_576, 16_384));
    }

    #[test]
    fn test_invalid_ref_is_sentinel() {
        assert_eq!(parse_cell_ref(""), (0, 0));
        assert_eq!(parse_cell_ref("7"), (0, 0));
        assert_eq!(parse_cell_ref("A"), (0, 0));
        assert_eq!(parse_cell_ref("a1"), (0, 0));
        assert_eq!(parse_cell_ref("A1B"), (0, 0));
    }

    #[test]
    fn test_overlong_column_is_sentinel() {
        // Enough letters to overflow the base-26 accumulator.
        assert_eq!(column_index("ZZZZZZZZ"), 0);
        assert_eq!(parse_cell_ref("ZZZZZZZZ1"), (0, 0));
    }

    #[test]
    fn test_column_round_trip() {
        for letters in ["A", "Z", "AA", "AZ", "BA"] {
            assert_eq!(column_letters(column_index(letters)), letters);
        }
        assert_eq!(column_index("A"), 1);
        assert_eq!(column_index("Z"), 26);
        assert_eq!(column_index("AA"), 27);
    }
}
