/// Helvetica advance widths for printable ASCII (0x20..=0x7E), in 1/1000 em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

/// Advance width of `ch` in 1/1000 em. Bold and oblique faces are measured
/// with the regular table.
pub(crate) fn char_width(ch: char) -> u16 {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        HELVETICA[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_one_width() {
        for digit in '0'..='9' {
            assert_eq!(char_width(digit), 556);
        }
        assert_eq!(char_width(' '), 278);
        assert_eq!(char_width('~'), 584);
        assert_eq!(char_width('é'), FALLBACK_WIDTH);
    }
}
