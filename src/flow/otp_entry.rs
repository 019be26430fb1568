pub const OTP_LEN: usize = 6;

/// Six single-digit input cells plus a focus index. Each cell holds
/// zero or one digit; the composed code is complete only when every
/// cell is filled.
#[derive(Debug, Clone)]
pub struct OtpEntry {
    cells: [Option<char>; OTP_LEN],
    focus: usize,
}

impl OtpEntry {
    pub fn new() -> Self {
        Self {
            cells: [None; OTP_LEN],
            focus: 0,
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    /// Type a character into the focused cell. Non-digits are rejected
    /// outright: no cell changes, focus stays put. A digit fills the
    /// cell and advances focus one cell (capped at the last cell).
    pub fn press_key(&mut self, ch: char) {
        if !ch.is_ascii_digit() {
            return;
        }
        self.cells[self.focus] = Some(ch);
        self.focus = (self.focus + 1).min(OTP_LEN - 1);
    }

    /// Backspace in a filled cell clears it in place; in an empty cell
    /// it only moves focus back one cell.
    pub fn press_backspace(&mut self) {
        if self.cells[self.focus].is_some() {
            self.cells[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// All-or-nothing paste: empty or non-digit text is ignored
    /// entirely; otherwise up to six leading digits land one per cell
    /// from cell 0 and focus moves just past the last filled cell.
    pub fn paste(&mut self, text: &str) {
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return;
        }

        self.cells = [None; OTP_LEN];
        let mut filled = 0;
        for (i, ch) in text.chars().take(OTP_LEN).enumerate() {
            self.cells[i] = Some(ch);
            filled = i + 1;
        }
        self.focus = filled.min(OTP_LEN - 1);
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// The composed 6-digit code, only available once complete.
    pub fn code(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        Some(self.cells.iter().flatten().collect())
    }

    /// Clears every cell and returns focus to the first one. Used on
    /// resend and on flow restart.
    pub fn reset(&mut self) {
        self.cells = [None; OTP_LEN];
        self.focus = 0;
    }
}

impl Default for OtpEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_fill_and_advance_focus() {
        let mut entry = OtpEntry::new();
        for (i, ch) in "123456".chars().enumerate() {
            assert_eq!(entry.focus(), i.min(OTP_LEN - 1));
            entry.press_key(ch);
            assert_eq!(entry.focus(), (i + 1).min(OTP_LEN - 1));
        }
        assert!(entry.is_complete());
        assert_eq!(entry.code().as_deref(), Some("123456"));
        // Focus never leaves the last cell.
        assert_eq!(entry.focus(), 5);
    }

    #[test]
    fn non_digit_keystrokes_are_rejected() {
        let mut entry = OtpEntry::new();
        entry.press_key('1');
        for ch in ['a', ' ', '-', 'x', '\n'] {
            entry.press_key(ch);
        }
        assert_eq!(entry.focus(), 1);
        assert_eq!(entry.cell(0), Some('1'));
        assert_eq!(entry.cell(1), None);
    }

    #[test]
    fn backspace_on_empty_cell_moves_focus_back() {
        let mut entry = OtpEntry::new();
        entry.press_key('1');
        entry.press_key('2');
        // Focus is on empty cell 2.
        entry.press_backspace();
        assert_eq!(entry.focus(), 1);
        // Cell 1 keeps its digit; only focus moved.
        assert_eq!(entry.cell(1), Some('2'));
    }

    #[test]
    fn backspace_on_filled_cell_clears_in_place() {
        let mut entry = OtpEntry::new();
        entry.paste("123456");
        entry.press_backspace();
        assert_eq!(entry.cell(5), None);
        assert_eq!(entry.focus(), 5);
    }

    #[test]
    fn backspace_at_first_cell_is_a_noop() {
        let mut entry = OtpEntry::new();
        entry.press_backspace();
        assert_eq!(entry.focus(), 0);
    }

    #[test]
    fn paste_full_code() {
        let mut entry = OtpEntry::new();
        entry.paste("123456");
        for (i, expected) in "123456".chars().enumerate() {
            assert_eq!(entry.cell(i), Some(expected));
        }
        assert_eq!(entry.focus(), 5);
        assert!(entry.is_complete());
    }

    #[test]
    fn paste_with_non_digit_is_ignored_entirely() {
        let mut entry = OtpEntry::new();
        entry.press_key('9');
        entry.paste("12a456");
        assert_eq!(entry.cell(0), Some('9'));
        assert_eq!(entry.cell(1), None);
        assert_eq!(entry.focus(), 1);
    }

    #[test]
    fn paste_empty_is_ignored() {
        let mut entry = OtpEntry::new();
        entry.paste("");
        assert_eq!(entry.focus(), 0);
        assert!(!entry.is_complete());
    }

    #[test]
    fn partial_paste_focuses_next_empty_cell() {
        let mut entry = OtpEntry::new();
        entry.paste("123");
        assert_eq!(entry.cell(2), Some('3'));
        assert_eq!(entry.cell(3), None);
        assert_eq!(entry.focus(), 3);
        assert!(!entry.is_complete());
    }

    #[test]
    fn overlong_paste_takes_leading_six() {
        let mut entry = OtpEntry::new();
        entry.paste("12345678");
        assert_eq!(entry.code().as_deref(), Some("123456"));
        assert_eq!(entry.focus(), 5);
    }

    #[test]
    fn code_unavailable_until_complete() {
        let mut entry = OtpEntry::new();
        entry.paste("12345");
        assert_eq!(entry.code(), None);
    }

    #[test]
    fn reset_clears_cells_and_focus() {
        let mut entry = OtpEntry::new();
        entry.paste("123456");
        entry.reset();
        assert_eq!(entry.focus(), 0);
        assert!(!entry.is_complete());
        assert_eq!(entry.cell(0), None);
    }
}
