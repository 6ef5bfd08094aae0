//! Segmented code entry widget state.
//!
//! N single-character cells for numeric one-time codes. Owns the slot array,
//! the focused cell index and the disabled flag; the renderer in `ui` reads
//! them back. Callers are notified through the `on_change`/`on_complete`
//! callbacks, never by polling.

use std::fmt;

/// Fixed-length segmented code input.
///
/// Each slot holds either nothing or one decimal digit. The joined value is
/// the concatenation of filled slots in order, so it only reaches `len()`
/// characters when every slot is filled.
pub struct SegmentedCodeInput {
    slots: Vec<Option<char>>,
    focus: usize,
    disabled: bool,
    on_change: Option<Box<dyn FnMut(&str)>>,
    on_complete: Option<Box<dyn FnMut(&str)>>,
}

impl SegmentedCodeInput {
    /// Create an empty input with `length` cells (at least one).
    pub fn new(length: usize) -> Self {
        Self {
            slots: vec![None; length.max(1)],
            focus: 0,
            disabled: false,
            on_change: None,
            on_complete: None,
        }
    }

    /// Callback invoked with the joined value after every mutation.
    pub fn on_change(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Callback invoked with the full code each time an edit fills the last
    /// empty slot. Re-fires on later edits that leave the code complete.
    pub fn on_complete(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Joined value: filled digits in slot order, empty slots skipped.
    pub fn value(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    pub fn focused_slot(&self) -> usize {
        self.focus
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Type `input` into the focused cell.
    ///
    /// Only a single decimal digit is accepted: multi-character input (IME
    /// composition, key repeats delivered as strings) is dropped whole, and
    /// non-digits are filtered out before any slot is touched. Neither case
    /// mutates state or fires a callback.
    pub fn enter(&mut self, input: &str) {
        if self.disabled {
            return;
        }
        let mut chars = input.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return,
        };
        if !c.is_ascii_digit() {
            return;
        }

        self.slots[self.focus] = Some(c);
        self.notify_change();
        if self.focus + 1 < self.slots.len() {
            self.focus += 1;
        }
        self.notify_complete_if_full();
    }

    /// Backspace at the focused cell.
    ///
    /// A filled cell is cleared in place and focus stays put. An empty cell
    /// cascades: the previous cell is cleared and focus moves onto it. On an
    /// empty first cell this is a no-op. Backspace never completes the code.
    pub fn backspace(&mut self) {
        if self.disabled {
            return;
        }
        if self.slots[self.focus].is_some() {
            self.slots[self.focus] = None;
            self.notify_change();
        } else if self.focus > 0 {
            self.focus -= 1;
            self.slots[self.focus] = None;
            self.notify_change();
        }
    }

    /// Move focus one cell left; ignored on the first cell.
    pub fn move_left(&mut self) {
        if self.disabled {
            return;
        }
        if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Move focus one cell right; ignored on the last cell.
    pub fn move_right(&mut self) {
        if self.disabled {
            return;
        }
        if self.focus + 1 < self.slots.len() {
            self.focus += 1;
        }
    }

    /// Distribute pasted text across the cells.
    ///
    /// The text is truncated to the first `len()` characters and written
    /// index-aligned from cell 0 (never from the focused cell): character k
    /// goes into cell k when it is a digit, and a non-digit leaves cell k
    /// exactly as it was. Focus lands on the first empty cell, or the last
    /// cell when none remain.
    pub fn paste(&mut self, text: &str) {
        if self.disabled {
            return;
        }
        for (i, c) in text.chars().take(self.slots.len()).enumerate() {
            if c.is_ascii_digit() {
                self.slots[i] = Some(c);
            }
        }
        self.notify_change();
        self.focus = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .unwrap_or(self.slots.len() - 1);
        self.notify_complete_if_full();
    }

    /// Reset every cell and move focus back to the first one.
    ///
    /// Fires no callbacks; this is the caller-driven reset, not an edit.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.focus = 0;
    }

    fn notify_change(&mut self) {
        let value = self.value();
        if let Some(cb) = self.on_change.as_mut() {
            cb(&value);
        }
    }

    fn notify_complete_if_full(&mut self) {
        if !self.is_complete() {
            return;
        }
        let value = self.value();
        if let Some(cb) = self.on_complete.as_mut() {
            cb(&value);
        }
    }
}

impl fmt::Debug for SegmentedCodeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentedCodeInput")
            .field("slots", &self.slots)
            .field("focus", &self.focus)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(
        length: usize,
    ) -> (
        SegmentedCodeInput,
        Rc<RefCell<Vec<String>>>,
        Rc<RefCell<Vec<String>>>,
    ) {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(RefCell::new(Vec::new()));
        let input = SegmentedCodeInput::new(length)
            .on_change({
                let changes = changes.clone();
                move |v| changes.borrow_mut().push(v.to_string())
            })
            .on_complete({
                let completions = completions.clone();
                move |v| completions.borrow_mut().push(v.to_string())
            });
        (input, changes, completions)
    }

    #[test]
    fn test_starts_empty() {
        for n in [1, 4, 6, 10] {
            let input = SegmentedCodeInput::new(n);
            assert_eq!(input.len(), n);
            assert_eq!(input.value(), "");
            assert_eq!(input.focused_slot(), 0);
            assert!(!input.is_complete());
        }
    }

    #[test]
    fn test_zero_length_is_clamped_to_one() {
        let input = SegmentedCodeInput::new(0);
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn test_sequential_entry_completes_once() {
        let (mut input, changes, completions) = recorded(6);
        for c in ["1", "2", "3", "4", "5", "6"] {
            input.enter(c);
        }
        assert_eq!(
            *changes.borrow(),
            vec!["1", "12", "123", "1234", "12345", "123456"]
        );
        assert_eq!(*completions.borrow(), vec!["123456"]);
        assert!(input.is_complete());
    }

    #[test]
    fn test_digit_entry_advances_focus_except_on_last_slot() {
        let mut input = SegmentedCodeInput::new(3);
        input.enter("1");
        assert_eq!(input.focused_slot(), 1);
        input.enter("2");
        assert_eq!(input.focused_slot(), 2);
        input.enter("3");
        assert_eq!(input.focused_slot(), 2);
    }

    #[test]
    fn test_non_digit_keystroke_is_filtered_silently() {
        let (mut input, changes, completions) = recorded(4);
        input.enter("a");
        input.enter("!");
        input.enter(" ");
        assert_eq!(input.value(), "");
        assert_eq!(input.focused_slot(), 0);
        assert!(changes.borrow().is_empty());
        assert!(completions.borrow().is_empty());
    }

    #[test]
    fn test_multi_character_input_is_dropped_not_truncated() {
        let (mut input, changes, _) = recorded(4);
        input.enter("12");
        input.enter("99");
        assert_eq!(input.value(), "");
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_backspace_clears_filled_slot_in_place() {
        let (mut input, changes, _) = recorded(4);
        input.enter("1");
        input.enter("2");
        // Focus sits on slot 2; pull it back onto the filled slot 1.
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "1");
        assert_eq!(input.focused_slot(), 1);
        assert_eq!(changes.borrow().last().unwrap(), "1");
    }

    #[test]
    fn test_cascading_backspace_on_empty_slot() {
        // length=4, code "12__", focus on slot 2.
        let (mut input, changes, _) = recorded(4);
        input.enter("1");
        input.enter("2");
        assert_eq!(input.focused_slot(), 2);
        input.backspace();
        assert_eq!(input.value(), "1");
        assert_eq!(input.focused_slot(), 1);
        assert_eq!(changes.borrow().last().unwrap(), "1");
    }

    #[test]
    fn test_backspace_on_empty_first_slot_is_noop() {
        let (mut input, changes, completions) = recorded(4);
        input.backspace();
        assert_eq!(input.value(), "");
        assert_eq!(input.focused_slot(), 0);
        assert!(changes.borrow().is_empty());
        assert!(completions.borrow().is_empty());
    }

    #[test]
    fn test_backspace_never_completes() {
        let (mut input, _, completions) = recorded(2);
        input.enter("1");
        input.enter("2");
        assert_eq!(completions.borrow().len(), 1);
        input.backspace();
        assert_eq!(completions.borrow().len(), 1);
    }

    #[test]
    fn test_arrow_keys_move_focus_without_mutating() {
        let (mut input, changes, _) = recorded(3);
        input.enter("7");
        input.move_right();
        assert_eq!(input.focused_slot(), 2);
        input.move_right();
        assert_eq!(input.focused_slot(), 2);
        input.move_left();
        input.move_left();
        input.move_left();
        assert_eq!(input.focused_slot(), 0);
        assert_eq!(input.value(), "7");
        // Only the digit entry produced a change event.
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn test_paste_truncates_to_length() {
        let (mut input, _, completions) = recorded(6);
        input.paste("1234567890");
        assert_eq!(input.value(), "123456");
        assert_eq!(*completions.borrow(), vec!["123456"]);
    }

    #[test]
    fn test_paste_with_non_digit_leaves_target_slot_unchanged() {
        // Empty slot 2 stays empty: "12a456" writes around it.
        let (mut input, _, completions) = recorded(6);
        input.paste("12a456");
        assert_eq!(
            input.slots(),
            &[Some('1'), Some('2'), None, Some('4'), Some('5'), Some('6')]
        );
        assert_eq!(input.value(), "12456");
        assert!(completions.borrow().is_empty());
        assert_eq!(input.focused_slot(), 2);
    }

    #[test]
    fn test_paste_preserves_prior_slot_content_under_non_digit() {
        // Slot 2 already holds a digit, so the same paste completes the code.
        let (mut input, _, completions) = recorded(6);
        input.move_right();
        input.move_right();
        input.enter("3");
        input.paste("12a456");
        assert_eq!(input.value(), "123456");
        assert_eq!(*completions.borrow(), vec!["123456"]);
        assert_eq!(input.focused_slot(), 5);
    }

    #[test]
    fn test_paste_fills_from_start_not_from_focus() {
        let (mut input, _, _) = recorded(6);
        input.move_right();
        input.move_right();
        input.move_right();
        input.paste("12");
        assert_eq!(input.slots()[0], Some('1'));
        assert_eq!(input.slots()[1], Some('2'));
        assert_eq!(input.slots()[3], None);
        // Focus lands on the first empty slot, not where the paste happened.
        assert_eq!(input.focused_slot(), 2);
    }

    #[test]
    fn test_paste_of_pure_garbage_changes_nothing_but_reports() {
        let (mut input, changes, completions) = recorded(4);
        input.paste("abcd");
        assert_eq!(input.value(), "");
        assert_eq!(input.focused_slot(), 0);
        // The paste itself still counts as a mutation pass.
        assert_eq!(*changes.borrow(), vec![""]);
        assert!(completions.borrow().is_empty());
    }

    #[test]
    fn test_complete_refires_after_backspace_refill() {
        let (mut input, _, completions) = recorded(3);
        input.enter("1");
        input.enter("2");
        input.enter("3");
        input.backspace();
        input.enter("9");
        assert_eq!(*completions.borrow(), vec!["123", "129"]);
    }

    #[test]
    fn test_complete_refires_on_overtype_of_last_slot() {
        let (mut input, _, completions) = recorded(2);
        input.enter("4");
        input.enter("2");
        input.enter("7");
        assert_eq!(*completions.borrow(), vec!["42", "47"]);
    }

    #[test]
    fn test_disabled_suppresses_all_operations() {
        let (mut input, changes, completions) = recorded(4);
        input.enter("1");
        input.set_disabled(true);
        input.enter("2");
        input.backspace();
        input.paste("9999");
        input.move_left();
        input.move_right();
        assert_eq!(input.value(), "1");
        assert_eq!(input.focused_slot(), 1);
        assert_eq!(changes.borrow().len(), 1);
        assert!(completions.borrow().is_empty());
        input.set_disabled(false);
        input.enter("2");
        assert_eq!(input.value(), "12");
    }

    #[test]
    fn test_clear_resets_without_callbacks() {
        let (mut input, changes, completions) = recorded(3);
        input.enter("1");
        input.enter("2");
        input.enter("3");
        let changes_before = changes.borrow().len();
        let completions_before = completions.borrow().len();
        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.focused_slot(), 0);
        assert!(!input.is_complete());
        assert_eq!(changes.borrow().len(), changes_before);
        assert_eq!(completions.borrow().len(), completions_before);
    }

    #[test]
    fn test_single_cell_input() {
        let (mut input, changes, completions) = recorded(1);
        input.enter("5");
        assert_eq!(input.focused_slot(), 0);
        assert_eq!(*changes.borrow(), vec!["5"]);
        assert_eq!(*completions.borrow(), vec!["5"]);
        input.backspace();
        assert_eq!(input.value(), "");
    }
}
