//! Row buffer
//!
//! One row of program memory as it is being assembled: `N` words plus the
//! word address of the first one. The buffer lives for the whole session
//! and is cleared back to the erased value instead of being reallocated.

use hexdrop_hal::ERASED_WORD;

/// Fixed-size, address-aligned run of program words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<const N: usize> {
    base: u32,
    words: [u16; N],
}

impl<const N: usize> Row<N> {
    const NONEMPTY: () = assert!(N > 0, "a row holds at least one word");

    /// Row size in words, as an address stride
    pub const STRIDE: u32 = N as u32;

    /// Create a blank row at `base`
    pub const fn new(base: u32) -> Self {
        let () = Self::NONEMPTY;
        Self {
            base,
            words: [ERASED_WORD; N],
        }
    }

    /// Word address of the first word
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Move the row to a new base address
    pub fn set_base(&mut self, base: u32) {
        self.base = base;
    }

    /// Words in row order
    pub fn words(&self) -> &[u16; N] {
        &self.words
    }

    /// Store `word` at row offset `index`
    pub fn set_word(&mut self, index: usize, word: u16) {
        self.words[index] = word;
    }

    /// Check whether every word is still erased
    pub fn is_blank(&self) -> bool {
        self.words.iter().fold(ERASED_WORD, |acc, &word| acc & word) == ERASED_WORD
    }

    /// Reset every word to the erased value
    pub fn clear(&mut self) {
        self.words = [ERASED_WORD; N];
    }
}
