use std::fmt;

use crate::sync::{AtomicU64, Ordering};

use super::Register;

/// A register backed by a single `AtomicU64`.
///
/// All accesses use [`Ordering::SeqCst`], so the operations performed on a
/// register file of `AtomicRegister`s are sequentially consistent. This is
/// enough for the producer/consumer protocol: a write happens before the
/// transaction describing it is put into the mailbox, and the mailbox
/// hand-off itself synchronizes the two tasks.
///
/// # Examples
///
/// ```
/// use regbox::register::{AtomicRegister, Register};
///
/// let register = AtomicRegister::new();
/// register.write(0xff);
/// assert_eq!(register.read(), 0xff);
/// ```
pub struct AtomicRegister {
    word: AtomicU64,
}

impl Default for AtomicRegister {
    fn default() -> Self {
        AtomicRegister::new()
    }
}

impl fmt::Debug for AtomicRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicRegister")
            .field("word", &self.read())
            .finish()
    }
}

impl Register for AtomicRegister {
    fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
        }
    }

    fn read(&self) -> u64 {
        self.word.load(Ordering::SeqCst)
    }

    fn write(&self, word: u64) {
        self.word.store(word, Ordering::SeqCst)
    }
}
