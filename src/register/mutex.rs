use std::sync::PoisonError;

use crate::sync::Mutex;

use super::Register;

/// A register backed by a [`Mutex`].
///
/// Each access holds the lock of this register only, so a register file made
/// of `MutexRegister`s is locked per slot. It is **not** lock-free.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use regbox::register::{MutexRegister, Register};
///
/// let register = Arc::new(MutexRegister::new());
///
/// let writer = register.clone();
/// thread::spawn(move || writer.write(0x5a)).join().unwrap();
///
/// assert_eq!(register.read(), 0x5a);
/// ```
#[derive(Debug)]
pub struct MutexRegister {
    word: Mutex<u64>,
}

impl Default for MutexRegister {
    fn default() -> Self {
        MutexRegister::new()
    }
}

impl Register for MutexRegister {
    fn new() -> Self {
        Self {
            word: Mutex::new(0),
        }
    }

    fn read(&self) -> u64 {
        // A panic while holding the lock cannot leave a `u64` half written.
        *self.word.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, word: u64) {
        *self.word.lock().unwrap_or_else(PoisonError::into_inner) = word;
    }
}
