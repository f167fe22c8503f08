//! Single-word registers, the slots of a
//! [`RegisterFile`](crate::register_file::RegisterFile).
//!
//! See [`MutexRegister`] and [`AtomicRegister`].
mod atomic;
pub use self::atomic::AtomicRegister;
mod mutex;
pub use self::mutex::MutexRegister;

/// A shared-memory register holding a single 64-bit word.
///
/// Every `read` and `write` is a single indivisible access, so a reader never
/// observes a partially written word.
pub trait Register: Send + Sync {
    /// Creates a new register containing zero.
    fn new() -> Self;

    /// Returns the word currently contained in the register.
    fn read(&self) -> u64;

    /// Replaces the contents of the register with `word`.
    fn write(&self, word: u64);
}

#[cfg(all(test, not(feature = "shuttle")))]
mod tests {
    use super::*;

    // Shares the same tests across every implementation of the trait.
    macro_rules! register_tests {
        ($($name:ident: $type:ty,)*) => {
        $(
            mod $name {
                use super::*;

                #[test]
                fn starts_at_zero() {
                    let register = <$type>::new();
                    assert_eq!(0, register.read());
                }

                #[test]
                fn read_returns_last_write() {
                    let register = <$type>::new();
                    register.write(1);
                    register.write(u64::MAX);
                    assert_eq!(u64::MAX, register.read());
                }

                #[test]
                fn write_is_visible_to_other_threads() {
                    let register = std::sync::Arc::new(<$type>::new());
                    let writer = register.clone();
                    std::thread::spawn(move || writer.write(42))
                        .join()
                        .unwrap();
                    assert_eq!(42, register.read());
                }
            }
        )*
        }
    }

    register_tests! {
        mutex: MutexRegister,
        atomic: AtomicRegister,
    }
}
