//! A fixed-size file of fixed-width registers.
use tracing::info;

use crate::error::{ConfigError, InvalidAddress};
use crate::register::{MutexRegister, Register};

/// The widest register a file can hold.
pub const MAX_WIDTH: u32 = u64::BITS;

/// Returns a mask selecting the low `width` bits of a word.
///
/// `width` must be in `1..=64`.
pub(crate) fn mask(width: u32) -> u64 {
    u64::MAX >> (MAX_WIDTH - width)
}

/// `depth` registers of `width` bits each, addressed by `0..depth`.
///
/// Every register starts at zero. Accesses outside of `0..depth` return
/// [`InvalidAddress`] and leave the file untouched.
///
/// # Truncation
///
/// Values wider than `width` bits are truncated on write: only the low
/// `width` bits are stored, so writing `data` stores `data mod 2^width`.
///
/// # Synchronization
///
/// Each slot is a [`Register`], and every access goes through exactly one of
/// them. With the default [`MutexRegister`] backend the file is locked per
/// slot, so a concurrent reader never observes a torn write and accesses to
/// different addresses never contend.
///
/// # Examples
///
/// ```
/// use regbox::register_file::RegisterFile;
///
/// let registers = RegisterFile::new(8, 8).unwrap();
///
/// registers.write(3, 0x5a).unwrap();
/// assert_eq!(registers.read(3), Ok(0x5a));
///
/// // Wider values are truncated to 8 bits.
/// registers.write(4, 0x1ff).unwrap();
/// assert_eq!(registers.read(4), Ok(0xff));
///
/// // Address 8 is outside of the file.
/// assert!(registers.write(8, 1).is_err());
/// assert!(registers.read(8).is_err());
/// ```
#[derive(Debug)]
pub struct RegisterFile<R: Register = MutexRegister> {
    width: u32,
    slots: Box<[R]>,
}

impl RegisterFile<MutexRegister> {
    /// Creates a file of `depth` zeroed, `width`-bit registers, each guarded
    /// by its own mutex.
    pub fn new(width: u32, depth: usize) -> Result<Self, ConfigError> {
        Self::with_backend(width, depth)
    }
}

impl<R: Register> RegisterFile<R> {
    /// Creates a file of `depth` zeroed, `width`-bit registers of type `R`.
    ///
    /// ```
    /// use regbox::register::AtomicRegister;
    /// use regbox::register_file::RegisterFile;
    ///
    /// let registers = RegisterFile::<AtomicRegister>::with_backend(16, 4).unwrap();
    /// assert_eq!(registers.snapshot(), vec![0; 4]);
    /// ```
    pub fn with_backend(width: u32, depth: usize) -> Result<Self, ConfigError> {
        if !(1..=MAX_WIDTH).contains(&width) {
            return Err(ConfigError::WidthOutOfRange(width));
        }
        if depth == 0 {
            return Err(ConfigError::EmptyRegisterFile);
        }
        Ok(Self {
            width,
            slots: (0..depth).map(|_| R::new()).collect(),
        })
    }

    /// Returns the number of bits stored by each register.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the number of registers in the file.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Returns the largest value a register can hold.
    pub fn max_value(&self) -> u64 {
        mask(self.width)
    }

    /// Stores the low `width` bits of `data` in the register at `address`.
    pub fn write(&self, address: usize, data: u64) -> Result<(), InvalidAddress> {
        let slot = self.slot(address)?;
        let data = data & self.max_value();
        slot.write(data);
        info!("WRITE addr={address} data={data:#04x}");
        Ok(())
    }

    /// Returns the value currently stored in the register at `address`.
    pub fn read(&self, address: usize) -> Result<u64, InvalidAddress> {
        let data = self.slot(address)?.read();
        info!("READ addr={address} data={data:#04x}");
        Ok(data)
    }

    /// Returns the value of every register, in address order.
    ///
    /// Each register is read independently, so the result is not an atomic
    /// snapshot if writes are still in progress.
    pub fn snapshot(&self) -> Vec<u64> {
        self.slots.iter().map(Register::read).collect()
    }

    fn slot(&self, address: usize) -> Result<&R, InvalidAddress> {
        self.slots.get(address).ok_or(InvalidAddress {
            address,
            depth: self.depth(),
        })
    }
}

#[cfg(all(test, not(feature = "shuttle")))]
mod tests {
    use super::*;
    use crate::register::AtomicRegister;

    mod new {
        use super::*;

        #[test]
        fn zeroes_every_register() {
            let registers = RegisterFile::new(8, 8).unwrap();
            assert_eq!(registers.snapshot(), vec![0; 8]);
        }

        #[test]
        fn rejects_zero_width() {
            let result = RegisterFile::new(0, 8);
            assert_eq!(result.unwrap_err(), ConfigError::WidthOutOfRange(0));
        }

        #[test]
        fn rejects_widths_wider_than_a_word() {
            let result = RegisterFile::new(65, 8);
            assert_eq!(result.unwrap_err(), ConfigError::WidthOutOfRange(65));
        }

        #[test]
        fn rejects_empty_files() {
            let result = RegisterFile::new(8, 0);
            assert_eq!(result.unwrap_err(), ConfigError::EmptyRegisterFile);
        }
    }

    mod mask {
        use super::*;

        #[test]
        fn selects_low_bits() {
            assert_eq!(mask(1), 0b1);
            assert_eq!(mask(8), 0xff);
            assert_eq!(mask(63), u64::MAX >> 1);
            assert_eq!(mask(64), u64::MAX);
        }
    }

    mod write {
        use super::*;

        #[test]
        fn changes_only_the_addressed_register() {
            let registers = RegisterFile::new(8, 4).unwrap();
            registers.write(2, 0x10).unwrap();
            assert_eq!(registers.snapshot(), vec![0, 0, 0x10, 0]);
        }

        #[test]
        fn truncates_to_width() {
            let registers = RegisterFile::new(4, 2).unwrap();
            registers.write(1, 0xab).unwrap();
            assert_eq!(registers.read(1), Ok(0xb));
        }

        #[test]
        fn keeps_every_bit_of_full_width_registers() {
            let registers = RegisterFile::<AtomicRegister>::with_backend(64, 1).unwrap();
            registers.write(0, u64::MAX).unwrap();
            assert_eq!(registers.read(0), Ok(u64::MAX));
        }

        #[test]
        fn rejects_out_of_range_address_without_side_effects() {
            let registers = RegisterFile::new(8, 8).unwrap();
            registers.write(0, 1).unwrap();

            let error = registers.write(8, 0xff).unwrap_err();

            assert_eq!(
                error,
                InvalidAddress {
                    address: 8,
                    depth: 8
                }
            );
            assert_eq!(registers.snapshot(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        }
    }

    mod read {
        use super::*;

        #[test]
        fn returns_last_written_value() {
            let registers = RegisterFile::new(8, 8).unwrap();
            registers.write(2, 0x10).unwrap();
            registers.write(2, 0x20).unwrap();
            assert_eq!(registers.read(2), Ok(0x20));
        }

        #[test]
        fn rejects_out_of_range_address() {
            let registers = RegisterFile::new(8, 8).unwrap();
            assert_eq!(
                registers.read(usize::MAX),
                Err(InvalidAddress {
                    address: usize::MAX,
                    depth: 8
                })
            );
        }
    }
}
