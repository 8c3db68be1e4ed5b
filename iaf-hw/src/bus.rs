//! Word-level access to the accelerator's control bundle.

use crate::error::DeviceResult;
use crate::regmap::{f32_to_word, word_to_f32};

/// Anything that can read and write 32-bit control registers: a memory-mapped
/// device, a remote register proxy, or the in-process [`crate::SoftKernel`].
pub trait RegisterBus {
    fn read(&mut self, offset: u32) -> DeviceResult<u32>;
    fn write(&mut self, offset: u32, value: u32) -> DeviceResult<()>;

    fn read_f32(&mut self, offset: u32) -> DeviceResult<f32> {
        self.read(offset).map(word_to_f32)
    }

    fn write_f32(&mut self, offset: u32, value: f32) -> DeviceResult<()> {
        self.write(offset, f32_to_word(value))
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, offset: u32) -> DeviceResult<u32> {
        (**self).read(offset)
    }

    fn write(&mut self, offset: u32, value: u32) -> DeviceResult<()> {
        (**self).write(offset, value)
    }
}
