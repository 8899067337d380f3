use crate::SerdeErr;

/// Reads bits back out of a buffer produced by [`BitWriter`](crate::BitWriter).
pub struct BitReader<'b> {
    buffer: &'b [u8],
    byte_index: usize,
    bit_index: u8,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            byte_index: 0,
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let Some(byte) = self.buffer.get(self.byte_index) else {
            return Err(SerdeErr);
        };

        let bit = (byte >> self.bit_index) & 1 != 0;

        self.bit_index += 1;
        if self.bit_index >= 8 {
            self.bit_index = 0;
            self.byte_index += 1;
        }

        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let mut output = 0u8;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    /// Bits left in the buffer. Includes any padding of the final byte.
    pub fn bits_remaining(&self) -> usize {
        let total = self.buffer.len() * 8;
        let consumed = self.byte_index * 8 + self.bit_index as usize;
        total.saturating_sub(consumed)
    }

    pub fn bits_read(&self) -> usize {
        self.byte_index * 8 + self.bit_index as usize
    }
}
