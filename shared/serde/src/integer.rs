use crate::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<true, BITS>;

/// An unsigned integer packed into `BITS` bits.
///
/// Fixed-width integers always take `BITS` bits. Variable-width integers are
/// written in `BITS`-sized chunks, each preceded by a continue bit, so small
/// values stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const VARIABLE: bool, const BITS: u8> {
    value: u64,
}

impl<const VARIABLE: bool, const BITS: u8> SerdeInteger<VARIABLE, BITS> {
    pub fn new(value: u64) -> Self {
        debug_assert!(BITS > 0 && BITS < 64, "integer width must be within 1..64 bits");
        debug_assert!(
            VARIABLE || value < (1u64 << BITS),
            "value {} does not fit in {} bits",
            value,
            BITS
        );
        Self { value }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<const VARIABLE: bool, const BITS: u8> Serde for SerdeInteger<VARIABLE, BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;

        if VARIABLE {
            loop {
                let proceed = value >= (1u64 << BITS);
                writer.write_bit(proceed);
                for _ in 0..BITS {
                    writer.write_bit(value & 1 != 0);
                    value >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        } else {
            for _ in 0..BITS {
                writer.write_bit(value & 1 != 0);
                value >>= 1;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let proceed = if VARIABLE { reader.read_bit()? } else { false };

            for _ in 0..BITS {
                if reader.read_bit()? {
                    if shift >= 64 {
                        return Err(SerdeErr);
                    }
                    value |= 1 << shift;
                }
                shift += 1;
            }

            if !proceed {
                return Ok(Self { value });
            }
        }
    }

    fn bit_length(&self) -> u32 {
        if !VARIABLE {
            return BITS as u32;
        }

        let mut output: u32 = 0;
        let mut value = self.value;
        loop {
            let proceed = value >= (1u64 << BITS);
            output += 1 + BITS as u32;
            value >>= BITS;
            if !proceed {
                return output;
            }
        }
    }
}

impl<const BITS: u8> ConstBitLength for SerdeInteger<false, BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32
    }
}
