//! Carry-less binary range coder.
//!
//! The coder tracks a 32-bit interval `[low, high]` and narrows it one bit
//! at a time. Probabilities are integers at a fixed log-domain scale: the
//! context-mixing model submits 18-bit probabilities ([`PROB_BITS`]), while
//! the framing fields (block length, primary index, trailing CRC) go through
//! the direct-bit path, which is the same split at probability one half.
//!
//! Renormalisation is byte-granular: whenever the top byte of `low` and
//! `high` agree, detected as `(low ^ high) < 2^24`, that byte is settled,
//! gets emitted, and both bounds shift left by 8. The carry-less trick of
//! refilling `high` with `0xFF` (rather than propagating a carry) is what
//! keeps the encoder one-pass.

use bcm_core::byteio::{ByteReader, ByteWriter};
use bcm_core::error::Result;
use std::io::{Read, Write};

/// Log2 scale of model probabilities: `p / 2^18` is the chance of a 1 bit.
pub const PROB_BITS: u32 = 18;

/// Renormalisation threshold: top bytes of `low` and `high` agree below this.
const TOP: u32 = 1 << 24;

/// Range encoder writing through a [`ByteWriter`].
#[derive(Debug)]
pub struct RangeEncoder<W: Write> {
    writer: ByteWriter<W>,
    low: u32,
    high: u32,
}

impl<W: Write> RangeEncoder<W> {
    /// Create a new encoder over the given byte sink.
    pub fn new(writer: ByteWriter<W>) -> Self {
        Self {
            writer,
            low: 0,
            high: 0xFFFF_FFFF,
        }
    }

    /// Encode one bit with an 18-bit probability of it being 1.
    #[inline]
    pub fn encode_bit(&mut self, bit: u32, p: u32) -> Result<()> {
        debug_assert!(p > 0 && p < (1 << PROB_BITS));
        let mid =
            self.low + ((u64::from(self.high - self.low) * u64::from(p)) >> PROB_BITS) as u32;
        self.split(bit, mid)
    }

    /// Encode the low `bits` bits of `value`, MSB first, at even odds.
    ///
    /// This is how the 32-bit framing fields travel: they live inside the
    /// same coder stream as the block data and carry no byte alignment.
    pub fn encode_direct(&mut self, value: u32, bits: u32) -> Result<()> {
        debug_assert!(bits >= 1 && bits <= 32);
        for i in (0..bits).rev() {
            let mid = self.low + ((self.high - self.low) >> 1);
            self.split((value >> i) & 1, mid)?;
        }
        Ok(())
    }

    #[inline]
    fn split(&mut self, bit: u32, mid: u32) -> Result<()> {
        if bit != 0 {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        while (self.low ^ self.high) < TOP {
            self.writer.write_u8((self.low >> 24) as u8)?;
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
        }
        Ok(())
    }

    /// Settle the final interval: emit four top bytes of `low` and flush.
    ///
    /// The four bytes mirror the four the decoder consumes at init, so a
    /// decoder driven over the produced stream never under-reads.
    pub fn flush(&mut self) -> Result<()> {
        for _ in 0..4 {
            self.writer.write_u8((self.low >> 24) as u8)?;
            self.low <<= 8;
        }
        self.writer.flush()
    }

    /// Total bytes emitted so far, including any written before coding began.
    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    /// Return the underlying byte sink.
    pub fn into_inner(self) -> ByteWriter<W> {
        self.writer
    }
}

/// Range decoder reading through a [`ByteReader`].
#[derive(Debug)]
pub struct RangeDecoder<R: Read> {
    reader: ByteReader<R>,
    low: u32,
    high: u32,
    code: u32,
}

impl<R: Read> RangeDecoder<R> {
    /// Create a decoder, consuming four bytes to seed the code register.
    pub fn new(mut reader: ByteReader<R>) -> Result<Self> {
        let mut code = 0u32;
        for _ in 0..4 {
            code = (code << 8) | u32::from(reader.read_u8()?);
        }
        Ok(Self {
            reader,
            low: 0,
            high: 0xFFFF_FFFF,
            code,
        })
    }

    /// Decode one bit previously encoded with the same 18-bit probability.
    #[inline]
    pub fn decode_bit(&mut self, p: u32) -> Result<u32> {
        debug_assert!(p > 0 && p < (1 << PROB_BITS));
        let mid =
            self.low + ((u64::from(self.high - self.low) * u64::from(p)) >> PROB_BITS) as u32;
        let bit = u32::from(self.code <= mid);
        self.resolve(bit, mid)?;
        Ok(bit)
    }

    /// Decode `bits` direct bits, MSB first.
    pub fn decode_direct(&mut self, bits: u32) -> Result<u32> {
        debug_assert!(bits >= 1 && bits <= 32);
        let mut value = 0u32;
        for _ in 0..bits {
            let mid = self.low + ((self.high - self.low) >> 1);
            let bit = u32::from(self.code <= mid);
            self.resolve(bit, mid)?;
            value = (value << 1) | bit;
        }
        Ok(value)
    }

    #[inline]
    fn resolve(&mut self, bit: u32, mid: u32) -> Result<()> {
        if bit != 0 {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        while (self.low ^ self.high) < TOP {
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
            self.code = (self.code << 8) | u32::from(self.reader.read_u8()?);
        }
        Ok(())
    }

    /// Total bytes consumed so far, including any read before coding began.
    pub fn bytes_read(&self) -> u64 {
        self.reader.bytes_read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_with<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut RangeEncoder<Vec<u8>>),
    {
        let mut enc = RangeEncoder::new(ByteWriter::new(Vec::new()));
        f(&mut enc);
        enc.flush().unwrap();
        enc.into_inner().into_inner().unwrap()
    }

    #[test]
    fn test_direct_bits_roundtrip() {
        let values = [0u32, 1, 0x42434D21, 0xFFFF_FFFF, 0x8000_0000, 12345];
        let data = encode_with(|enc| {
            for &v in &values {
                enc.encode_direct(v, 32).unwrap();
            }
        });

        let mut dec = RangeDecoder::new(ByteReader::new(Cursor::new(data))).unwrap();
        for &v in &values {
            assert_eq!(dec.decode_direct(32).unwrap(), v);
        }
    }

    #[test]
    fn test_model_bits_roundtrip() {
        // A fixed skewed probability; the decoder must follow the exact same
        // sequence to stay in sync.
        let bits: Vec<u32> = (0..500).map(|i| u32::from(i % 7 == 0)).collect();
        let p = 1 << 15; // strongly favours 0 at the 2^18 scale

        let data = encode_with(|enc| {
            for &b in &bits {
                enc.encode_bit(b, p).unwrap();
            }
        });

        let mut dec = RangeDecoder::new(ByteReader::new(Cursor::new(data))).unwrap();
        for &b in &bits {
            assert_eq!(dec.decode_bit(p).unwrap(), b);
        }
    }

    #[test]
    fn test_mixed_direct_and_model_bits() {
        let data = encode_with(|enc| {
            enc.encode_direct(0xDEAD_BEEF, 32).unwrap();
            for i in 0..64 {
                enc.encode_bit(i & 1, 3 << 16).unwrap();
            }
            enc.encode_direct(7, 3).unwrap();
        });

        let mut dec = RangeDecoder::new(ByteReader::new(Cursor::new(data))).unwrap();
        assert_eq!(dec.decode_direct(32).unwrap(), 0xDEAD_BEEF);
        for i in 0..64 {
            assert_eq!(dec.decode_bit(3 << 16).unwrap(), i & 1);
        }
        assert_eq!(dec.decode_direct(3).unwrap(), 7);
    }

    #[test]
    fn test_renormalisation_invariant() {
        let mut enc = RangeEncoder::new(ByteWriter::new(Vec::new()));
        for i in 0..1000u32 {
            enc.encode_bit(u32::from(i % 3 == 0), 1 << 17).unwrap();
            assert!(enc.low <= enc.high);
            assert!((enc.low ^ enc.high) >= TOP);
        }
    }

    #[test]
    fn test_decoder_code_stays_in_interval() {
        let data = encode_with(|enc| {
            for i in 0..256u32 {
                enc.encode_direct(i, 9).unwrap();
            }
        });

        let mut dec = RangeDecoder::new(ByteReader::new(Cursor::new(data))).unwrap();
        for i in 0..256u32 {
            assert_eq!(dec.decode_direct(9).unwrap(), i);
            assert!(dec.low <= dec.code && dec.code <= dec.high);
        }
    }

    #[test]
    fn test_truncated_stream_errors() {
        let mut data = encode_with(|enc| {
            for _ in 0..4096 {
                enc.encode_direct(0x5A5A_5A5A, 32).unwrap();
            }
        });
        data.truncate(data.len() / 2);

        let mut dec = RangeDecoder::new(ByteReader::new(Cursor::new(data))).unwrap();
        let mut result = Ok(0u32);
        for _ in 0..4096 {
            result = dec.decode_direct(32);
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
    }

    fn encode_bit_helper(enc: &mut RangeEncoder<Vec<u8>>, bit: bool, p: u32) {
        enc.encode_bit(u32::from(bit), p).unwrap();
    }

    #[test]
    fn test_skewed_probabilities_compress() {
        // 4096 zero bits at a heavily zero-biased probability should settle
        // into far fewer bytes than at even odds.
        let skewed = encode_with(|enc| {
            for _ in 0..4096 {
                encode_bit_helper(enc, false, 1 << 6);
            }
        });
        let even = encode_with(|enc| {
            for _ in 0..4096 {
                encode_bit_helper(enc, false, 1 << 17);
            }
        });
        assert!(skewed.len() * 10 < even.len());
    }
}
