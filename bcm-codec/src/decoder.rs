//! BCM stream decoder.

use crate::model::Model;
use crate::range_coder::RangeDecoder;
use crate::{BCM_MAGIC, LARGE_BLOCK, MAX_BLOCK_SIZE};
use bcm_core::byteio::{ByteReader, ByteWriter};
use bcm_core::crc::Crc32;
use bcm_core::error::{BcmError, Result};
use std::io::{Read, Write};

/// Per-stream block storage, sized by the first block.
///
/// The first block's length fixes the capacity for the whole stream; any
/// later block claiming to be longer is corruption. The `u32` slot array
/// doubles as the packed symbol/successor store for blocks under 16 MiB; the
/// byte buffer is only needed when a block can reach the two-array mode, so
/// it stays empty for small-capacity streams.
#[derive(Debug)]
struct BlockStore {
    capacity: usize,
    bytes: Vec<u8>,
    slots: Vec<u32>,
}

impl BlockStore {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bytes: if capacity >= LARGE_BLOCK {
                vec![0u8; capacity]
            } else {
                Vec::new()
            },
            slots: vec![0u32; capacity],
        }
    }
}

/// BCM decoder.
///
/// Verifies the magic on construction, then replays the encoder's schedule:
/// block records until the zero sentinel, the CRC trailer, done. The model
/// and coder mirror the encoder exactly, so a flipped bit or a truncation
/// surfaces as a corrupt field, an early end of stream, or a CRC mismatch.
#[derive(Debug)]
pub struct BcmDecoder<R: Read> {
    rc: RangeDecoder<R>,
    model: Model,
    crc: Crc32,
}

impl<R: Read> BcmDecoder<R> {
    /// Create a decoder, checking the magic and seeding the coder.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = ByteReader::new(reader);

        let mut found = Vec::with_capacity(4);
        for _ in 0..4 {
            match reader.read_u8() {
                Ok(byte) => found.push(byte),
                Err(BcmError::UnexpectedEof { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        if found != BCM_MAGIC {
            return Err(BcmError::invalid_magic(BCM_MAGIC.to_vec(), found));
        }

        Ok(Self {
            rc: RangeDecoder::new(reader)?,
            model: Model::new(),
            crc: Crc32::new(),
        })
    }

    /// Decode the whole stream into `output`.
    ///
    /// Returns `(compressed bytes read, bytes written)`.
    pub fn decompress_to<W: Write>(mut self, output: W) -> Result<(u64, u64)> {
        let mut output = ByteWriter::new(output);
        let mut store: Option<BlockStore> = None;

        loop {
            let n = self.rc.decode_direct(32)? as usize;
            if n == 0 {
                break;
            }

            if let Some(store) = &store {
                if n > store.capacity {
                    return Err(BcmError::corrupted(format!(
                        "block length {} exceeds capacity {}",
                        n, store.capacity
                    )));
                }
            } else if n > MAX_BLOCK_SIZE {
                return Err(BcmError::corrupted(format!("block length {} too large", n)));
            }
            let store = store.get_or_insert_with(|| BlockStore::new(n));

            let primary = self.rc.decode_direct(32)?;
            if primary < 1 || primary as usize > n {
                return Err(BcmError::corrupted(format!(
                    "primary index {} outside block of {} bytes",
                    primary, n
                )));
            }

            let emitted = if n >= LARGE_BLOCK {
                let block = &mut store.bytes[..n];
                for byte in block.iter_mut() {
                    *byte = self.model.decode(&mut self.rc)?;
                }
                let next = &mut store.slots[..n];
                drain(bcm_bwt::invert(block, next, primary), &mut output, &mut self.crc)?
            } else {
                let slots = &mut store.slots[..n];
                for slot in slots.iter_mut() {
                    *slot = u32::from(self.model.decode(&mut self.rc)?);
                }
                drain(bcm_bwt::invert_packed(slots, primary), &mut output, &mut self.crc)?
            };

            if emitted != n as u64 {
                return Err(BcmError::corrupted(format!(
                    "inverse transform produced {} of {} bytes",
                    emitted, n
                )));
            }
        }

        let expected = self.rc.decode_direct(32)?;
        let computed = self.crc.value();
        if expected != computed {
            return Err(BcmError::crc_mismatch(expected, computed));
        }

        let total_out = output.bytes_written();
        output.flush()?;
        Ok((self.rc.bytes_read(), total_out))
    }
}

/// Stream a reconstruction walk into the sink, updating the CRC per byte.
fn drain<W: Write>(
    walk: impl Iterator<Item = u8>,
    output: &mut ByteWriter<W>,
    crc: &mut Crc32,
) -> Result<u64> {
    let mut emitted = 0u64;
    for byte in walk {
        crc.update_byte(byte);
        output.write_u8(byte)?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Decompress `input` into `output`.
///
/// Returns `(compressed bytes read, bytes written)`.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<(u64, u64)> {
    BcmDecoder::new(input)?.decompress_to(output)
}
