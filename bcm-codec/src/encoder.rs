//! BCM stream encoder.

use crate::model::Model;
use crate::range_coder::RangeEncoder;
use crate::{BCM_MAGIC, MAX_BLOCK_SIZE};
use bcm_core::byteio::ByteWriter;
use bcm_core::crc::Crc32;
use bcm_core::error::{BcmError, Result};
use std::io::{ErrorKind, Read, Write};

/// BCM encoder.
///
/// Writes the `BCM!` magic up front, then one record per block: a 32-bit
/// length, the 32-bit primary index, and the block's BWT coded byte by byte
/// through the model. All framing integers travel as direct bits inside the
/// coder stream. [`finish`](Self::finish) seals the stream with the zero
/// sentinel, the CRC of everything fed in, and the coder's flush tail.
#[derive(Debug)]
pub struct BcmEncoder<W: Write> {
    rc: RangeEncoder<W>,
    model: Model,
    crc: Crc32,
}

impl<W: Write> BcmEncoder<W> {
    /// Create an encoder and write the stream header.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = ByteWriter::new(writer);
        for &byte in BCM_MAGIC.iter() {
            writer.write_u8(byte)?;
        }
        Ok(Self {
            rc: RangeEncoder::new(writer),
            model: Model::new(),
            crc: Crc32::new(),
        })
    }

    /// Transform and encode one block.
    ///
    /// The block is BWT-rewritten in place. Blocks must be non-empty (a
    /// zero length is the end-of-stream sentinel) and no longer than
    /// [`MAX_BLOCK_SIZE`].
    pub fn encode_block(&mut self, block: &mut [u8]) -> Result<()> {
        if block.is_empty() || block.len() > MAX_BLOCK_SIZE {
            return Err(BcmError::corrupted(format!(
                "invalid block length {}",
                block.len()
            )));
        }

        self.crc.update(block);

        let primary = bcm_bwt::transform(block);
        if primary == 0 {
            return Err(BcmError::corrupted("forward transform failed"));
        }

        self.rc.encode_direct(block.len() as u32, 32)?;
        self.rc.encode_direct(primary, 32)?;
        for &byte in block.iter() {
            self.model.encode(&mut self.rc, byte)?;
        }
        Ok(())
    }

    /// Write the sentinel, the CRC trailer and the flush tail.
    ///
    /// Returns the total number of compressed bytes written, magic included.
    pub fn finish(mut self) -> Result<u64> {
        self.rc.encode_direct(0, 32)?;
        self.rc.encode_direct(self.crc.value(), 32)?;
        self.rc.flush()?;
        let writer = self.rc.into_inner();
        let total = writer.bytes_written();
        writer.into_inner()?;
        Ok(total)
    }
}

/// Compress `input` to `output` in blocks of `block_size` bytes.
///
/// Returns `(bytes read, bytes written)`. The block buffer is allocated once
/// and reused; only the final block may come up short.
pub fn compress<R: Read, W: Write>(
    mut input: R,
    output: W,
    block_size: usize,
) -> Result<(u64, u64)> {
    let mut encoder = BcmEncoder::new(output)?;
    let mut block = vec![0u8; block_size.clamp(1, MAX_BLOCK_SIZE)];
    let mut total_in = 0u64;

    loop {
        let n = read_block(&mut input, &mut block)?;
        if n == 0 {
            break;
        }
        total_in += n as u64;
        encoder.encode_block(&mut block[..n])?;
    }

    let total_out = encoder.finish()?;
    Ok((total_in, total_out))
}

/// Fill `block` from `input`, short only at end of stream.
fn read_block<R: Read>(input: &mut R, block: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match input.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
