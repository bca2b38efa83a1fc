//! GIF-variant LZW compression.
//!
//! Compresses a stream of palette indices with variable-bit-width LZW codes
//! and packs them into the 255-byte-max counted sub-blocks the GIF image
//! data section requires. The code table starts at `color_depth + 1` bits,
//! reserves a clear code and an end-of-information code above the literal
//! range, and grows up to 12-bit codes; when the table fills, a clear code
//! is emitted and the table is rebuilt from scratch.

use std::io::{self, Write};

/// Maximum code width in bits.
const MAX_BITS: i32 = 12;
/// First code value that no longer fits the table (2^12).
const MAX_MAX_CODE: i32 = 1 << MAX_BITS;
/// Hash table size; a prime comfortably above 4096 entries keeps probe
/// chains short at an 80% load ceiling.
const HSIZE: usize = 5003;
/// Data bytes buffered before a sub-block is flushed to the sink.
const SUB_BLOCK_CAPACITY: usize = 254;

/// One-shot LZW compressor for a frame's worth of palette indices.
pub struct LzwEncoder {
    initial_code_size: i32,
}

impl LzwEncoder {
    /// Create an encoder for indices drawn from `2^color_depth` symbols.
    /// The GIF minimum code size is never below 2.
    pub fn new(color_depth: u8) -> Self {
        Self {
            initial_code_size: (color_depth as i32).max(2),
        }
    }

    /// Compress `indices` into `sink` as a complete GIF image data section:
    /// the minimum-code-size byte, the counted sub-blocks, and the
    /// zero-length terminator.
    ///
    /// A sink failure aborts immediately; bytes already flushed are left
    /// untouched.
    pub fn encode<W: Write>(&self, indices: &[u8], sink: &mut W) -> io::Result<()> {
        sink.write_all(&[self.initial_code_size as u8])?;

        let mut state = Compressor::new(self.initial_code_size + 1, sink);
        state.compress(indices)?;

        // Zero-length block terminates the image data section.
        sink.write_all(&[0])?;
        Ok(())
    }
}

/// Working state for one compression run: the string table, the bit
/// accumulator, and the sub-block buffer.
struct Compressor<'a, W: Write> {
    sink: &'a mut W,
    hash: [i32; HSIZE],
    codes: [i32; HSIZE],
    n_bits: i32,
    max_code: i32,
    init_bits: i32,
    clear_code: i32,
    eof_code: i32,
    free_entry: i32,
    clear_pending: bool,
    cur_accum: u32,
    cur_bits: i32,
    block: [u8; SUB_BLOCK_CAPACITY],
    block_len: usize,
}

impl<'a, W: Write> Compressor<'a, W> {
    fn new(init_bits: i32, sink: &'a mut W) -> Self {
        let clear_code = 1 << (init_bits - 1);
        Self {
            sink,
            hash: [-1; HSIZE],
            codes: [0; HSIZE],
            n_bits: init_bits,
            max_code: (1 << init_bits) - 1,
            init_bits,
            clear_code,
            eof_code: clear_code + 1,
            free_entry: clear_code + 2,
            clear_pending: false,
            cur_accum: 0,
            cur_bits: 0,
            block: [0; SUB_BLOCK_CAPACITY],
            block_len: 0,
        }
    }

    fn compress(&mut self, indices: &[u8]) -> io::Result<()> {
        // hshift positions the symbol bits for the primary hash probe
        let mut hshift = 0;
        let mut fcode = HSIZE as i32;
        while fcode < 65536 {
            hshift += 1;
            fcode *= 2;
        }
        let hshift = 8 - hshift;

        self.output(self.clear_code)?;

        let mut pixels = indices.iter();
        let mut ent = match pixels.next() {
            Some(&first) => first as i32,
            None => {
                // No pixels at all still yields a well-formed code stream.
                return self.output(self.eof_code);
            }
        };

        for &pixel in pixels {
            let c = pixel as i32;
            let fcode = (c << MAX_BITS) + ent;
            let mut i = ((c << hshift) ^ ent) as usize;

            if self.hash[i] == fcode {
                ent = self.codes[i];
                continue;
            }
            if self.hash[i] >= 0 {
                // Secondary probe, stepping backwards through the table.
                let disp = if i == 0 { 1 } else { HSIZE - i };
                let mut found = false;
                loop {
                    i = i.wrapping_sub(disp);
                    if i >= HSIZE {
                        i = i.wrapping_add(HSIZE);
                    }
                    if self.hash[i] == fcode {
                        ent = self.codes[i];
                        found = true;
                        break;
                    }
                    if self.hash[i] < 0 {
                        break;
                    }
                }
                if found {
                    continue;
                }
            }

            self.output(ent)?;
            ent = c;
            if self.free_entry < MAX_MAX_CODE {
                self.codes[i] = self.free_entry;
                self.free_entry += 1;
                self.hash[i] = fcode;
            } else {
                self.clear_table()?;
            }
        }

        self.output(ent)?;
        self.output(self.eof_code)
    }

    /// Reset the string table and tell the decoder to do the same.
    fn clear_table(&mut self) -> io::Result<()> {
        self.hash = [-1; HSIZE];
        self.free_entry = self.clear_code + 2;
        self.clear_pending = true;
        self.output(self.clear_code)
    }

    /// Emit one code, LSB-first, growing the code width as the table grows.
    fn output(&mut self, code: i32) -> io::Result<()> {
        self.cur_accum |= (code as u32) << self.cur_bits;
        self.cur_bits += self.n_bits;
        while self.cur_bits >= 8 {
            self.byte_out(self.cur_accum as u8)?;
            self.cur_accum >>= 8;
            self.cur_bits -= 8;
        }

        if self.free_entry > self.max_code || self.clear_pending {
            if self.clear_pending {
                self.n_bits = self.init_bits;
                self.max_code = (1 << self.n_bits) - 1;
                self.clear_pending = false;
            } else {
                self.n_bits += 1;
                self.max_code = if self.n_bits == MAX_BITS {
                    MAX_MAX_CODE
                } else {
                    (1 << self.n_bits) - 1
                };
            }
        }

        if code == self.eof_code {
            while self.cur_bits > 0 {
                self.byte_out(self.cur_accum as u8)?;
                self.cur_accum >>= 8;
                self.cur_bits -= 8;
            }
            self.flush_block()?;
        }
        Ok(())
    }

    fn byte_out(&mut self, byte: u8) -> io::Result<()> {
        self.block[self.block_len] = byte;
        self.block_len += 1;
        if self.block_len >= SUB_BLOCK_CAPACITY {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Write the buffered bytes as one length-prefixed sub-block.
    fn flush_block(&mut self) -> io::Result<()> {
        if self.block_len > 0 {
            self.sink.write_all(&[self.block_len as u8])?;
            self.sink.write_all(&self.block[..self.block_len])?;
            self.block_len = 0;
        }
        Ok(())
    }
}
