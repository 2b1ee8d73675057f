//! Rolling checksum over a fixed 64-byte window.
//!
//! Two running sums are kept: `s1` over the bytes in the window and `s2`
//! over the successive values of `s1`. Both depend only on the bytes
//! currently in the window, so equal content produces equal sums whatever
//! came before it. Arithmetic wraps.

const WINDOW_SIZE: usize = 64;
const CHAR_OFFSET: u32 = 31;

#[derive(Clone, Debug)]
pub struct Rollsum {
    s1: u32,
    s2: u32,
    window: [u8; WINDOW_SIZE],
    pos: usize,
}

impl Rollsum {
    pub fn new() -> Self {
        let w = WINDOW_SIZE as u32;
        Self {
            s1: w.wrapping_mul(CHAR_OFFSET),
            s2: w.wrapping_mul(w - 1).wrapping_mul(CHAR_OFFSET),
            window: [0; WINDOW_SIZE],
            pos: 0,
        }
    }

    /// Push `byte` into the window, evicting the oldest byte.
    pub fn roll(&mut self, byte: u8) {
        let drop = self.window[self.pos] as u32;
        let add = byte as u32;
        self.s1 = self.s1.wrapping_add(add).wrapping_sub(drop);
        self.s2 = self.s2.wrapping_add(self.s1).wrapping_sub(
            (WINDOW_SIZE as u32).wrapping_mul(drop.wrapping_add(CHAR_OFFSET)),
        );
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW_SIZE;
    }

    /// Whether the low bits selected by `mask` are all set.
    pub fn on_split(&self, mask: u32) -> bool {
        self.s2 & mask == mask
    }

    pub fn digest(&self) -> u32 {
        (self.s1 << 16) | (self.s2 & 0xffff)
    }
}

impl Default for Rollsum {
    fn default() -> Self {
        Self::new()
    }
}
