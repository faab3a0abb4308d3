//! Seeded randomness for synthesized content.
//!
//! The seed hash and the Mersenne Twister stream are pinned: seeding, float
//! draws, bounded draws and shuffles reproduce the reference MT19937 runtime
//! bit for bit, so one identifier always yields the same copy.

use rand::{RngCore, SeedableRng};

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// `h = h * 131 + codepoint (mod 2^32)` over the characters of `s`.
pub fn stable_hash(s: &str) -> u32 {
    s.chars()
        .fold(0u32, |h, ch| h.wrapping_mul(131).wrapping_add(ch as u32))
}

/// Generator for one purpose tag and product identifier.
pub fn seeded(tag: &str, key: &str) -> Mt19937 {
    let seed = stable_hash(&format!("{}{}", tag, key));
    Mt19937::from_seed(seed.to_le_bytes())
}

pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    fn from_key(key: &[u32]) -> Self {
        let mut mt = [0u32; N];
        mt[0] = 19_650_218;
        for i in 1..N {
            mt[i] = 1_812_433_253u32
                .wrapping_mul(mt[i - 1] ^ (mt[i - 1] >> 30))
                .wrapping_add(i as u32);
        }

        let (mut i, mut j) = (1usize, 0usize);
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_566_083_941)).wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        mt[0] = 0x8000_0000;

        Mt19937 {
            state: mt,
            index: N,
        }
    }

    fn twist(&mut self) {
        for k in 0..N {
            let y = (self.state[k] & UPPER_MASK) | (self.state[(k + 1) % N] & LOWER_MASK);
            let mag = if y & 1 == 1 { MATRIX_A } else { 0 };
            self.state[k] = self.state[(k + M) % N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }

    fn genrand(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        self.genrand()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.genrand());
        let hi = u64::from(self.genrand());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.genrand().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::from_key(&[u32::from_le_bytes(seed)])
    }
}

/// Uniform float in [0, 1) with 53 bits of precision.
pub fn unit_f64<R: RngCore>(rng: &mut R) -> f64 {
    let a = f64::from(rng.next_u32() >> 5);
    let b = f64::from(rng.next_u32() >> 6);
    (a * 67_108_864.0 + b) / 9_007_199_254_740_992.0
}

/// Uniform integer in [0, n) by rejection over the top `bit_length(n)` bits.
pub fn below<R: RngCore>(rng: &mut R, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let n = u32::try_from(n).unwrap_or(u32::MAX);
    let k = u32::BITS - n.leading_zeros();
    loop {
        let r = rng.next_u32() >> (32 - k);
        if r < n {
            return r as usize;
        }
    }
}

/// In-place Fisher-Yates from the back.
pub fn shuffle<R: RngCore, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = below(rng, i + 1);
        items.swap(i, j);
    }
}
