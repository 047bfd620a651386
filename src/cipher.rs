//! Transforms for remotely pushed configuration blocks
//!
//! A configuration message sent over the air can pass its 8-byte register
//! block through a [`ConfigurationCipher`] before transmission. The sender
//! and the receiving peer must agree on the transform and its key; the key is
//! always supplied by the caller.

/// Reversible transform over a configuration block
pub trait ConfigurationCipher {
    fn encrypt(&self, block: [u8; 8]) -> [u8; 8];
    fn decrypt(&self, block: [u8; 8]) -> [u8; 8];
}

/// Leaves the block untouched
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plain;

impl ConfigurationCipher for Plain {
    fn encrypt(&self, block: [u8; 8]) -> [u8; 8] {
        block
    }

    fn decrypt(&self, block: [u8; 8]) -> [u8; 8] {
        block
    }
}

/// KeeLoq block cipher applied to each big-endian 32-bit half of the block
///
/// 528 rounds of the KeeLoq non-linear feedback shift register with a 64-bit
/// key.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keeloq {
    pub key: u64,
}

impl Keeloq {
    const NLF: u32 = 0x3A5C_742E;
    const ROUNDS: u32 = 528;

    pub const fn new(key: u64) -> Self {
        Self { key }
    }

    #[inline]
    const fn bit(x: u32, n: u32) -> u32 {
        (x >> n) & 1
    }

    #[inline]
    const fn key_bit(&self, n: u32) -> u32 {
        ((self.key >> (n % 64)) & 1) as u32
    }

    const fn nlf(a: u32, b: u32, c: u32, d: u32, e: u32) -> u32 {
        Self::bit(Self::NLF, a | b << 1 | c << 2 | d << 3 | e << 4)
    }

    pub const fn encrypt_word(&self, mut x: u32) -> u32 {
        let mut round = 0;
        while round < Self::ROUNDS {
            let feedback = Self::nlf(
                Self::bit(x, 1),
                Self::bit(x, 9),
                Self::bit(x, 20),
                Self::bit(x, 26),
                Self::bit(x, 31),
            ) ^ Self::bit(x, 0)
                ^ Self::bit(x, 16)
                ^ self.key_bit(round);
            x = (x >> 1) | (feedback << 31);
            round += 1;
        }
        x
    }

    pub const fn decrypt_word(&self, mut x: u32) -> u32 {
        let mut round = 0;
        while round < Self::ROUNDS {
            let feedback = Self::nlf(
                Self::bit(x, 0),
                Self::bit(x, 8),
                Self::bit(x, 19),
                Self::bit(x, 25),
                Self::bit(x, 30),
            ) ^ Self::bit(x, 31)
                ^ Self::bit(x, 15)
                ^ self.key_bit(Self::ROUNDS - 1 - round);
            x = (x << 1) | feedback;
            round += 1;
        }
        x
    }

    fn map_halves(block: [u8; 8], f: impl Fn(u32) -> u32) -> [u8; 8] {
        let high = f(u32::from_be_bytes([block[0], block[1], block[2], block[3]])).to_be_bytes();
        let low = f(u32::from_be_bytes([block[4], block[5], block[6], block[7]])).to_be_bytes();
        [
            high[0], high[1], high[2], high[3], low[0], low[1], low[2], low[3],
        ]
    }
}

impl ConfigurationCipher for Keeloq {
    fn encrypt(&self, block: [u8; 8]) -> [u8; 8] {
        Self::map_halves(block, |word| self.encrypt_word(word))
    }

    fn decrypt(&self, block: [u8; 8]) -> [u8; 8] {
        Self::map_halves(block, |word| self.decrypt_word(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeloq_words_invert() {
        let cipher = Keeloq::new(0x0123_4567_89AB_CDEF);
        for word in [0, 1, 0xDEAD_BEEF, u32::MAX, 0x0666_0708] {
            let encrypted = cipher.encrypt_word(word);
            assert_eq!(cipher.decrypt_word(encrypted), word);
        }
        assert_ne!(cipher.encrypt_word(0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    fn keeloq_blocks_invert() {
        let cipher = Keeloq::new(0x0666_0708);
        let block = [0x00, 0x01, 0x62, 0x00, 0x17, 0x03, 0x12, 0x34];
        let encrypted = cipher.encrypt(block);
        assert_ne!(encrypted, block);
        assert_eq!(cipher.decrypt(encrypted), block);
    }

    #[test]
    fn plain_is_identity() {
        let block = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(Plain.encrypt(block), block);
        assert_eq!(Plain.decrypt(block), block);
    }
}
