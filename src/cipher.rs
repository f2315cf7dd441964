//! Implementation of FEAL-4 and the building blocks of its round function.

use rand::Rng;

/*****************************************************************
                            FEAL-4
******************************************************************/

/// Rotates a byte two bit positions to the left.
#[inline(always)]
pub fn rot2(x: u8) -> u8 {
    x.rotate_left(2)
}

/// First byte mixer: addition modulo 256 followed by the rotation.
#[inline(always)]
pub fn g0(a: u8, b: u8) -> u8 {
    rot2(a.wrapping_add(b))
}

/// Second byte mixer, identical to `g0` except for an extra carry-in of one.
#[inline(always)]
pub fn g1(a: u8, b: u8) -> u8 {
    rot2(a.wrapping_add(b).wrapping_add(1))
}

/// Splits a word into its four bytes, most significant first.
#[inline(always)]
pub fn unpack(word: u32) -> [u8; 4] {
    word.to_be_bytes()
}

/// Reassembles four bytes into a word, most significant first.
#[inline(always)]
pub fn pack(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// The FEAL round function.
///
/// Satisfies two probability-1 differentials which the attack relies on:
/// `round_function(x ^ 0x80800000) == round_function(x) ^ 0x02000000` and
/// `round_function(x ^ 0x00008080) == round_function(x) ^ 0x00000002`
/// for every input `x`.
pub fn round_function(input: u32) -> u32 {
    let [x0, x1, x2, x3] = unpack(input);

    let y1 = g1(x0 ^ x1, x2 ^ x3);
    let y0 = g0(x0, y1);
    let y2 = g0(y1, x2 ^ x3);
    let y3 = g1(y2, x3);

    pack([y0, y1, y2, y3])
}

/// XOR-folds each half of a word into its low byte: the bytes
/// `(a0, a1, a2, a3)` map to `(0, a0 ^ a1, a2 ^ a3, 0)`.
///
/// Lossy on the outer bytes, but the middle two output bytes of the
/// round function depend on the input only through these two folds.
#[inline(always)]
pub fn fold_halves(word: u32) -> u32 {
    let [a0, a1, a2, a3] = unpack(word);
    pack([0x00, a0 ^ a1, a2 ^ a3, 0x00])
}

/// A structure representing the FEAL-4 cipher with six independent
/// 32-bit subkeys.
///
/// Subkeys 0 to 3 are the round keys, subkeys 4 and 5 whiten the
/// plaintext halves.
#[derive(Clone, Copy)]
pub struct Feal4 {
    subkeys: [u32; 6],
}

impl Feal4 {
    /// Create a new instance of the cipher with the given subkeys.
    pub fn new(subkeys: [u32; 6]) -> Feal4 {
        Feal4 { subkeys }
    }

    /// Create a new instance of the cipher with subkeys drawn from `rng`.
    pub fn random<R: Rng>(rng: &mut R) -> Feal4 {
        let mut subkeys = [0; 6];

        for subkey in subkeys.iter_mut() {
            *subkey = rng.gen();
        }

        Feal4 { subkeys }
    }

    /// Returns the six subkeys.
    pub fn subkeys(&self) -> [u32; 6] {
        self.subkeys
    }

    /// Returns the final round key, the one the attack recovers.
    pub fn last_round_key(&self) -> u32 {
        self.subkeys[3]
    }

    /// Encrypts a 64-bit block.
    pub fn encrypt(&self, plaintext: u64) -> u64 {
        let k = &self.subkeys;

        // Whitening, then the right half absorbs the left
        let left = (plaintext >> 32) as u32 ^ k[4];
        let right = (plaintext as u32 ^ k[5]) ^ left;

        let r1 = left ^ round_function(right ^ k[0]);
        let r2 = right ^ round_function(r1 ^ k[1]);
        let r3 = r1 ^ round_function(r2 ^ k[2]);
        let r4 = r2 ^ round_function(r3 ^ k[3]);

        // Output halves are (r4, r4 ^ r3), so left ^ right of a
        // ciphertext equals the final round's input chain value r3
        (u64::from(r4) << 32) | u64::from(r4 ^ r3)
    }

    /// Decrypts a 64-bit block.
    pub fn decrypt(&self, ciphertext: u64) -> u64 {
        let k = &self.subkeys;

        let r4 = (ciphertext >> 32) as u32;
        let r3 = r4 ^ ciphertext as u32;

        let r2 = r4 ^ round_function(r3 ^ k[3]);
        let r1 = r3 ^ round_function(r2 ^ k[2]);
        let right = r2 ^ round_function(r1 ^ k[1]);
        let left = r1 ^ round_function(right ^ k[0]);

        (u64::from(left ^ k[4]) << 32) | u64::from((right ^ left) ^ k[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn rotation_test() {
        assert_eq!(rot2(0x01), 0x04);
        assert_eq!(rot2(0x40), 0x01);
        assert_eq!(rot2(0x80), 0x02);
        assert_eq!(rot2(0xc0), 0x03);
        assert_eq!(rot2(0xff), 0xff);
    }

    #[test]
    fn mixer_test() {
        assert_eq!(g0(0x12, 0x34), 0x19);
        assert_eq!(g0(0xff, 0x01), 0x00);
        assert_eq!(g0(0x80, 0x80), 0x00);
        assert_eq!(g1(0x12, 0x34), 0x1d);
        assert_eq!(g1(0x7f, 0x80), 0x00);
        assert_eq!(g1(0xff, 0x00), 0x00);
    }

    #[test]
    fn round_function_test() {
        assert_eq!(round_function(0x00000000), 0x10041044);
        assert_eq!(round_function(0xffffffff), 0x0c041040);
    }

    #[test]
    fn fold_halves_test() {
        assert_eq!(fold_halves(0x00000000), 0x00000000);
        assert_eq!(fold_halves(0x12345678), 0x00262e00);
        assert_eq!(fold_halves(0xff00ff00), 0x00ffff00);
    }

    #[test]
    fn encryption_test() {
        let cipher = Feal4::new([0; 6]);

        assert_eq!(cipher.encrypt(0x0000000000000000), 0xffe37998fbc873f3);
        assert_eq!(cipher.encrypt(0xffffffffffffffff), 0x4af39782fa8dc310);
    }

    #[test]
    fn decryption_test() {
        let cipher = Feal4::new([0; 6]);

        assert_eq!(cipher.decrypt(0xffe37998fbc873f3), 0x0000000000000000);
        assert_eq!(cipher.decrypt(0x4af39782fa8dc310), 0xffffffffffffffff);
    }

    quickcheck! {
        fn mixer_sums_commute(a: u8, b: u8) -> bool {
            g0(a, b) == g0(b, a) && g1(a, b) == g1(b, a)
        }

        fn mixers_differ_by_carry(a: u8, b: u8) -> bool {
            g1(a, b) == g0(a, b.wrapping_add(1))
        }

        fn pack_unpack_roundtrip(word: u32) -> bool {
            pack(unpack(word)) == word
        }

        fn first_differential_holds(x: u32) -> bool {
            round_function(x ^ 0x80800000) == round_function(x) ^ 0x02000000
        }

        fn second_differential_holds(x: u32) -> bool {
            round_function(x ^ 0x00008080) == round_function(x) ^ 0x00000002
        }

        fn fold_halves_is_linear(x: u32, y: u32) -> bool {
            fold_halves(x ^ y) == fold_halves(x) ^ fold_halves(y)
        }

        fn fold_halves_fixes_its_image(x: u32) -> bool {
            fold_halves(fold_halves(x)) == fold_halves(x)
        }

        fn fold_halves_clears_outer_bytes(x: u32) -> bool {
            fold_halves(x) & 0xff0000ff == 0
        }

        fn encryption_decryption_roundtrip(
            plaintext: u64,
            k0: u32, k1: u32, k2: u32, k3: u32, k4: u32, k5: u32
        ) -> bool {
            let cipher = Feal4::new([k0, k1, k2, k3, k4, k5]);
            cipher.decrypt(cipher.encrypt(plaintext)) == plaintext
        }
    }
}
