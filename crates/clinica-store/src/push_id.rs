//! Chronologically ordered push keys.
//!
//! A push key is 20 characters: 8 encoding the millisecond timestamp in a
//! lexically ordered 64-character alphabet, followed by 12 random
//! characters.  Keys generated later always sort later, even within the
//! same millisecond, because the random tail is incremented instead of
//! redrawn when the clock has not moved.

use rand::Rng;

const PUSH_ALPHABET: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Generator state; the store keeps one behind its lock.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_millis: i64,
    last_random: [u8; 12],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next key for the given timestamp (milliseconds since
    /// the epoch).
    pub fn generate(&mut self, now_millis: i64) -> String {
        let duplicate_time = now_millis == self.last_millis;
        self.last_millis = now_millis;

        if duplicate_time {
            // Same millisecond as the previous key: bump the tail so the
            // new key still sorts after it.
            for slot in self.last_random.iter_mut().rev() {
                if *slot == 63 {
                    *slot = 0;
                } else {
                    *slot += 1;
                    break;
                }
            }
        } else {
            let mut rng = rand::thread_rng();
            for slot in self.last_random.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
        }

        let mut key = String::with_capacity(20);
        let mut ts = now_millis;
        let mut stamp = [0u8; 8];
        for slot in stamp.iter_mut().rev() {
            *slot = (ts % 64) as u8;
            ts /= 64;
        }
        for index in stamp {
            key.push(PUSH_ALPHABET[index as usize] as char);
        }
        for index in self.last_random {
            key.push(PUSH_ALPHABET[index as usize] as char);
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_twenty_chars_from_the_alphabet() {
        let mut gen = PushIdGenerator::new();
        let key = gen.generate(1_700_000_000_000);
        assert_eq!(key.len(), 20);
        assert!(key.bytes().all(|b| PUSH_ALPHABET.contains(&b)));
    }

    #[test]
    fn later_timestamps_sort_later() {
        let mut gen = PushIdGenerator::new();
        let a = gen.generate(1_700_000_000_000);
        let b = gen.generate(1_700_000_000_001);
        assert!(a < b);
    }

    #[test]
    fn same_millisecond_still_sorts_in_generation_order() {
        let mut gen = PushIdGenerator::new();
        let mut previous = gen.generate(42);
        for _ in 0..100 {
            let next = gen.generate(42);
            assert!(previous < next, "{previous} !< {next}");
            previous = next;
        }
    }
}
