use crate::{Generator, GeneratorError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Bytes at or above this bound are discarded so `byte % 62` stays uniform.
const BASE62_REJECTION_BOUND: u8 = 248;

pub const DEFAULT_SHORT_CODE_LENGTH: usize = 8;
pub const DEFAULT_PASTE_ID_LENGTH: usize = 10;

fn fill_secure(buf: &mut [u8]) -> Result<(), GeneratorError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| GeneratorError::Entropy(e.to_string()))
}

/// Random short codes over `[0-9A-Za-z]` drawn from the OS CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct Base62Generator {
    length: usize,
}

impl Base62Generator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for Base62Generator {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_CODE_LENGTH)
    }
}

impl Generator for Base62Generator {
    fn generate(&self) -> Result<String, GeneratorError> {
        let mut code = String::with_capacity(self.length);
        // A little headroom so most codes need a single read.
        let mut buf = vec![0_u8; self.length + self.length / 4 + 1];

        while code.len() < self.length {
            fill_secure(&mut buf)?;
            for byte in buf.iter().copied() {
                if byte >= BASE62_REJECTION_BOUND {
                    continue;
                }
                code.push(char::from(BASE62_ALPHABET[usize::from(byte % 62)]));
                if code.len() == self.length {
                    break;
                }
            }
        }

        Ok(code)
    }
}

/// Random ids over `[A-Za-z0-9_-]`: `length` random bytes, base64url
/// encoded and cut to `length` characters.
#[derive(Debug, Clone, Copy)]
pub struct UrlSafeIdGenerator {
    length: usize,
}

impl UrlSafeIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for UrlSafeIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PASTE_ID_LENGTH)
    }
}

impl Generator for UrlSafeIdGenerator {
    fn generate(&self) -> Result<String, GeneratorError> {
        let mut bytes = vec![0_u8; self.length];
        fill_secure(&mut bytes)?;

        let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);
        encoded.truncate(self.length);
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base62_default_length_and_alphabet() {
        let generator = Base62Generator::default();

        for _ in 0..200 {
            let code = generator.generate().unwrap();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
        }
    }

    #[test]
    fn base62_custom_length() {
        let code = Base62Generator::new(32).generate().unwrap();
        assert_eq!(code.len(), 32);
        assert_eq!(Base62Generator::new(0).generate().unwrap(), "");
    }

    #[test]
    fn base62_covers_whole_alphabet() {
        let generator = Base62Generator::new(64);
        let mut seen = HashSet::new();
        for _ in 0..100 {
            seen.extend(generator.generate().unwrap().chars());
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn url_safe_default_length_and_alphabet() {
        let generator = UrlSafeIdGenerator::default();

        for _ in 0..200 {
            let id = generator.generate().unwrap();
            assert_eq!(id.len(), 10);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "{id}"
            );
        }
    }

    #[test]
    fn url_safe_short_lengths_have_no_padding() {
        for length in 1..=12 {
            let id = UrlSafeIdGenerator::new(length).generate().unwrap();
            assert_eq!(id.len(), length);
            assert!(!id.contains('='));
        }
    }

    #[test]
    fn generated_values_differ() {
        let generator = Base62Generator::default();
        let codes: HashSet<_> = (0..1_000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Base62Generator>();
        assert_send_sync::<UrlSafeIdGenerator>();
    }
}
