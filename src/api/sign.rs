//! Request signing seam.
//!
//! The metadata endpoint expects an anti-bot token (`a_bogus`) derived from
//! the full query parameter set. The real derivation lives outside this
//! crate; the core only needs a pure `sign(params) -> token` function, so it
//! is modeled as a trait with a deterministic default implementation.

/// Produces the anti-bot token for one request.
///
/// Implementations must be pure: same parameters, same token.
pub trait Signer: Send + Sync {
    fn sign(&self, params: &[(String, String)]) -> String;
}

/// Default signer: a 64-bit mix over the canonical query string, rendered as
/// hex. Stands in for the real token derivation, which can be plugged in by
/// implementing [`Signer`].
#[derive(Debug, Clone, Default)]
pub struct QuerySigner {
    seed: u64,
}

impl QuerySigner {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Signer for QuerySigner {
    fn sign(&self, params: &[(String, String)]) -> String {
        let mut h1: u64 = 0x9e37_79b9_7f4a_7c15 ^ self.seed;
        let mut h2: u64 = 0xc2b2_ae3d_27d4_eb4f ^ self.seed;

        for (key, value) in params {
            for b in key.bytes().chain([b'=']).chain(value.bytes()).chain([b'&']) {
                h1 = (h1 ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3);
                h2 = h2.rotate_left(13) ^ h1;
            }
        }

        format!("{:016x}{:08x}", h1, (h2 >> 32) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sign_deterministic() {
        let signer = QuerySigner::default();
        let p = params(&[("a", "1"), ("b", "2")]);
        assert_eq!(signer.sign(&p), signer.sign(&p));
    }

    #[test]
    fn test_sign_sensitive_to_params() {
        let signer = QuerySigner::default();
        let t1 = signer.sign(&params(&[("a", "1")]));
        let t2 = signer.sign(&params(&[("a", "2")]));
        let t3 = signer.sign(&params(&[("b", "1")]));
        assert_ne!(t1, t2);
        assert_ne!(t1, t3);
    }

    #[test]
    fn test_sign_is_hex() {
        let signer = QuerySigner::new(7);
        let token = signer.sign(&params(&[("max_cursor", "0")]));
        assert_eq!(token.len(), 24);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
