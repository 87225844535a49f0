/// Password hashing and verification using PBKDF2-HMAC-SHA512
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// Derived key length in bytes
const KEY_SIZE: usize = 64;
/// Random salt length in bytes
const SALT_SIZE: usize = 64;
/// PBKDF2 iteration count
const ITERATIONS: u32 = 350_000;

/// Hash a password with a freshly generated random salt.
///
/// Returns `(hash, salt)`; both are raw bytes intended for BYTEA storage.
pub fn hash_password(password: &str) -> (Vec<u8>, Vec<u8>) {
    let mut salt = vec![0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let hash = derive(password, &salt);
    (hash, salt)
}

/// Verify a password against a stored hash and salt.
///
/// Comparison is constant-time so verification latency does not reveal how
/// many bytes of the derived key matched.
pub fn verify_password(password: &str, hash: &[u8], salt: &[u8]) -> bool {
    let candidate = derive(password, salt);
    candidate.ct_eq(hash).into()
}

fn derive(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, ITERATIONS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let (hash, salt) = hash_password("correct horse battery staple");
        assert_eq!(hash.len(), KEY_SIZE);
        assert_eq!(salt.len(), SALT_SIZE);
        assert!(verify_password("correct horse battery staple", &hash, &salt));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let (hash, salt) = hash_password("correct horse battery staple");
        assert!(!verify_password("incorrect horse", &hash, &salt));
    }

    #[test]
    fn same_password_different_salts_produce_different_hashes() {
        let (hash1, salt1) = hash_password("duplicate");
        let (hash2, salt2) = hash_password("duplicate");
        assert_ne!(salt1, salt2);
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn verification_is_salt_sensitive() {
        let (hash, _) = hash_password("sensitive");
        let other_salt = vec![7u8; SALT_SIZE];
        assert!(!verify_password("sensitive", &hash, &other_salt));
    }
}
