use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// One-way credential hashing with an embedded per-call salt.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;

    /// Any failure, including an unparseable stored hash, reads as a mismatch.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = Argon2Hasher::default();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = Argon2Hasher::default();
        let hash = hasher.hash("correct-horse").expect("hashing should succeed");
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn same_input_hashes_differently() {
        let hasher = Argon2Hasher::default();
        let a = hasher.hash("Secret1!").unwrap();
        let b = hasher.hash("Secret1!").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, "Secret1!");
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let hasher = Argon2Hasher::default();
        assert!(!hasher.verify("anything", "not-a-valid-hash"));
    }

    #[test]
    fn unicode_passwords_are_supported() {
        let hasher = Argon2Hasher::default();
        let hash = hasher.hash("пароль-密码-🔑").unwrap();
        assert!(hasher.verify("пароль-密码-🔑", &hash));
    }
}
