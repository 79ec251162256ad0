use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id hashing of `password + salt`, where the salt is process-wide.
///
/// Every hash additionally carries its own random salt inside the PHC string,
/// so equal passwords still produce distinct hashes.
pub struct SaltedHasher {
    salt: String,
    params: Params,
}

impl SaltedHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self::with_params(salt, Params::default())
    }

    pub fn with_params(salt: impl Into<String>, params: Params) -> Self {
        Self {
            salt: salt.into(),
            params,
        }
    }

    /// Cheap parameters so debug-build tests stay fast.
    #[cfg(test)]
    pub(crate) fn for_tests(salt: &str) -> Self {
        let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
        Self::with_params(salt, params)
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn salted(&self, plain: &str) -> String {
        let mut salted = String::with_capacity(plain.len() + self.salt.len());
        salted.push_str(plain);
        salted.push_str(&self.salt);
        salted
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(self.salted(plain).as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Spends the same Argon2 work as `verify` when there is no stored hash.
    /// Always false.
    pub fn verify_absent(&self, plain: &str) -> bool {
        let _ = self.hash(plain);
        false
    }

    /// Constant-time check of `plain` against a stored PHC hash.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(self.salted(plain).as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = SaltedHasher::for_tests("pepper");
        let hash = hasher.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(hasher.verify("Secur3P@ssw0rd!", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = SaltedHasher::for_tests("pepper");
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hasher = SaltedHasher::for_tests("pepper");
        let hash = hasher.hash("plaintext-secret").unwrap();
        assert!(!hash.contains("plaintext-secret"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = SaltedHasher::for_tests("pepper");
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn salt_is_part_of_the_hashed_input() {
        let hash = SaltedHasher::for_tests("one").hash("pw").unwrap();
        assert!(!SaltedHasher::for_tests("two").verify("pw", &hash).unwrap());
        // "pw" + "one" is the same input as "pwo" + "ne"
        assert!(SaltedHasher::for_tests("ne").verify("pwo", &hash).unwrap());
    }

    #[test]
    fn verify_absent_never_matches() {
        let hasher = SaltedHasher::for_tests("pepper");
        assert!(!hasher.verify_absent("pw"));
        assert!(!hasher.verify_absent(""));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let hasher = SaltedHasher::for_tests("pepper");
        let err = hasher.verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
