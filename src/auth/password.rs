use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Structural marker of a PHC-format hash. Anything without it is a legacy
/// plaintext value left over from the old seeded admin record.
const HASH_MARKER: &str = "$argon2";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Outcome of checking a candidate password against whatever is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Password matched. `needs_rehash` is set when the stored value was
    /// legacy plaintext and should be replaced with a proper hash.
    Match { needs_rehash: bool },
    Mismatch,
}

/// Verifies against a stored value that may still be legacy plaintext
/// (one-time migration path for the provisioned admin record).
pub fn verify_stored(plain: &str, stored: &str) -> anyhow::Result<VerifyOutcome> {
    if !stored.starts_with(HASH_MARKER) {
        return Ok(if stored == plain {
            VerifyOutcome::Match { needs_rehash: true }
        } else {
            VerifyOutcome::Mismatch
        });
    }
    Ok(if verify_password(plain, stored)? {
        VerifyOutcome::Match {
            needs_rehash: false,
        }
    } else {
        VerifyOutcome::Mismatch
    })
}
