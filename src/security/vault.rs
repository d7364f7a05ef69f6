//! Key vault - single-use symmetric key with guaranteed zeroization

use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::{Result, WipeError};

/// Size of the symmetric key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Symmetric key owned by exactly one wipe operation.
///
/// The backing memory is zeroed by `destroy()` or on drop, whichever comes
/// first. Destroying twice is a no-op.
pub struct SecureKey {
    bytes: Option<Box<[u8; KEY_LEN]>>,
}

impl SecureKey {
    /// Draw a fresh key from the operating system CSPRNG
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Draw a fresh key from `rng`. A failing source is fatal.
    pub fn generate_with<R: TryRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = Box::new([0u8; KEY_LEN]);
        if let Err(e) = rng.try_fill_bytes(&mut bytes[..]) {
            bytes.zeroize();
            return Err(WipeError::KeyGeneration(e.to_string()));
        }
        Ok(Self { bytes: Some(bytes) })
    }

    /// Key material, or `None` once destroyed
    pub fn expose(&self) -> Option<&[u8; KEY_LEN]> {
        self.bytes.as_deref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.bytes.is_none()
    }

    /// Zero and release the key
    pub fn destroy(&mut self) {
        if let Some(mut bytes) = self.bytes.take() {
            bytes.zeroize();
            log::debug!("🔑 Encryption key zeroized");
        }
    }
}

impl Drop for SecureKey {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureKey")
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
