//! In-place authenticated encryption
//!
//! The whole file is read into zeroizing memory, sealed with AES-256-GCM
//! under the vault key and written back over the same inode as
//! `nonce || ciphertext || tag`. The sealed buffer is always longer than the
//! plaintext, so a complete write leaves no plaintext bytes behind.
//!
//! NOTE: the file is held in memory in full; very large targets are bounded
//! by available RAM.

use std::fs::{File, FileTimes, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{Result, Stage, WipeError};
use crate::execution::StatusSink;
use crate::security::target::{FileState, FileTarget};
use crate::security::vault::SecureKey;

/// AES-GCM nonce length
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length
pub const TAG_LEN: usize = 16;

/// Seal `plaintext` under `key` with a fresh random nonce.
/// Output layout: `nonce || ciphertext || tag`.
pub fn seal(key: &SecureKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let key_bytes = key
        .expose()
        .ok_or_else(|| WipeError::Encryption("key already destroyed".to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(&key_bytes[..])
        .map_err(|e| WipeError::Encryption(format!("AES cipher creation failed: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| WipeError::Encryption(format!("Nonce generation failed: {}", e)))?;

    #[allow(deprecated)]
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| WipeError::Encryption(format!("GCM seal failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Encrypt `target` in place and restore its original timestamps.
///
/// Nothing is written until sealing succeeds. A failed write is retried once
/// from offset 0 so the file never ends up as a plaintext/ciphertext mix
/// without a full rewrite having been attempted.
pub fn encrypt_in_place(
    target: &mut FileTarget,
    key: &SecureKey,
    status: &dyn StatusSink,
) -> Result<()> {
    status.status("🔐 Encrypting file before deletion...");

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&target.path)
        .map_err(|e| WipeError::io(Stage::Encrypt, e))?;

    let plaintext = read_all(&mut file).map_err(|e| WipeError::io(Stage::Encrypt, e))?;
    let sealed = seal(key, &plaintext)?;
    drop(plaintext);

    if let Err(first) = rewrite(&mut file, &sealed) {
        log::warn!("Encrypted rewrite failed ({}), retrying full rewrite", first);
        status.status(&format!("⚠️ Encrypted rewrite failed, retrying: {}", first));
        rewrite(&mut file, &sealed).map_err(|e| WipeError::io(Stage::Encrypt, e))?;
    }

    target.size = sealed.len() as u64;
    target.advance(FileState::Ciphertext);

    if let Err(e) = restore_times(&file, target) {
        log::warn!("Could not restore timestamps after encryption: {}", e);
        status.status(&format!("⚠️ Timestamp restore after encryption failed: {}", e));
    }

    status.status(&format!("🔒 Encrypted {} bytes in place", target.size));
    Ok(())
}

fn read_all(file: &mut File) -> io::Result<Zeroizing<Vec<u8>>> {
    let len = file.metadata()?.len();
    let mut buffer = Zeroizing::new(Vec::with_capacity(len as usize));
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn rewrite(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(data)?;
    file.set_len(data.len() as u64)?;
    file.sync_all()
}

fn restore_times(file: &File, target: &FileTarget) -> io::Result<()> {
    let mut times = FileTimes::new();
    if let Some(modified) = target.modified {
        times = times.set_modified(modified);
    }
    if let Some(accessed) = target.accessed.or(target.modified) {
        times = times.set_accessed(accessed);
    }
    file.set_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::CollectingSink;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn open_cipher(key: &SecureKey, sealed: &[u8]) -> Vec<u8> {
        let cipher = Aes256Gcm::new_from_slice(&key.expose().unwrap()[..]).unwrap();
        #[allow(deprecated)]
        let nonce = Nonce::from_slice(&sealed[..NONCE_LEN]);
        cipher.decrypt(nonce, &sealed[NONCE_LEN..]).unwrap()
    }

    fn assert_zeroize_on_drop<T: zeroize::ZeroizeOnDrop>() {}

    #[test]
    fn test_key_schedule_zeroized_on_drop() {
        assert_zeroize_on_drop::<aes::Aes256>();
    }

    #[test]
    fn test_seal_layout() {
        let key = SecureKey::generate().unwrap();
        let sealed = seal(&key, b"abcdefghij").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 10 + TAG_LEN);
        assert_eq!(open_cipher(&key, &sealed), b"abcdefghij");
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = SecureKey::generate().unwrap();
        let a = seal(&key, b"same input").unwrap();
        let b = seal(&key, b"same input").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_destroyed_key_is_encryption_error() {
        let mut key = SecureKey::generate().unwrap();
        key.destroy();
        assert!(matches!(seal(&key, b"x"), Err(WipeError::Encryption(_))));
    }

    #[test]
    fn test_encrypt_in_place_preserves_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.txt");
        fs::write(&path, b"top secret content").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        let file = File::options().write(true).open(&path).unwrap();
        file.set_times(FileTimes::new().set_modified(past).set_accessed(past))
            .unwrap();
        drop(file);

        let mut target = FileTarget::open(&path).unwrap();
        let key = SecureKey::generate().unwrap();
        let sink = CollectingSink::new();
        encrypt_in_place(&mut target, &key, &sink).unwrap();

        let on_disk = fs::read(&path).unwrap();
        assert_eq!(on_disk.len(), NONCE_LEN + 18 + TAG_LEN);
        assert!(!on_disk.windows(6).any(|w| w == b"secret"));
        assert_eq!(open_cipher(&key, &on_disk), b"top secret content");

        assert_eq!(target.state(), FileState::Ciphertext);
        assert_eq!(target.size, on_disk.len() as u64);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), past);
        assert!(sink.contains("Encrypting"));
    }

    #[test]
    fn test_encrypt_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();

        let mut target = FileTarget::open(&path).unwrap();
        let key = SecureKey::generate().unwrap();
        encrypt_in_place(&mut target, &key, &CollectingSink::new()).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), (NONCE_LEN + TAG_LEN) as u64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone");
        fs::write(&path, b"data").unwrap();
        let mut target = FileTarget::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let key = SecureKey::generate().unwrap();
        let err = encrypt_in_place(&mut target, &key, &CollectingSink::new()).unwrap_err();
        assert_eq!(err.stage(), Stage::Encrypt);
        assert_eq!(target.state(), FileState::Plaintext);
    }
}
