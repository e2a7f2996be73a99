// ABOUTME: Passphrase-protected keystore holding AES-256-GCM encrypted private keys
// ABOUTME: Container key is derived from the passphrase with Argon2id
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Encrypted key container.
//!
//! The store is a small JSON file mapping key aliases to encrypted PKCS#8
//! private-key PEMs. Each entry is AES-256-GCM ciphertext with the 12-byte
//! nonce prepended; the container key is derived from the operator passphrase
//! with Argon2id and a per-store random salt. A wrong passphrase surfaces as
//! an AEAD failure when an entry is decrypted.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

const STORE_VERSION: u32 = 1;
const KDF_SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// On-disk representation of the store
#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    /// Base64 Argon2id salt for the container key
    kdf_salt: String,
    /// Alias -> base64(nonce || ciphertext of PKCS#8 PEM)
    entries: HashMap<String, String>,
}

/// Passphrase-protected key container.
///
/// Opened exactly once at startup; the file handle is scoped to the read and
/// released before any key material is derived.
pub struct KeyStore {
    container_key: Zeroizing<[u8; 32]>,
    kdf_salt: [u8; KDF_SALT_LEN],
    entries: HashMap<String, Vec<u8>>,
}

impl KeyStore {
    /// Create an empty store protected by `passphrase` with a fresh salt
    ///
    /// # Errors
    /// Returns an error if key derivation fails
    pub fn create(passphrase: &str) -> Result<Self> {
        use rand::RngCore;

        let mut kdf_salt = [0u8; KDF_SALT_LEN];
        rand::thread_rng().fill_bytes(&mut kdf_salt);

        let container_key = Self::derive_container_key(passphrase, &kdf_salt)?;

        Ok(Self {
            container_key,
            kdf_salt,
            entries: HashMap::new(),
        })
    }

    /// Open an existing store file with the given passphrase
    ///
    /// # Errors
    /// Returns an error if the file is missing or unreadable, the container
    /// format is invalid, or key derivation fails. A wrong passphrase is only
    /// detected when an entry is decrypted.
    pub fn open(path: &Path, passphrase: &str) -> Result<Self> {
        // Scoped acquisition: the handle is released as soon as the bytes
        // are read, before any key material exists in this frame.
        let raw = {
            let mut file = std::fs::File::open(path)
                .with_context(|| format!("keystore not found at {}", path.display()))?;
            let mut buf = String::new();
            file.read_to_string(&mut buf)
                .with_context(|| format!("failed to read keystore at {}", path.display()))?;
            buf
        };

        let store_file: StoreFile =
            serde_json::from_str(&raw).context("keystore container is not valid JSON")?;

        if store_file.version != STORE_VERSION {
            return Err(anyhow!(
                "unsupported keystore version {}",
                store_file.version
            ));
        }

        let salt_bytes = general_purpose::STANDARD
            .decode(&store_file.kdf_salt)
            .context("keystore salt is not valid base64")?;
        if salt_bytes.len() != KDF_SALT_LEN {
            return Err(anyhow!(
                "keystore salt must be {KDF_SALT_LEN} bytes, got {}",
                salt_bytes.len()
            ));
        }
        let mut kdf_salt = [0u8; KDF_SALT_LEN];
        kdf_salt.copy_from_slice(&salt_bytes);

        let mut entries = HashMap::with_capacity(store_file.entries.len());
        for (alias, blob) in &store_file.entries {
            let ciphertext = general_purpose::STANDARD
                .decode(blob)
                .with_context(|| format!("keystore entry '{alias}' is not valid base64"))?;
            entries.insert(alias.clone(), ciphertext);
        }

        let container_key = Self::derive_container_key(passphrase, &kdf_salt)?;

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            "opened keystore container"
        );

        Ok(Self {
            container_key,
            kdf_salt,
            entries,
        })
    }

    /// Encrypt and insert a private-key PEM under `alias`
    ///
    /// # Errors
    /// Returns an error if encryption fails
    pub fn insert(&mut self, alias: &str, private_key_pem: &str) -> Result<()> {
        use rand::RngCore;

        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.container_key.as_ref()));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, private_key_pem.as_bytes())
            .map_err(|e| anyhow!("keystore encryption failed: {e}"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        self.entries.insert(alias.to_owned(), blob);
        Ok(())
    }

    /// Decrypt the private-key PEM stored under `alias`.
    ///
    /// The returned PEM is zeroized on drop.
    ///
    /// # Errors
    /// Returns an error if the alias is absent or decryption fails (wrong
    /// passphrase or corrupted entry)
    pub fn private_key_pem(&self, alias: &str) -> Result<Zeroizing<String>> {
        let blob = self
            .entries
            .get(alias)
            .ok_or_else(|| anyhow!("key alias '{alias}' not present in keystore"))?;

        if blob.len() < NONCE_LEN {
            return Err(anyhow!("keystore entry '{alias}' is truncated"));
        }

        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.container_key.as_ref()));
        let nonce = GenericArray::from_slice(&blob[..NONCE_LEN]);

        let mut plaintext = cipher
            .decrypt(nonce, &blob[NONCE_LEN..])
            .map_err(|_| anyhow!("failed to decrypt key '{alias}': wrong passphrase?"))?;

        let pem = String::from_utf8(plaintext.clone())
            .context("decrypted key entry is not valid UTF-8")?;
        plaintext.zeroize();

        Ok(Zeroizing::new(pem))
    }

    /// Persist the store to `path`
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let entries = self
            .entries
            .iter()
            .map(|(alias, blob)| (alias.clone(), general_purpose::STANDARD.encode(blob)))
            .collect();

        let store_file = StoreFile {
            version: STORE_VERSION,
            kdf_salt: general_purpose::STANDARD.encode(self.kdf_salt),
            entries,
        };

        let json = serde_json::to_string_pretty(&store_file)
            .context("failed to serialize keystore container")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write keystore to {}", path.display()))?;

        tracing::info!(path = %path.display(), "keystore saved");
        Ok(())
    }

    /// Aliases present in the store
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Derive the 32-byte container key from the passphrase with Argon2id
    fn derive_container_key(
        passphrase: &str,
        salt: &[u8; KDF_SALT_LEN],
    ) -> Result<Zeroizing<[u8; 32]>> {
        let mut key = Zeroizing::new([0u8; 32]);
        argon2::Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, key.as_mut())
            .map_err(|e| anyhow!("container key derivation failed: {e}"))?;
        Ok(key)
    }
}
