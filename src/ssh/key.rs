//! Private key inspection
//!
//! Every accepted key is decoded in full, so a truncated or corrupted file is
//! reported here instead of surfacing later as a failed connection on every
//! node. Encrypted key material is never decrypted.

use std::path::Path;

use pem::Pem;
use pkcs8::der::Decode;

use crate::error::Error;

/// Fail unless the key at `path` is a private key usable without a passphrase
pub async fn check_unencrypted(path: &Path) -> Result<(), Error> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    inspect(path, &data)
}

fn inspect(path: &Path, data: &[u8]) -> Result<(), Error> {
    let block = pem::parse(data).map_err(|e| Error::key_parse(e.to_string()))?;

    let encrypted = match block.tag() {
        "OPENSSH PRIVATE KEY" => ssh_key::PrivateKey::from_openssh(data)
            .map_err(|e| Error::key_parse(format!("openssh key: {}", e)))?
            .is_encrypted(),
        "ENCRYPTED PRIVATE KEY" => true,
        "RSA PRIVATE KEY" | "EC PRIVATE KEY" if has_legacy_encryption(&block) => true,
        "PRIVATE KEY" => {
            pkcs8::PrivateKeyInfo::from_der(block.contents())
                .map_err(|e| Error::key_parse(format!("PKCS#8 key: {}", e)))?;
            false
        }
        "RSA PRIVATE KEY" => {
            pkcs1::RsaPrivateKey::from_der(block.contents())
                .map_err(|e| Error::key_parse(format!("PKCS#1 RSA key: {}", e)))?;
            false
        }
        "EC PRIVATE KEY" => {
            sec1::EcPrivateKey::from_der(block.contents())
                .map_err(|e| Error::key_parse(format!("SEC1 EC key: {}", e)))?;
            false
        }
        other => {
            return Err(Error::key_parse(format!(
                "unsupported PEM block {:?}",
                other
            )))
        }
    };

    if encrypted {
        return Err(Error::EncryptedKey {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// RFC 1421 style encryption, announced by `Proc-Type: 4,ENCRYPTED`
fn has_legacy_encryption(block: &Pem) -> bool {
    block
        .headers()
        .get("Proc-Type")
        .is_some_and(|v| v.contains("ENCRYPTED"))
}
