use std::path::Path;

use atlas_core::AppError;
use reqwest::{Certificate, ClientBuilder, Identity};
use rustls_pemfile::Item;

use crate::config::{KeyStoreType, SslConfig};

/// Client identity and extra trust anchors loaded from an [`SslConfig`].
pub struct TlsMaterial {
    pub identity: Identity,
    pub roots: Vec<Certificate>,
    key_store_type: KeyStoreType,
}

impl TlsMaterial {
    pub fn load(config: &SslConfig) -> Result<Self, AppError> {
        let key_store = read(&config.key_store, "key store")?;
        let identity = match config.key_store_type {
            KeyStoreType::Pkcs12 => {
                Identity::from_pkcs12_der(&key_store, &config.key_store_password)
            }
            KeyStoreType::Pem => {
                check_pem_bundle(&key_store)?;
                Identity::from_pem(&key_store)
            }
        }
        .map_err(|e| {
            AppError::TlsError(format!(
                "Cannot load {} key store {}: {e}",
                config.key_store_type,
                config.key_store.display()
            ))
        })?;

        let roots = match &config.trust_store {
            Some(path) => Certificate::from_pem_bundle(&read(path, "trust store")?).map_err(|e| {
                AppError::TlsError(format!("Invalid trust store {}: {e}", path.display()))
            })?,
            None => Vec::new(),
        };

        tracing::debug!(
            key_store = %config.key_store.display(),
            key_store_type = %config.key_store_type,
            extra_roots = roots.len(),
            "Loaded client TLS material"
        );
        Ok(Self {
            identity,
            roots,
            key_store_type: config.key_store_type,
        })
    }

    /// Install the identity and roots on `builder`. PKCS#12 archives need the
    /// native TLS backend, PEM bundles the rustls one.
    pub fn configure(self, builder: ClientBuilder) -> ClientBuilder {
        let mut builder = match self.key_store_type {
            KeyStoreType::Pkcs12 => builder.use_native_tls(),
            KeyStoreType::Pem => builder.use_rustls_tls(),
        }
        .identity(self.identity);
        for root in self.roots {
            builder = builder.add_root_certificate(root);
        }
        builder
    }
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>, AppError> {
    std::fs::read(path)
        .map_err(|e| AppError::TlsError(format!("Cannot read {what} {}: {e}", path.display())))
}

/// A PEM key store needs at least one certificate and exactly one private key.
fn check_pem_bundle(bundle: &[u8]) -> Result<(), AppError> {
    let mut certificates = 0;
    let mut keys = 0;
    for item in rustls_pemfile::read_all(&mut &bundle[..]) {
        match item.map_err(|e| AppError::TlsError(format!("Malformed PEM key store: {e}")))? {
            Item::X509Certificate(_) => certificates += 1,
            Item::Pkcs1Key(_) | Item::Pkcs8Key(_) | Item::Sec1Key(_) => keys += 1,
            _ => {}
        }
    }

    if certificates == 0 {
        return Err(AppError::TlsError(
            "PEM key store contains no certificate".into(),
        ));
    }
    match keys {
        0 => Err(AppError::TlsError(
            "PEM key store contains no private key".into(),
        )),
        1 => Ok(()),
        n => Err(AppError::TlsError(format!(
            "PEM key store contains {n} private keys, expected one"
        ))),
    }
}
