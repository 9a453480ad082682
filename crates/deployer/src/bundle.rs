//! Certificate bundle and component types
//!
//! A renewal produces a "live" directory holding the four files certbot
//! always writes: `cert.pem`, `chain.pem`, `fullchain.pem` and
//! `privkey.pem`. [`CertificateBundle`] reads all four eagerly, parses the
//! primary certificate and exposes its expiry and common name so deployer
//! plugins never have to touch X.509 themselves.

use crate::error::{DeployerError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use x509_parser::prelude::*;

/// Label of the "cert only" component.
pub const CERT: &str = "cert";
/// Filename certbot uses for the "cert only" file.
pub const CERT_FILENAME: &str = "cert.pem";
/// Label of the intermediates-only component.
pub const INTERMEDIATES: &str = "intermediates";
/// Filename certbot uses for the intermediates-only file.
pub const INTERMEDIATES_FILENAME: &str = "chain.pem";
/// Label of the full-chain component.
pub const FULLCHAIN: &str = "fullchain";
/// Filename certbot uses for the full-chain file.
pub const FULLCHAIN_FILENAME: &str = "fullchain.pem";
/// Label of the private-key component.
pub const KEY: &str = "privkey";
/// Filename certbot uses for the private-key file.
pub const KEY_FILENAME: &str = "privkey.pem";

/// Component labels in their canonical order.
pub const LABELS: [&str; 4] = [CERT, INTERMEDIATES, FULLCHAIN, KEY];

/// One file of a certificate bundle.
///
/// The file under `path` is read once at construction and the contents are
/// immutable afterwards. Two components compare equal when their `path`,
/// `filename` and `label` all match; contents are a pure derivation of the
/// path and are never compared.
#[derive(Debug, Clone)]
pub struct CertificateComponent {
    path: PathBuf,
    filename: &'static str,
    label: &'static str,
    contents: String,
}

impl CertificateComponent {
    /// Read the component file at `path`.
    ///
    /// Fails with [`DeployerError::NotFound`] when the file does not exist.
    /// There is no retry: a missing component is fatal for the whole run.
    pub fn new(path: PathBuf, filename: &'static str, label: &'static str) -> Result<Self> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeployerError::NotFound { path });
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            filename,
            label,
            contents,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &'static str {
        self.filename
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl PartialEq for CertificateComponent {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.filename == other.filename && self.label == other.label
    }
}

impl Eq for CertificateComponent {}

/// The certificate bundle produced by one renewal.
///
/// Construction reads all four component files and parses the primary
/// certificate for metadata. The bundle is immutable afterwards and is
/// handed to the selected plugin's `deploy` by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    path: PathBuf,
    cert: CertificateComponent,
    intermediates: CertificateComponent,
    fullchain: CertificateComponent,
    key: CertificateComponent,
    expires: String,
    common_name: String,
}

impl CertificateBundle {
    /// Build a bundle from a certbot "live" directory.
    ///
    /// Fails with [`DeployerError::NotFound`] when any expected file is
    /// absent, [`DeployerError::Parse`] when `cert.pem` is not valid
    /// PEM/X.509, and [`DeployerError::Metadata`] when the certificate has
    /// neither a Common Name nor a DNS Subject Alternative Name.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cert = CertificateComponent::new(path.join(CERT_FILENAME), CERT_FILENAME, CERT)?;
        let intermediates = CertificateComponent::new(
            path.join(INTERMEDIATES_FILENAME),
            INTERMEDIATES_FILENAME,
            INTERMEDIATES,
        )?;
        let fullchain = CertificateComponent::new(
            path.join(FULLCHAIN_FILENAME),
            FULLCHAIN_FILENAME,
            FULLCHAIN,
        )?;
        let key = CertificateComponent::new(path.join(KEY_FILENAME), KEY_FILENAME, KEY)?;

        let (expires, common_name) = extract_metadata(&cert)?;

        debug!(
            path = %path.display(),
            common_name = %common_name,
            expires = %expires,
            "certificate bundle initialized"
        );

        Ok(Self {
            path,
            cert,
            intermediates,
            fullchain,
            key,
            expires,
            common_name,
        })
    }

    /// The renewal directory this bundle was built from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cert(&self) -> &CertificateComponent {
        &self.cert
    }

    pub fn intermediates(&self) -> &CertificateComponent {
        &self.intermediates
    }

    pub fn fullchain(&self) -> &CertificateComponent {
        &self.fullchain
    }

    pub fn key(&self) -> &CertificateComponent {
        &self.key
    }

    /// Expiry ("not valid after") of the primary certificate, formatted
    /// `YYYY-MM-DDTHH:MM:SS` in UTC.
    pub fn expires(&self) -> &str {
        &self.expires
    }

    /// Subject Common Name of the primary certificate, falling back to its
    /// first DNS Subject Alternative Name.
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// Component labels in their canonical order, independent of storage.
    pub fn labels(&self) -> [&'static str; 4] {
        LABELS
    }

    /// The components in canonical label order.
    pub fn components(&self) -> [&CertificateComponent; 4] {
        [&self.cert, &self.intermediates, &self.fullchain, &self.key]
    }

    /// Look up a component by label.
    ///
    /// Fails with [`DeployerError::UnknownLabel`] for anything other than
    /// the four labels in [`LABELS`].
    pub fn component(&self, label: &str) -> Result<&CertificateComponent> {
        match label {
            CERT => Ok(&self.cert),
            INTERMEDIATES => Ok(&self.intermediates),
            FULLCHAIN => Ok(&self.fullchain),
            KEY => Ok(&self.key),
            other => Err(DeployerError::UnknownLabel(other.to_string())),
        }
    }
}

impl fmt::Display for CertificateBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (common name {}, expires {})",
            self.path.display(),
            self.common_name,
            self.expires
        )
    }
}

/// Parse the primary certificate and pull out `(expires, common_name)`.
fn extract_metadata(cert: &CertificateComponent) -> Result<(String, String)> {
    let parse_err = |reason: String| DeployerError::Parse {
        path: cert.path().to_path_buf(),
        reason,
    };

    let pem = ::pem::parse(cert.contents()).map_err(|e| parse_err(e.to_string()))?;
    let (_, x509) =
        X509Certificate::from_der(pem.contents()).map_err(|e| parse_err(format!("{e:?}")))?;

    let not_after = x509.validity().not_after.to_datetime();
    let expires = DateTime::<Utc>::from_timestamp(not_after.unix_timestamp(), 0)
        .ok_or_else(|| parse_err("`not after` timestamp out of range".to_string()))?
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();

    // The Common Name is not required to be present; the first DNS-type
    // Subject Alternative Name stands in when it is missing.
    let common_name = x509
        .subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string);
    let common_name = match common_name {
        Some(common_name) => common_name,
        None => first_dns_san(&x509).ok_or_else(|| DeployerError::Metadata {
            path: cert.path().to_path_buf(),
        })?,
    };

    Ok((expires, common_name))
}

fn first_dns_san(x509: &X509Certificate<'_>) -> Option<String> {
    let san = x509.subject_alternative_name().ok().flatten()?;
    san.value.general_names.iter().find_map(|name| match name {
        GeneralName::DNSName(dns) => Some(dns.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SelfSigned, COMMON_NAME};
    use tempfile::TempDir;

    #[test]
    fn test_bundle_labels_and_components() {
        let dir = TempDir::new().unwrap();
        let bundle = SelfSigned::new().write_bundle(dir.path()).unwrap();

        assert_eq!(bundle.labels(), [CERT, INTERMEDIATES, FULLCHAIN, KEY]);

        assert_eq!(bundle.cert().label(), CERT);
        assert_eq!(bundle.cert().filename(), CERT_FILENAME);
        assert_eq!(bundle.cert().path(), dir.path().join(CERT_FILENAME));

        assert_eq!(bundle.key().label(), KEY);
        assert_eq!(bundle.key().filename(), KEY_FILENAME);
        assert_eq!(bundle.key().path(), dir.path().join(KEY_FILENAME));

        assert_eq!(bundle.fullchain().label(), FULLCHAIN);
        assert_eq!(bundle.fullchain().filename(), FULLCHAIN_FILENAME);

        assert_eq!(bundle.intermediates().label(), INTERMEDIATES);
        assert_eq!(bundle.intermediates().filename(), INTERMEDIATES_FILENAME);

        let ordered: Vec<&str> = bundle.components().iter().map(|c| c.label()).collect();
        assert_eq!(ordered, vec![CERT, INTERMEDIATES, FULLCHAIN, KEY]);
    }

    #[test]
    fn test_component_lookup() {
        let dir = TempDir::new().unwrap();
        let bundle = SelfSigned::new().write_bundle(dir.path()).unwrap();

        assert_eq!(bundle.component(FULLCHAIN).unwrap().label(), FULLCHAIN);
        assert!(matches!(
            bundle.component("nonsense"),
            Err(DeployerError::UnknownLabel(label)) if label == "nonsense"
        ));
    }

    #[test]
    fn test_missing_component_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = CertificateComponent::new(dir.path().join(CERT_FILENAME), CERT_FILENAME, CERT)
            .unwrap_err();
        assert!(matches!(
            err,
            DeployerError::NotFound { path } if path == dir.path().join(CERT_FILENAME)
        ));
    }

    #[test]
    fn test_missing_file_fails_bundle_construction() {
        let dir = TempDir::new().unwrap();
        SelfSigned::new().write_bundle(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(KEY_FILENAME)).unwrap();

        assert!(matches!(
            CertificateBundle::new(dir.path()),
            Err(DeployerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_expires_and_common_name() {
        let dir = TempDir::new().unwrap();
        let bundle = SelfSigned::new().write_bundle(dir.path()).unwrap();

        assert_eq!(bundle.expires(), "2099-01-01T00:00:00");
        assert_eq!(bundle.common_name(), COMMON_NAME);
    }

    #[test]
    fn test_common_name_falls_back_to_first_dns_san() {
        let dir = TempDir::new().unwrap();
        let bundle = SelfSigned::new()
            .without_common_name()
            .san("somesite1.domain.tld")
            .san("site2.domain.tld")
            .write_bundle(dir.path())
            .unwrap();

        assert_eq!(bundle.common_name(), "somesite1.domain.tld");
    }

    #[test]
    fn test_no_common_name_and_no_san_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = SelfSigned::new()
            .without_common_name()
            .write_bundle(dir.path())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DeployerError>(),
            Some(DeployerError::Metadata { .. })
        ));
    }

    #[test]
    fn test_garbage_certificate_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        SelfSigned::new().write_bundle(dir.path()).unwrap();
        std::fs::write(dir.path().join(CERT_FILENAME), "not a certificate").unwrap();

        assert!(matches!(
            CertificateBundle::new(dir.path()),
            Err(DeployerError::Parse { .. })
        ));
    }

    #[test]
    fn test_components_compare_by_identity_not_contents() {
        let dir = TempDir::new().unwrap();
        let first = SelfSigned::new().write_bundle(dir.path()).unwrap();
        // Rebuild the same directory with a different certificate: paths,
        // filenames and labels are unchanged, so components still compare
        // equal even though the bytes differ.
        let second = SelfSigned::new()
            .common_name("renewed.domain.tld")
            .write_bundle(dir.path())
            .unwrap();

        assert_ne!(first.cert().contents(), second.cert().contents());
        assert_eq!(first.cert(), second.cert());
        assert_eq!(first.key(), second.key());
        assert_eq!(first.fullchain(), second.fullchain());
        assert_eq!(first.intermediates(), second.intermediates());
    }
}
