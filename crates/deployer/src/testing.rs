//! Test fixtures for the framework and for deployer plugin test suites
//!
//! Deployer plugins need realistic certificate bundles in their tests, so
//! the generator here ships as part of the library rather than hiding
//! behind `#[cfg(test)]`. [`SelfSigned`] builds a throwaway certificate and
//! [`SelfSigned::write_bundle`] lays out the full four-file live directory.

use crate::bundle::{
    CertificateBundle, CERT_FILENAME, FULLCHAIN_FILENAME, INTERMEDIATES_FILENAME, KEY_FILENAME,
};
use anyhow::Context;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use std::path::Path;
use time::macros::datetime;
use time::OffsetDateTime;

/// Common name used by [`SelfSigned`] unless overridden.
pub const COMMON_NAME: &str = "test_common_name";
/// Validity start used by [`SelfSigned`] unless overridden.
pub const NOT_VALID_BEFORE: OffsetDateTime = datetime!(2020-01-01 0:00 UTC);
/// Validity end used by [`SelfSigned`] unless overridden.
pub const NOT_VALID_AFTER: OffsetDateTime = datetime!(2099-01-01 0:00 UTC);

/// A generated certificate and its private key, both PEM-encoded.
pub struct GeneratedCert {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Builder for self-signed test certificates.
#[derive(Debug, Clone)]
pub struct SelfSigned {
    common_name: Option<String>,
    subject_alt_names: Vec<String>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl Default for SelfSigned {
    fn default() -> Self {
        Self {
            common_name: Some(COMMON_NAME.to_string()),
            subject_alt_names: Vec::new(),
            not_before: NOT_VALID_BEFORE,
            not_after: NOT_VALID_AFTER,
        }
    }
}

impl SelfSigned {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `common_name` instead of [`COMMON_NAME`].
    pub fn common_name(mut self, common_name: impl Into<String>) -> Self {
        self.common_name = Some(common_name.into());
        self
    }

    /// Issue the certificate with an empty subject.
    pub fn without_common_name(mut self) -> Self {
        self.common_name = None;
        self
    }

    /// Add a DNS Subject Alternative Name. SAN order is preserved.
    pub fn san(mut self, name: impl Into<String>) -> Self {
        self.subject_alt_names.push(name.into());
        self
    }

    pub fn not_before(mut self, not_before: OffsetDateTime) -> Self {
        self.not_before = not_before;
        self
    }

    pub fn not_after(mut self, not_after: OffsetDateTime) -> Self {
        self.not_after = not_after;
        self
    }

    /// Generate the certificate and key pair.
    pub fn generate(&self) -> anyhow::Result<GeneratedCert> {
        let mut params = CertificateParams::new(self.subject_alt_names.clone())
            .context("failed to build certificate params")?;

        let mut dn = DistinguishedName::new();
        if let Some(common_name) = &self.common_name {
            dn.push(DnType::CommonName, common_name.as_str());
        }
        params.distinguished_name = dn;
        params.not_before = self.not_before;
        params.not_after = self.not_after;

        let key_pair = KeyPair::generate().context("failed to generate key pair")?;
        let cert = params
            .self_signed(&key_pair)
            .context("failed to self-sign certificate")?;

        Ok(GeneratedCert {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
        })
    }

    /// Write a complete live directory under `dir` and construct the bundle.
    ///
    /// The intermediates file reuses the leaf certificate and the fullchain
    /// file holds it twice; deployers only care that all four files exist
    /// and parse.
    pub fn write_bundle(&self, dir: &Path) -> anyhow::Result<CertificateBundle> {
        let generated = self.generate()?;

        std::fs::write(dir.join(CERT_FILENAME), &generated.cert_pem)?;
        std::fs::write(dir.join(INTERMEDIATES_FILENAME), &generated.cert_pem)?;
        std::fs::write(
            dir.join(FULLCHAIN_FILENAME),
            format!("{}\n{}", generated.cert_pem, generated.cert_pem),
        )?;
        std::fs::write(dir.join(KEY_FILENAME), &generated.key_pem)?;

        Ok(CertificateBundle::new(dir)?)
    }
}
