//! Cluster certificate checks
//!
//! The installer can either generate the cluster PKI or reuse certificates a
//! user placed in a directory ahead of time. [`LocalPki`] inspects such a
//! directory: `ca.pem` plus one `{name}.pem` per principal and per node host.
//!
//! # Rules
//!
//! - A missing certificate is a warning: it will be generated during install
//! - A present certificate must parse, be within its validity period, and be
//!   signed by the cluster CA
//! - Node certificates must name the node's host, IP and internal IP

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;

use crate::error::{Error, ValidationError};
use crate::plan::{Node, Plan};
use crate::validate::parse_ip;

/// File name of the cluster CA certificate
pub const CA_CERT_FILE: &str = "ca.pem";

/// Outcome of a certificate check
///
/// Warnings describe certificates that will be generated; errors describe
/// certificates that exist but cannot be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateReport {
    /// Non-fatal findings
    pub warnings: Vec<ValidationError>,
    /// Unusable certificates
    pub errors: Vec<ValidationError>,
}

impl CertificateReport {
    fn warn(&mut self, msg: String) {
        self.warnings.push(ValidationError::certificate(msg));
    }

    fn error(&mut self, msg: String) {
        self.errors.push(ValidationError::certificate(msg));
    }
}

/// Something that can check the certificates a plan will use
#[cfg_attr(test, automock)]
pub trait CertificateValidator {
    /// Check the CA, the certificate of every principal, and every node certificate
    fn validate_cluster_certificates(
        &self,
        plan: &Plan,
        principals: &[&'static str],
    ) -> CertificateReport;
}

/// Certificates stored as PEM files in a single directory
#[derive(Debug, Clone)]
pub struct LocalPki {
    dir: PathBuf,
}

impl LocalPki {
    /// Inspect certificates under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn cert_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.pem", name))
    }

    /// Load the CA, returning its DER encoding when it is usable
    fn check_ca(&self, report: &mut CertificateReport) -> Option<Vec<u8>> {
        let path = self.dir.join(CA_CERT_FILE);
        let der = match read_cert(&path) {
            Ok(Some(der)) => der,
            Ok(None) => {
                report.warn(format!(
                    "CA certificate {} was not found and will be generated",
                    path.display()
                ));
                return None;
            }
            Err(e) => {
                report.error(format!("CA certificate {}: {}", path.display(), e));
                return None;
            }
        };

        let problem = match X509Certificate::from_der(&der) {
            Ok((_, ca)) => validity_problem(&ca),
            Err(e) => Some(format!("could not be parsed: {}", e)),
        };
        match problem {
            Some(p) => {
                report.error(format!("CA certificate {} {}", path.display(), p));
                None
            }
            None => Some(der),
        }
    }

    /// Check the certificate `{name}.pem`, requiring `sans` when the list is non-empty
    fn check_cert(
        &self,
        report: &mut CertificateReport,
        name: &str,
        ca_der: Option<&[u8]>,
        sans: &[&str],
    ) {
        let path = self.cert_path(name);
        let der = match read_cert(&path) {
            Ok(Some(der)) => der,
            Ok(None) => {
                report.warn(format!(
                    "Certificate {} for {:?} was not found and will be generated",
                    path.display(),
                    name
                ));
                return;
            }
            Err(e) => {
                report.error(format!("Certificate {} for {:?}: {}", path.display(), name, e));
                return;
            }
        };

        // Without a usable CA only presence is checked
        let Some(ca_der) = ca_der else {
            debug!(cert = %path.display(), "No usable CA, skipping certificate contents");
            return;
        };

        for problem in cert_problems(&der, ca_der, sans) {
            report.error(format!(
                "Certificate {} for {:?} {}",
                path.display(),
                name,
                problem
            ));
        }
    }
}

impl CertificateValidator for LocalPki {
    fn validate_cluster_certificates(
        &self,
        plan: &Plan,
        principals: &[&'static str],
    ) -> CertificateReport {
        let mut report = CertificateReport::default();
        let ca = self.check_ca(&mut report);

        for principal in principals {
            self.check_cert(&mut report, principal, ca.as_deref(), &[]);
        }

        let mut seen = HashSet::new();
        for node in plan.all_nodes() {
            if node.host.is_empty() || !seen.insert(node.host.as_str()) {
                continue;
            }
            self.check_cert(&mut report, &node.host, ca.as_deref(), &node_sans(node));
        }

        info!(
            dir = %self.dir.display(),
            warnings = report.warnings.len(),
            errors = report.errors.len(),
            "Cluster certificates checked"
        );
        report
    }
}

fn node_sans(node: &Node) -> Vec<&str> {
    [&node.host, &node.ip, &node.internal_ip]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect()
}

/// Read a PEM certificate, returning `None` if the file does not exist
fn read_cert(path: &Path) -> Result<Option<Vec<u8>>, Error> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let block =
        ::pem::parse(&data).map_err(|e| Error::pki(format!("failed to parse PEM: {}", e)))?;
    if block.tag() != "CERTIFICATE" {
        return Err(Error::pki(format!(
            "expected a CERTIFICATE PEM block, found {:?}",
            block.tag()
        )));
    }
    Ok(Some(block.into_contents()))
}

/// Every reason the certificate `der` is unusable
fn cert_problems(der: &[u8], ca_der: &[u8], sans: &[&str]) -> Vec<String> {
    let cert = match X509Certificate::from_der(der) {
        Ok((_, cert)) => cert,
        Err(e) => return vec![format!("could not be parsed: {}", e)],
    };
    let ca = match X509Certificate::from_der(ca_der) {
        Ok((_, ca)) => ca,
        Err(e) => return vec![format!("could not be checked: {}", e)],
    };

    let mut problems = Vec::new();
    if cert.verify_signature(Some(ca.public_key())).is_err() {
        problems.push("was not signed by the cluster CA".to_string());
    }
    problems.extend(validity_problem(&cert));

    if !sans.is_empty() {
        let present = subject_alt_names(&cert);
        for san in sans {
            if !present.iter().any(|p| p.matches(san)) {
                problems.push(format!(
                    "does not include {:?} in its subject alternative names",
                    san
                ));
            }
        }
    }
    problems
}

fn validity_problem(cert: &X509Certificate<'_>) -> Option<String> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let not_before = cert.validity().not_before.timestamp();
    let not_after = cert.validity().not_after.timestamp();

    if now < not_before {
        return Some("is not valid yet".to_string());
    }
    if now > not_after {
        return Some("has expired".to_string());
    }
    None
}

/// A DNS or IP subject alternative name
#[derive(Debug, PartialEq, Eq)]
enum San {
    Dns(String),
    Ip(IpAddr),
}

impl San {
    fn matches(&self, wanted: &str) -> bool {
        match (self, parse_ip(wanted)) {
            (San::Ip(ip), Some(wanted)) => *ip == wanted,
            (San::Dns(name), None) => name.eq_ignore_ascii_case(wanted),
            _ => false,
        }
    }
}

fn subject_alt_names(cert: &X509Certificate<'_>) -> Vec<San> {
    let Ok(Some(ext)) = cert.subject_alternative_name() else {
        return Vec::new();
    };
    ext.value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(San::Dns(dns.to_string())),
            GeneralName::IPAddress(bytes) => match bytes.len() {
                4 => <[u8; 4]>::try_from(*bytes)
                    .ok()
                    .map(|b| San::Ip(Ipv4Addr::from(b).into())),
                16 => <[u8; 16]>::try_from(*bytes)
                    .ok()
                    .map(|b| San::Ip(Ipv6Addr::from(b).into())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
