//! Sets up an OS trust bundle for outbound HTTPS, for local testing
//! only. The deployed Functions host ships its own trust store, so
//! the triggered path never runs this.

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// The variable OpenSSL-based TLS stacks read for a certificate
/// bundle override.
pub const CA_BUNDLE_VAR: &str = "SSL_CERT_FILE";

/// Keychains exported on macOS, in concatenation order.
const MAC_SYSTEM_KEYCHAINS: [&str; 2] = [
    "/System/Library/Keychains/SystemRootCertificates.keychain",
    "/Library/Keychains/System.keychain",
];

/// Well-known bundle locations probed on Linux, in order.
static LINUX_CA_BUNDLES: [&str; 4] = [
    "/etc/ssl/certs/ca-certificates.crt",
    "/etc/pki/tls/certs/ca-bundle.crt",
    "/etc/ssl/ca-bundle.pem",
    "/etc/pki/tls/cacert.pem",
];

/// Set up certificates for the host operating system. On unsupported
/// systems this logs a warning and does nothing.
pub fn setup() -> Result<()> {
    match env::consts::OS {
        "macos" => setup_macos(),
        "linux" => setup_linux(),
        other => {
            warn!("Certificate setup not implemented for {}", other);
            Ok(())
        }
    }
}

/// Export the system keychains to a bundle file in the home directory,
/// point `SSL_CERT_FILE` at it, and persist the export in `.bashrc`.
fn setup_macos() -> Result<()> {
    info!("Setting up certificates for macOS");
    let home = home_dir()?;
    let bundle = home.join(".mac-ca-roots");

    let mut combined = String::new();
    for keychain in MAC_SYSTEM_KEYCHAINS {
        combined.push_str(&export_keychain(keychain)?);
    }
    fs::write(&bundle, combined)
        .with_context(|| format!("Failed to write certificate bundle {:?}", bundle))?;

    let profile = home.join(".bashrc");
    append_export_line(&profile, &bundle)?;
    env::set_var(CA_BUNDLE_VAR, &bundle);

    info!("Successfully set up certificates at {:?}", bundle);
    info!("Updated {:?} with {}", profile, CA_BUNDLE_VAR);
    Ok(())
}

/// Point `SSL_CERT_FILE` at the first well-known bundle that exists.
fn setup_linux() -> Result<()> {
    info!("Setting up certificates for Linux");
    match first_existing(LINUX_CA_BUNDLES.iter().map(Path::new)) {
        Some(bundle) => {
            env::set_var(CA_BUNDLE_VAR, bundle);
            info!("Using certificate bundle at {:?}", bundle);
        }
        None => warn!("No system CA certificate bundle found"),
    }
    Ok(())
}

/// Dump a keychain's certificates in PEM form.
fn export_keychain(keychain: &str) -> Result<String> {
    let output = Command::new("security")
        .args(["find-certificate", "-a", "-p", keychain])
        .output()
        .with_context(|| format!("Failed to run security find-certificate against {}", keychain))?;
    if !output.status.success() {
        bail!(
            "security find-certificate against {} exited with {}",
            keychain,
            output.status
        );
    }
    String::from_utf8(output.stdout).context("security find-certificate produced non-UTF-8 output")
}

/// Append an `export SSL_CERT_FILE=...` line to the shell profile,
/// creating the file if needed and never duplicating the line.
fn append_export_line(profile: &Path, bundle: &Path) -> Result<()> {
    let marker = format!("{}=\"{}\"", CA_BUNDLE_VAR, bundle.display());
    let line = format!("\nexport {}", marker);
    if !profile.exists() {
        fs::write(profile, line)
            .with_context(|| format!("Failed to create shell profile {:?}", profile))?;
        return Ok(());
    }
    let content = fs::read_to_string(profile)
        .with_context(|| format!("Failed to read shell profile {:?}", profile))?;
    if !content.contains(&marker) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(profile)
            .with_context(|| format!("Failed to open shell profile {:?}", profile))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to shell profile {:?}", profile))?;
    }
    Ok(())
}

/// The first path in `paths` that exists on disk.
fn first_existing<'a, I>(paths: I) -> Option<&'a Path>
where
    I: IntoIterator<Item = &'a Path>,
{
    paths.into_iter().find(|path| path.exists())
}

fn home_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_line_is_created_and_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join(".bashrc");
        let bundle = dir.path().join(".mac-ca-roots");

        append_export_line(&profile, &bundle).unwrap();
        append_export_line(&profile, &bundle).unwrap();

        let content = fs::read_to_string(&profile).unwrap();
        let occurrences = content.matches(CA_BUNDLE_VAR).count();
        assert_eq!(occurrences, 1);
        assert!(content.contains(&format!("export {}=\"{}\"", CA_BUNDLE_VAR, bundle.display())));
    }

    #[test]
    fn export_line_is_appended_to_an_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join(".bashrc");
        let bundle = dir.path().join(".mac-ca-roots");
        fs::write(&profile, "alias ll='ls -l'\n").unwrap();

        append_export_line(&profile, &bundle).unwrap();

        let content = fs::read_to_string(&profile).unwrap();
        assert!(content.starts_with("alias ll='ls -l'"));
        assert!(content.contains(CA_BUNDLE_VAR));
    }

    #[test]
    fn first_existing_respects_probe_order() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.crt");
        let present = dir.path().join("present.crt");
        let also_present = dir.path().join("also-present.crt");
        fs::write(&present, "").unwrap();
        fs::write(&also_present, "").unwrap();

        let paths = [missing.as_path(), present.as_path(), also_present.as_path()];
        assert_eq!(first_existing(paths), Some(present.as_path()));

        let none: [&Path; 1] = [missing.as_path()];
        assert_eq!(first_existing(none), None);
    }
}
