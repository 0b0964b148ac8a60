//! Packaged archive format
//!
//! An archive is an uncompressed tar holding three members:
//! - `metadata.gz`: gzip of the TOML spec description
//! - `data.tar.gz`: gzip tar of every file listed in the spec
//! - `checksums.json`: sha256 of the two members above

use crate::spec::PackageSpec;
use crate::{PackageError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

pub const METADATA_MEMBER: &str = "metadata.gz";
pub const DATA_MEMBER: &str = "data.tar.gz";
pub const CHECKSUMS_MEMBER: &str = "checksums.json";

/// Contents of `checksums.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checksums {
    pub sha256: BTreeMap<String, String>,
}

/// Write the archive for `spec` to `output`, reading its files from
/// `source_dir`
pub fn write_archive(spec: &PackageSpec, source_dir: &Path, output: &Path) -> Result<()> {
    let metadata = gzip(spec.to_metadata()?.as_bytes())?;
    let data = gzip(&data_tar(spec, source_dir)?)?;

    let mut sha256 = BTreeMap::new();
    sha256.insert(METADATA_MEMBER.to_string(), hex_digest(&metadata));
    sha256.insert(DATA_MEMBER.to_string(), hex_digest(&data));
    let checksums = serde_json::to_vec_pretty(&Checksums { sha256 })?;

    let mut builder = tar::Builder::new(File::create(output)?);
    append_member(&mut builder, METADATA_MEMBER, &metadata, 0o444)?;
    append_member(&mut builder, DATA_MEMBER, &data, 0o444)?;
    append_member(&mut builder, CHECKSUMS_MEMBER, &checksums, 0o444)?;
    builder.into_inner()?.flush()?;

    tracing::debug!(archive = %output.display(), files = spec.files.len(), "wrote archive");
    Ok(())
}

/// Recover the spec stored in an archive
pub fn read_archive_metadata(path: &Path) -> Result<PackageSpec> {
    let compressed = read_member(path, METADATA_MEMBER)?;
    let mut content = String::new();
    GzDecoder::new(compressed.as_slice()).read_to_string(&mut content)?;
    PackageSpec::from_metadata(&content)
}

/// Check both members against `checksums.json`
pub fn verify_archive(path: &Path) -> Result<bool> {
    let checksums: Checksums = serde_json::from_slice(&read_member(path, CHECKSUMS_MEMBER)?)?;

    for member in [METADATA_MEMBER, DATA_MEMBER] {
        let expected = checksums.sha256.get(member);
        let actual = hex_digest(&read_member(path, member)?);
        if expected != Some(&actual) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Unpack the packaged files into `dest`
pub fn unpack_data(path: &Path, dest: &Path) -> Result<()> {
    let compressed = read_member(path, DATA_MEMBER)?;
    fs::create_dir_all(dest)?;
    let mut data = tar::Archive::new(GzDecoder::new(compressed.as_slice()));
    data.unpack(dest)?;
    Ok(())
}

/// Raw bytes of one member of the outer tar
fn read_member(path: &Path, member: &str) -> Result<Vec<u8>> {
    let mut archive = tar::Archive::new(File::open(path)?);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.into_owned();
        if name == Path::new(member) {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            return Ok(bytes);
        }
    }

    Err(PackageError::MalformedArchive {
        path: path.to_path_buf(),
        reason: format!("missing member {}", member),
    })
}

/// Tar of the spec's files; launchers of declared executables get the exec bit
fn data_tar(spec: &PackageSpec, source_dir: &Path) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());

    for file in &spec.files {
        let content = fs::read(source_dir.join(file))?;
        let launcher = spec
            .executables
            .iter()
            .any(|exe| file.ends_with(&format!("/{}", exe)));
        let mode = if launcher { 0o755 } else { 0o644 };
        append_member(&mut builder, file, &content, mode)?;
    }

    Ok(builder.into_inner()?)
}

fn append_member<W: Write>(
    builder: &mut tar::Builder<W>,
    name: &str,
    content: &[u8],
    mode: u32,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(mode);
    header.set_mtime(0);
    header.set_cksum();
    builder.append_data(&mut header, name, content)?;
    Ok(())
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
