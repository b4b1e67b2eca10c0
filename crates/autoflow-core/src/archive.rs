//! # Project Export
//!
//! Packs a workspace into a gzip-compressed tarball with a single top-level
//! directory named after the project. The output is deterministic: entries
//! keep workspace order, and every header uses a fixed mode and mtime, so
//! the same files always produce the same bytes.

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ArchiveError;
use crate::project::project_slug;
use crate::workspace::FileSet;

/// Permission bits recorded for every entry.
const ENTRY_MODE: u32 = 0o644;

/// Modification time recorded for every entry (2024-01-01T00:00:00Z).
const ENTRY_MTIME: u64 = 1_704_067_200;

/// Content type of [`export_archive`] output.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/gzip";

/// File name offered to the user for a project export.
pub fn archive_file_name(project_name: &str) -> String {
    format!("{}.tar.gz", project_slug(project_name))
}

/// Build a `.tar.gz` of `files` under a directory named after the project.
pub fn export_archive(project_name: &str, files: &FileSet) -> Result<Vec<u8>, ArchiveError> {
    files.validate()?;
    let root = project_slug(project_name);

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for file in files {
        let data = file.content.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(ENTRY_MTIME);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, format!("{root}/{}", file.name), data)?;
    }

    let encoder = builder.into_inner()?;
    let bytes = encoder.finish()?;
    tracing::debug!(
        project = %root,
        files = files.len(),
        bytes = bytes.len(),
        "exported project archive"
    );
    Ok(bytes)
}
