//! ZIP container for directory trees.
//!
//! A directory is walked in file-name order and stored as an in-memory ZIP
//! archive with DEFLATE compression, or uncompressed at level 0. Entry names are relative to the walked
//! directory and always use `/` separators. Extraction refuses entries that
//! would land outside the output directory.

pub mod filter;

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use filter::ExcludeFilter;

/// Best DEFLATE compression level.
pub const BEST_COMPRESSION: u8 = 9;

/// Errors that can occur while building or extracting archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Archive entry escapes the output directory: {0}")]
    UnsafePath(String),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Options for building an archive.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Relative path prefixes to leave out.
    pub exclude: Vec<String>,
    /// DEFLATE level, 1 to 9. Level 0 stores entries uncompressed.
    pub compression_level: u8,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            compression_level: BEST_COMPRESSION,
        }
    }
}

/// An archive built in memory.
#[derive(Debug, Clone)]
pub struct Archive {
    /// ZIP bytes.
    pub bytes: Vec<u8>,
    /// Number of entries written (files and directories).
    pub entries: usize,
    /// Number of walk entries skipped by the exclude filter.
    pub excluded: usize,
}

/// Counts of restored entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
}

/// Archives the contents of `dir`.
///
/// `dir` itself is not an entry. Symbolic links are not followed, and
/// entries that are neither files nor directories are skipped. Entry
/// timestamps are pinned, so the same tree always yields the same bytes.
pub fn build_archive(dir: &Path, options: &ArchiveOptions) -> Result<Archive, ArchiveError> {
    if !dir.is_dir() {
        return Err(ArchiveError::NotADirectory(dir.to_path_buf()));
    }

    let filter = ExcludeFilter::new(&options.exclude);
    if filter.is_empty() {
        debug!("no exclude prefixes configured");
    }
    let base_options = compression_options(options.compression_level)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = 0;
    let mut excluded = 0;

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry_name(dir, entry.path());
            if filter.is_excluded(&name) {
                info!(" › excluded {}", name);
                excluded += 1;
                false
            } else {
                true
            }
        });

    for entry in walker {
        let entry = entry?;
        let name = entry_name(dir, entry.path());
        let file_options = with_permissions(base_options, &entry)?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            writer.add_directory(name.as_str(), file_options)?;
        } else if file_type.is_file() {
            writer.start_file(name.as_str(), file_options)?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut writer)?;
        } else {
            warn!("skipping {}: not a regular file or directory", name);
            continue;
        }

        info!(" › included {}", name);
        entries += 1;
    }

    let bytes = writer.finish()?.into_inner();
    debug!("archive holds {} entries in {} bytes", entries, bytes.len());

    Ok(Archive {
        bytes,
        entries,
        excluded,
    })
}

/// Extracts ZIP `bytes` under `out_dir`, creating it if needed.
pub fn extract_archive(bytes: &[u8], out_dir: &Path) -> Result<ExtractSummary, ArchiveError> {
    fs::create_dir_all(out_dir)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut summary = ExtractSummary::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafePath(entry.name().to_string()))?;
        let target = out_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            summary.directories += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(&target)?;
            io::copy(&mut entry, &mut file)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
            }

            summary.files += 1;
        }

        debug!("restored {}", target.display());
    }

    Ok(summary)
}

/// Entry options for a compression level. DEFLATE rejects level 0.
fn compression_options(level: u8) -> SimpleFileOptions {
    let options = SimpleFileOptions::default();
    if level == 0 {
        options.compression_method(CompressionMethod::Stored)
    } else {
        options
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }
}

/// Relative `/`-separated name of `path` under `root`.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn with_permissions(
    options: SimpleFileOptions,
    entry: &DirEntry,
) -> Result<SimpleFileOptions, ArchiveError> {
    use std::os::unix::fs::PermissionsExt;
    let mode = entry.metadata()?.permissions().mode();
    Ok(options.unix_permissions(mode))
}

#[cfg(not(unix))]
fn with_permissions(
    options: SimpleFileOptions,
    _entry: &DirEntry,
) -> Result<SimpleFileOptions, ArchiveError> {
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/notes")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("README.md"), "# vault\n").unwrap();
        fs::write(root.join("docs/guide.txt"), "step one\nstep two\n").unwrap();
        fs::write(root.join("docs/notes/empty.txt"), "").unwrap();
        fs::write(root.join("target/debug/app"), vec![0u8; 2048]).unwrap();
        dir
    }

    #[test]
    fn test_build_and_extract() {
        let src = sample_tree();
        let archive = build_archive(src.path(), &ArchiveOptions::default()).unwrap();
        // 4 directories + 4 files
        assert_eq!(archive.entries, 8);
        assert_eq!(archive.excluded, 0);

        let out = TempDir::new().unwrap();
        let summary = extract_archive(&archive.bytes, out.path()).unwrap();
        assert_eq!(summary.files, 4);
        assert_eq!(summary.directories, 4);

        assert_eq!(
            fs::read_to_string(out.path().join("docs/guide.txt")).unwrap(),
            "step one\nstep two\n"
        );
        assert_eq!(fs::read(out.path().join("target/debug/app")).unwrap().len(), 2048);
        assert!(out.path().join("docs/notes/empty.txt").is_file());
    }

    #[test]
    fn test_exclude_prunes_subtree() {
        let src = sample_tree();
        let options = ArchiveOptions {
            exclude: vec!["target".to_string()],
            ..Default::default()
        };
        let archive = build_archive(src.path(), &options).unwrap();
        assert_eq!(archive.excluded, 1);
        assert_eq!(archive.entries, 5);

        let out = TempDir::new().unwrap();
        extract_archive(&archive.bytes, out.path()).unwrap();
        assert!(!out.path().join("target").exists());
        assert!(out.path().join("README.md").is_file());
    }

    #[test]
    fn test_level_zero_stores_entries() {
        let src = sample_tree();
        let options = ArchiveOptions {
            compression_level: 0,
            ..Default::default()
        };
        let archive = build_archive(src.path(), &options).unwrap();
        assert_eq!(archive.entries, 8);

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
        let app = zip.by_name("target/debug/app").unwrap();
        assert_eq!(app.compression(), CompressionMethod::Stored);
        drop(app);

        let out = TempDir::new().unwrap();
        let summary = extract_archive(&archive.bytes, out.path()).unwrap();
        assert_eq!(summary.files, 4);
        assert_eq!(fs::read(out.path().join("target/debug/app")).unwrap(), vec![0u8; 2048]);
    }

    #[test]
    fn test_every_level_builds() {
        let src = sample_tree();
        for level in 0..=BEST_COMPRESSION {
            let options = ArchiveOptions {
                compression_level: level,
                ..Default::default()
            };
            let archive = build_archive(src.path(), &options).unwrap();
            let out = TempDir::new().unwrap();
            extract_archive(&archive.bytes, out.path()).unwrap();
            assert_eq!(
                fs::read_to_string(out.path().join("README.md")).unwrap(),
                "# vault\n",
                "level {}",
                level
            );
        }
    }

    #[test]
    fn test_archive_is_deterministic() {
        let src = sample_tree();
        let first = build_archive(src.path(), &ArchiveOptions::default()).unwrap();
        let second = build_archive(src.path(), &ArchiveOptions::default()).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_not_a_directory() {
        let src = sample_tree();
        let result = build_archive(&src.path().join("README.md"), &ArchiveOptions::default());
        assert!(matches!(result, Err(ArchiveError::NotADirectory(_))));
    }

    #[test]
    fn test_garbage_is_not_an_archive() {
        let out = TempDir::new().unwrap();
        let result = extract_archive(b"not a zip file", out.path());
        assert!(matches!(result, Err(ArchiveError::Zip(_))));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let root = Path::new("/data/project");
        let path = root.join("a").join("b.txt");
        assert_eq!(entry_name(root, &path), "a/b.txt");
    }

    #[test]
    fn test_rejects_escaping_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("../evil.txt", SimpleFileOptions::default())
            .unwrap();
        io::Write::write_all(&mut writer, b"nope").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let out = TempDir::new().unwrap();
        let result = extract_archive(&bytes, out.path());
        assert!(matches!(result, Err(ArchiveError::UnsafePath(_))));
    }
}
