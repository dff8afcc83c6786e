//! Family Store
//!
//! Loads and saves key families as flat JSON objects.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{JsonKvError, Result};
use crate::table::{Family, Table};

/// Extension of family files
pub const FAMILY_EXTENSION: &str = "json";

/// Persistent store rooted at one directory
///
/// Holds no open handles: every save is a fresh temp file plus rename, and
/// accesses are serialized by the single serving worker.
#[derive(Debug, Clone)]
pub struct FamilyStore {
    /// Directory where family files live
    dir: PathBuf,
}

impl FamilyStore {
    /// Open a store, creating its directory if it doesn't exist
    pub fn open(path: &Path) -> Result<Self> {
        ensure_directory(path)?;
        Ok(Self {
            dir: path.to_path_buf(),
        })
    }

    /// Load every family file in the directory
    ///
    /// Each regular file is one family named after its file stem.
    /// Subdirectories and hidden files are skipped. Any file that is not a
    /// flat string-to-string JSON object fails the whole load.
    ///
    /// When several files share a stem (`users`, `users.txt`, `users.json`),
    /// `<family>.json` wins, since it is the file `save` rewrites. Among the
    /// others the last path in sorted order wins.
    pub fn load(&self) -> Result<Table> {
        let mut table = Table::new();

        // Step 1: Discover candidate files
        let mut files: Vec<(bool, PathBuf, String)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if !file_path.is_file() {
                continue;
            }
            let Some(name) = Self::family_name(&file_path) else {
                continue;
            };
            files.push((Self::is_family_file(&file_path), file_path, name));
        }

        // Step 2: Order so canonical files are applied last
        files.sort();

        // Step 3: Decode
        for (canonical, file_path, name) in files {
            let bytes = fs::read(&file_path)?;
            let entries: Family =
                serde_json::from_slice(&bytes).map_err(|source| JsonKvError::Decode {
                    path: file_path.clone(),
                    source,
                })?;

            if table.family(&name).is_some() {
                tracing::warn!(
                    "Family {} defined by several files, using {}",
                    name,
                    file_path.display()
                );
            }
            tracing::debug!(
                "Loaded family {} ({} keys, canonical={})",
                name,
                entries.len(),
                canonical
            );
            table.insert_family(name, entries);
        }

        Ok(table)
    }

    /// Rewrite the whole file of one family
    ///
    /// The contents go to a temp file in the same directory which is then
    /// renamed over `<family>.json`, so readers see either the old or the
    /// new family, never a mix.
    pub fn save(&self, family: &str, entries: &Family) -> Result<()> {
        validate_family_name(family)?;

        let bytes = serde_json::to_vec(entries).map_err(JsonKvError::Encode)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.family_path(family))
            .map_err(|e| JsonKvError::Io(e.error))?;

        Ok(())
    }

    /// Path of the file backing `family`
    pub fn family_path(&self, family: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", family, FAMILY_EXTENSION))
    }

    /// Get the storage directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Whether `path` has the extension `save` writes
    fn is_family_file(path: &Path) -> bool {
        path.extension().map_or(false, |ext| ext == FAMILY_EXTENSION)
    }

    /// "users.json" → Some("users"), ".tmpab12" → None
    fn family_name(path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_string_lossy();
        if file_name.starts_with('.') {
            return None;
        }
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        Some(stem)
    }
}

/// Create `path` as a directory if it is absent
///
/// Idempotent. Fails when `path` exists but is not a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(JsonKvError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder.create(path)?;
            tracing::info!("Created storage directory {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Reject names that cannot round-trip as `<name>.json` inside the directory
pub fn validate_family_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(JsonKvError::InvalidFamily(name.to_string()));
    }
    Ok(())
}
