use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::github::{EntryKind, RemoteEntry, RemoteSource};
use crate::hash::BlobHash;
use crate::report::{FileOutcome, SyncReport, SyncStatus};

/// Drives one sync run: list the upstream directory, reconcile each file
/// into the target directory, then fetch the auxiliary files.
///
/// Files are processed strictly one at a time. A file only ever reaches the
/// target directory after the downloaded bytes re-hash to the digest the
/// listing declared for it.
pub struct SyncDriver<'a, S> {
    config: &'a SyncConfig,
    source: &'a S,
    scratch_root: PathBuf,
    backup_dir: PathBuf,
    backed_up: bool,
}

pub struct RunResult {
    pub report: SyncReport,
    /// Set when at least one pre-overwrite copy was made.
    pub backup_dir: Option<PathBuf>,
}

impl<'a, S: RemoteSource> SyncDriver<'a, S> {
    /// `scratch_root` holds downloaded files before promotion and the run's
    /// backup directory. Callers pass `std::env::temp_dir()` outside of
    /// tests.
    pub fn new(config: &'a SyncConfig, source: &'a S, scratch_root: PathBuf) -> Self {
        let backup_dir = scratch_root.join(format!(
            "ggml_sycl_backup_{}",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        Self {
            config,
            source,
            scratch_root,
            backup_dir,
            backed_up: false,
        }
    }

    /// Returns `Err` only when the listing itself cannot be fetched or
    /// decoded; per-file errors end up in the report instead.
    pub fn run(&mut self) -> Result<RunResult, SyncError> {
        println!("Fetching file list from {}...", self.config.full_repo_name());
        let entries = self.source.list()?;

        fs::create_dir_all(&self.config.target_dir)
            .map_err(|err| fs_error(&self.config.target_dir, err))?;

        let mut outcomes = Vec::new();
        for entry in entries {
            if entry.kind != EntryKind::File {
                continue;
            }
            let status = self.sync_file(&entry);
            print_status(&entry.name, &status);
            outcomes.push(FileOutcome {
                name: entry.name,
                status,
            });
        }

        self.fetch_aux_files();

        // A failed backup copy can leave the directory created but empty;
        // it must not be left behind.
        if !self.backed_up {
            let _ = fs::remove_dir(&self.backup_dir);
        }

        let report = SyncReport::from_outcomes(&outcomes);
        Ok(RunResult {
            report,
            backup_dir: self.backed_up.then(|| self.backup_dir.clone()),
        })
    }

    fn sync_file(&mut self, entry: &RemoteEntry) -> SyncStatus {
        match self.try_sync_file(entry) {
            Ok(status) => status,
            Err(err) => SyncStatus::Failed(err),
        }
    }

    /// Compare → [backup] → download → verify → promote, for one file.
    fn try_sync_file(&mut self, entry: &RemoteEntry) -> Result<SyncStatus, SyncError> {
        let local_path = self.config.target_dir.join(&entry.name);
        let local_hash =
            BlobHash::from_file(&local_path).map_err(|err| fs_error(&local_path, err))?;

        if local_hash.is_some_and(|hash| hash.matches(&entry.sha)) {
            return Ok(SyncStatus::Unchanged);
        }

        // Back up the existing file before any mutation.
        let had_local = local_hash.is_some();
        if had_local {
            self.backup(&local_path, &entry.name)?;
        }

        let url = entry.download_url.as_deref().ok_or_else(|| {
            SyncError::Decode(format!("listing has no download URL for {}", entry.name))
        })?;
        let data = self.source.fetch(url)?;

        let scratch_path = self.scratch_root.join(&entry.name);
        fs::write(&scratch_path, &data).map_err(|err| fs_error(&scratch_path, err))?;

        // Re-hash what actually landed on disk before touching the target.
        let actual = BlobHash::from_file(&scratch_path)
            .map_err(|err| fs_error(&scratch_path, err))?
            .ok_or_else(|| fs_error(&scratch_path, io::ErrorKind::NotFound.into()))?;
        if !actual.matches(&entry.sha) {
            let _ = fs::remove_file(&scratch_path);
            return Err(SyncError::HashMismatch {
                expected: entry.sha.clone(),
                actual: actual.to_hex(),
            });
        }

        promote(&scratch_path, &local_path)?;
        Ok(if had_local {
            SyncStatus::Updated
        } else {
            SyncStatus::New
        })
    }

    /// The backup directory is created on first use, so an all-unchanged
    /// run never leaves an empty directory behind.
    fn backup(&mut self, local_path: &Path, name: &str) -> Result<(), SyncError> {
        if !self.backed_up {
            fs::create_dir_all(&self.backup_dir).map_err(|err| fs_error(&self.backup_dir, err))?;
        }
        copy_preserving_mtime(local_path, &self.backup_dir.join(name))?;
        self.backed_up = true;
        Ok(())
    }

    /// Auxiliary files are fetched unconditionally, without hash
    /// verification or backup, and a failed download is tolerated. Failures
    /// here never count toward the run's exit code.
    fn fetch_aux_files(&self) {
        if self.config.aux_paths.is_empty() {
            return;
        }
        println!();
        println!("=== Processing auxiliary files ===");
        for relpath in &self.config.aux_paths {
            let dest = self.config.target_dir.join(relpath);
            match self.fetch_aux_file(relpath, &dest) {
                Ok(()) => println!("✓ {relpath} download completed"),
                Err(err) => {
                    println!("  {relpath} download failed: {err} (may not exist upstream)")
                }
            }
        }
    }

    fn fetch_aux_file(&self, relpath: &str, dest: &Path) -> Result<(), SyncError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|err| fs_error(parent, err))?;
        }
        let data = self.source.fetch(&self.config.raw_url(relpath))?;
        fs::write(dest, &data).map_err(|err| fs_error(dest, err))?;
        Ok(())
    }
}

fn print_status(name: &str, status: &SyncStatus) {
    match status {
        SyncStatus::Unchanged => println!("  Unchanged: {name}"),
        SyncStatus::New => println!("✓ New file: {name}"),
        SyncStatus::Updated => println!("✓ Updated: {name}"),
        SyncStatus::Failed(err) => println!("  ⚠ Failed: {name} ({err})"),
    }
}

/// Copy `src` to `dest` and carry the source modification time over.
fn copy_preserving_mtime(src: &Path, dest: &Path) -> Result<(), SyncError> {
    fs::copy(src, dest).map_err(|err| fs_error(dest, err))?;
    let metadata = fs::metadata(src).map_err(|err| fs_error(src, err))?;
    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dest, mtime).map_err(|err| fs_error(dest, err))?;
    Ok(())
}

/// Move a verified scratch file into place. `rename` cannot cross
/// filesystems, and the scratch area usually lives on a different mount
/// than the target tree, so fall back to copy+remove.
fn promote(scratch: &Path, dest: &Path) -> Result<(), SyncError> {
    match fs::rename(scratch, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(scratch, dest).map_err(|err| fs_error(dest, err))?;
            fs::remove_file(scratch).map_err(|err| fs_error(scratch, err))?;
            Ok(())
        }
    }
}

fn fs_error(path: &Path, err: io::Error) -> SyncError {
    SyncError::Filesystem {
        path: path.to_path_buf(),
        source: err,
    }
}
