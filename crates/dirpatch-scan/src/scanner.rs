//! JWalk-based directory scanner with parallel fingerprinting.

use std::collections::HashMap;
use std::fs::{self, File};
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use compact_str::CompactString;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tracing::{debug, info, trace};

use dirpatch_core::{FileRecord, ScanConfig, ScanError, ScanResult};

use crate::fingerprint::fingerprint_reader;

/// Scanner that walks a tree with jwalk and fingerprints files on a
/// bounded rayon pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeScanner;

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Scan one tree. Fails on the first unreadable entry.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let root_path = resolve_root(&config.root)?;
        let cancel = AtomicBool::new(false);
        self.scan_resolved(config, root_path, &cancel)
    }

    /// Scan two trees concurrently.
    ///
    /// Both roots are validated before either walk starts. When one scan
    /// fails the other is cancelled, and the first real failure is returned.
    pub fn scan_pair(
        &self,
        config_a: &ScanConfig,
        config_b: &ScanConfig,
    ) -> Result<(ScanResult, ScanResult), ScanError> {
        let root_a = resolve_root(&config_a.root)?;
        let root_b = resolve_root(&config_b.root)?;
        let cancel = AtomicBool::new(false);

        let (result_a, result_b) = thread::scope(|s| {
            let handle_b = s.spawn(|| self.scan_resolved(config_b, root_b, &cancel));
            let result_a = self.scan_resolved(config_a, root_a, &cancel);
            let result_b = handle_b.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (result_a, result_b)
        });

        join_results(result_a, result_b)
    }

    fn scan_resolved(
        &self,
        config: &ScanConfig,
        root_path: PathBuf,
        cancel: &AtomicBool,
    ) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        debug!(
            root = %root_path.display(),
            fingerprint = %config.fingerprint,
            "Scanning directory"
        );

        let outcome = self
            .collect_files(config, &root_path, cancel)
            .and_then(|files| self.fingerprint_files(config, files, cancel));

        let records = match outcome {
            Ok(records) => records,
            Err(err) => {
                // Stop the sibling scan as well.
                cancel.store(true, Ordering::Relaxed);
                return Err(err);
            }
        };

        let scan_duration = start.elapsed();
        info!(
            root = %root_path.display(),
            files = records.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "Scan complete"
        );

        Ok(ScanResult::new(
            root_path,
            config.fingerprint,
            records,
            scan_duration,
        ))
    }

    /// Walk the tree and collect every regular file with its relative path.
    fn collect_files(
        &self,
        config: &ScanConfig,
        root_path: &Path,
        cancel: &AtomicBool,
    ) -> Result<Vec<(PathBuf, CompactString)>, ScanError> {
        let walker = WalkDir::new(root_path)
            .parallelism(Parallelism::RayonNewPool(worker_count(config.threads)))
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .min_depth(1);

        let mut files = Vec::new();

        for entry_result in walker {
            if cancel.load(Ordering::Relaxed) {
                return Err(ScanError::Interrupted);
            }

            let entry = entry_result.map_err(|err| ScanError::Walk {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_path.to_path_buf()),
                message: err.to_string(),
            })?;

            let file_type = entry.file_type();
            let path = entry.path();

            // A link is recorded under its own name when it resolves to a
            // regular file. Linked directories are not entered.
            if file_type.is_symlink() {
                let target = fs::metadata(&path).map_err(|e| ScanError::io(&path, e))?;
                if !target.is_file() {
                    trace!(path = %path.display(), "Skipping link to non-file");
                    continue;
                }
            } else if !file_type.is_file() {
                continue;
            }

            let relative = relative_path(root_path, &path)?;
            files.push((path, relative));
        }

        debug!(root = %root_path.display(), files = files.len(), "Walk finished");
        Ok(files)
    }

    /// Fingerprint collected files on a dedicated pool.
    fn fingerprint_files(
        &self,
        config: &ScanConfig,
        files: Vec<(PathBuf, CompactString)>,
        cancel: &AtomicBool,
    ) -> Result<HashMap<CompactString, FileRecord>, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count(config.threads))
            .build()
            .map_err(|e| ScanError::InvalidConfig {
                message: format!("cannot build hashing pool: {e}"),
            })?;

        let records: DashMap<CompactString, FileRecord> = DashMap::with_capacity(files.len());

        pool.install(|| {
            files.into_par_iter().try_for_each(|(path, relative)| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(ScanError::Interrupted);
                }
                let record = fingerprint_file(config, &path, relative).inspect_err(|err| {
                    debug!(path = %path.display(), error = %err, "Fingerprinting failed");
                })?;
                insert_unique(&records, &path, record)
            })
        })?;

        Ok(records.into_iter().collect())
    }
}

/// Combine the two halves of a pair scan. A side that was only cancelled
/// never hides the failure that cancelled it.
fn join_results<T>(
    result_a: Result<T, ScanError>,
    result_b: Result<T, ScanError>,
) -> Result<(T, T), ScanError> {
    match (result_a, result_b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(ScanError::Interrupted), Err(err)) => Err(err),
        (Err(err), _) | (_, Err(err)) => Err(err),
    }
}

/// Add a record, refusing to replace one already stored under the same key.
fn insert_unique(
    records: &DashMap<CompactString, FileRecord>,
    path: &Path,
    record: FileRecord,
) -> Result<(), ScanError> {
    match records.entry(record.relative_path.clone()) {
        Entry::Occupied(_) => Err(ScanError::DuplicatePath {
            path: path.to_path_buf(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(record);
            Ok(())
        }
    }
}

/// Open, stream and stat a single file.
fn fingerprint_file(
    config: &ScanConfig,
    path: &Path,
    relative_path: CompactString,
) -> Result<FileRecord, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let fingerprint = fingerprint_reader(config.fingerprint, &file, config.chunk_size)
        .map_err(|e| ScanError::io(path, e))?;

    let metadata = file.metadata().map_err(|e| ScanError::io(path, e))?;
    let modified_at = metadata.modified().map_err(|e| ScanError::io(path, e))?;

    trace!(path = %relative_path, %fingerprint, "Fingerprinted file");
    Ok(FileRecord::new(
        relative_path,
        fingerprint,
        metadata.len(),
        modified_at,
    ))
}

/// Canonicalize a scan root and check it is a directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let root_path = root.canonicalize().map_err(|e| ScanError::io(root, e))?;

    if !root_path.is_dir() {
        return Err(ScanError::NotADirectory { path: root_path });
    }

    Ok(root_path)
}

/// Path of `path` below `root`, joined with `/` and without a leading separator.
///
/// Fails when `path` is not inside `root` or a component is not valid UTF-8,
/// since a lossy key could collide with another file's.
pub fn relative_path(root: &Path, path: &Path) -> Result<CompactString, ScanError> {
    let stripped = path.strip_prefix(root).map_err(|_| ScanError::Walk {
        path: path.to_path_buf(),
        message: format!("entry is outside of root {}", root.display()),
    })?;

    let mut relative = CompactString::default();
    for component in stripped.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| ScanError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            if !relative.is_empty() {
                relative.push('/');
            }
            relative.push_str(part);
        }
    }

    Ok(relative)
}

fn worker_count(threads: usize) -> usize {
    match threads {
        0 => thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1),
        n => n,
    }
}
