//! ZIP packaging of multi-file results.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::BatchError;

/// File name clients receive for multi-file results.
pub const ARCHIVE_NAME: &str = "converted_files.zip";

/// Entry names for `paths`: each file's basename, with ` (n)` inserted
/// before the extension when a basename repeats.
pub fn archive_entry_names(paths: &[PathBuf]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "file".to_string());
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return name;
            }
            let p = Path::new(&name);
            let stem = p.file_stem().unwrap_or_default().to_string_lossy();
            match p.extension() {
                Some(ext) => format!("{stem} ({}).{}", *count - 1, ext.to_string_lossy()),
                None => format!("{stem} ({})", *count - 1),
            }
        })
        .collect()
}

/// Writes every file in `paths` into a deflated ZIP at `archive_path`.
pub async fn build_archive(paths: Vec<PathBuf>, archive_path: PathBuf) -> Result<(), BatchError> {
    let entries = paths.len();
    let target = archive_path.clone();
    tokio::task::spawn_blocking(move || write_archive(&paths, &target))
        .await
        .map_err(|e| BatchError::Archive(io::Error::other(e)))?
        .map_err(BatchError::Archive)?;
    debug!(path = %archive_path.display(), entries, "Built archive");
    Ok(())
}

fn write_archive(paths: &[PathBuf], archive_path: &Path) -> io::Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, name) in paths.iter().zip(archive_entry_names(paths)) {
        zip.start_file(name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;
    Ok(())
}
