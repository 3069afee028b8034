use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Size- and age-bounded append writer for the file sink.
///
/// Writes go to `dir/name`. When a write would push the active file past
/// `max_size` bytes it is renamed to a timestamped backup first, optionally
/// gzip-compressed, and backups older than `max_age_days` are pruned.
/// A `max_size` of zero disables rotation; a `max_age_days` of zero keeps
/// every backup.
///
/// Rotation housekeeping is best-effort: a backup that cannot be compressed
/// or pruned is reported on stderr and logging continues on the fresh file.
pub struct RotatingFileWriter {
    dir: PathBuf,
    name: String,
    max_size: u64,
    max_age_days: u64,
    compress: bool,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    /// Open (or create) the active file in append mode, creating the
    /// directory if needed. `max_size` is in bytes.
    pub fn new(
        dir: impl Into<PathBuf>,
        name: impl Into<String>,
        max_size: u64,
        max_age_days: u64,
        compress: bool,
    ) -> io::Result<RotatingFileWriter> {
        let dir = dir.into();
        let name = name.into();
        fs::create_dir_all(&dir)?;

        let file = OpenOptions::new().create(true).append(true).open(dir.join(&name))?;
        let written = file.metadata()?.len();

        Ok(RotatingFileWriter { dir, name, max_size, max_age_days, compress, file, written })
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        let active = self.active_path();
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        let backup = self.dir.join(format!("{}.{stamp}", self.name));
        fs::rename(&active, &backup)?;

        if self.compress {
            if let Err(e) = compress_backup(&backup) {
                eprintln!("fieldlog: failed to compress rotated log {}: {e}", backup.display());
            }
        }
        self.prune_expired_backups();

        self.file = OpenOptions::new().create(true).append(true).open(&active)?;
        self.written = 0;
        Ok(())
    }

    fn prune_expired_backups(&self) {
        if self.max_age_days == 0 {
            return;
        }
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        let cutoff = self.max_age_days.saturating_mul(24 * 60 * 60);
        let prefix = format!("{}.", self.name);

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.starts_with(&prefix) {
                continue;
            }
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .map(|age| age > Duration::from_secs(cutoff))
                .unwrap_or(false);
            if expired {
                if let Err(e) = fs::remove_file(entry.path()) {
                    eprintln!("fieldlog: failed to prune rotated log {file_name}: {e}");
                }
            }
        }
    }
}

fn compress_backup(backup: &Path) -> io::Result<()> {
    let mut source = File::open(backup)?;
    let target = backup.with_extension(match backup.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.gz"),
        None => "gz".to_string(),
    });

    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.sync_all()?;
    fs::remove_file(backup)
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_size > 0
            && self.written > 0
            && self.written.saturating_add(buf.len() as u64) > self.max_size
        {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
