//! Logger setup: env_logger to stderr, or to a size-rotated file
//!
//! With a log directory configured, records go to `<dir>/<file_name>`.
//! A write that would push the file past `max_bytes` first shifts
//! `name.1 .. name.N-1` up by one, moves the live file to `name.1` and
//! starts a fresh one. `name.N` (N = `max_backups`) is dropped.

use crate::config::LogConfig;
use anyhow::Context;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct RotatingFile {
    base: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Append to `dir/file_name`, creating the directory if needed
    pub fn open(dir: &Path, file_name: &str, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let base = dir.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&base)?;
        let written = file.metadata()?.len();
        Ok(Self {
            base,
            max_bytes,
            max_backups,
            file,
            written,
        })
    }

    /// `name` for 0, `name.n` otherwise
    fn backup_path(&self, n: usize) -> PathBuf {
        if n == 0 {
            return self.base.clone();
        }
        let mut name = self.base.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_backups > 0 {
            match fs::remove_file(self.backup_path(self.max_backups)) {
                Ok(()) => {},
                Err(e) if e.kind() == io::ErrorKind::NotFound => {},
                Err(e) => return Err(e),
            }
            for n in (1..self.max_backups).rev() {
                let from = self.backup_path(n);
                if from.exists() {
                    fs::rename(&from, self.backup_path(n + 1))?;
                }
            }
            fs::rename(&self.base, self.backup_path(1))?;
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.base)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // An oversized record still lands whole in an empty file
        if self.max_bytes > 0 && self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
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

/// Install the global logger. `RUST_LOG` takes precedence over `config.level`.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp_millis();

    if let Some(dir) = &config.directory {
        let file = RotatingFile::open(dir, &config.file_name, config.max_bytes, config.max_backups)
            .with_context(|| format!("failed to open log file in {}", dir.display()))?;
        builder
            .write_style(env_logger::WriteStyle::Never)
            .target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("logger already initialised")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(c: char) -> Vec<u8> {
        let mut v = vec![c as u8; 39];
        v.push(b'\n');
        v
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RotatingFile::open(dir.path(), "carplot.log", 100, 3).unwrap();
        for c in ['a', 'b', 'c'] {
            log.write_all(&line(c)).unwrap();
        }
        log.flush().unwrap();

        // a + b fit in 100 bytes, c forced a rotation
        let live = fs::read_to_string(dir.path().join("carplot.log")).unwrap();
        let first = fs::read_to_string(dir.path().join("carplot.log.1")).unwrap();
        assert!(live.starts_with('c'));
        assert_eq!(live.len(), 40);
        assert_eq!(first.len(), 80);
        assert!(first.starts_with('a'));
    }

    #[test]
    fn test_oldest_backup_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RotatingFile::open(dir.path(), "x.log", 40, 2).unwrap();
        for c in ['a', 'b', 'c', 'd'] {
            log.write_all(&line(c)).unwrap();
        }
        log.flush().unwrap();

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(read("x.log").starts_with('d'));
        assert!(read("x.log.1").starts_with('c'));
        assert!(read("x.log.2").starts_with('b'));
        assert!(!dir.path().join("x.log.3").exists());
    }

    #[test]
    fn test_no_backups_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RotatingFile::open(dir.path(), "x.log", 40, 0).unwrap();
        log.write_all(&line('a')).unwrap();
        log.write_all(&line('b')).unwrap();
        log.flush().unwrap();
        let live = fs::read_to_string(dir.path().join("x.log")).unwrap();
        assert!(live.starts_with('b'));
        assert!(!dir.path().join("x.log.1").exists());
    }

    #[test]
    fn test_reopen_keeps_size() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut log = RotatingFile::open(dir.path(), "x.log", 100, 1).unwrap();
            log.write_all(&line('a')).unwrap();
            log.write_all(&line('b')).unwrap();
        }
        let mut log = RotatingFile::open(dir.path(), "x.log", 100, 1).unwrap();
        log.write_all(&line('c')).unwrap();
        log.flush().unwrap();
        assert!(dir.path().join("x.log.1").exists());
    }

    #[test]
    fn test_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("exhibit");
        RotatingFile::open(&nested, "carplot.log", 1000, 2).unwrap();
        assert!(nested.join("carplot.log").exists());
    }
}
