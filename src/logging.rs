use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub fn parse_level(log_level: &str) -> Level {
    Level::from_str(log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", log_level);
        Level::INFO
    })
}

/// Logs to stdout, and additionally to `log_file` when given.
pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);

    if let Some(path) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(make_capped_file_writer(PathBuf::from(path), MAX_LOG_FILE_BYTES));
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .with(file_layer.with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .init();
    }
}

fn make_capped_file_writer(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFileWriter {
    let lock = Arc::new(Mutex::new(()));
    move || CappedFileWriter {
        path: path.clone(),
        max_len,
        lock: lock.clone(),
    }
}

/// Appends to a file; once it reaches `max_len` only the newest half is kept.
struct CappedFileWriter {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

impl CappedFileWriter {
    fn truncate_to_tail(&self) -> io::Result<()> {
        let keep_bytes = self.max_len / 2;
        let mut tail = Vec::new();
        {
            let mut rf = OpenOptions::new().read(true).open(&self.path)?;
            let size = rf.metadata()?.len();
            rf.seek(SeekFrom::Start(size.saturating_sub(keep_bytes)))?;
            rf.read_to_end(&mut tail)?;
        }
        let mut wf = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        wf.write_all(&tail)
    }
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let full = std::fs::metadata(&self.path)
            .map(|meta| meta.len() >= self.max_len)
            .unwrap_or(false);
        if full {
            self.truncate_to_tail()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_capped_writer_keeps_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("describe-image.log");
        let make_writer = make_capped_file_writer(path.clone(), 10);

        make_writer().write_all(b"0123456789").unwrap();
        make_writer().write_all(b"abc").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "56789abc");
    }
}
