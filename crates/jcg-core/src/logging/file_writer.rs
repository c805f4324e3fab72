use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing_subscriber::fmt::MakeWriter;

/// File writer that implements MakeWriter for tracing-subscriber.
/// Opens the log file in append mode on every borrow and falls back to
/// stderr when it cannot, so logging never takes the process down.
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn open(&self) -> io::Result<BufWriter<File>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(BufWriter::new(file))
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = Box<dyn Write + Send + Sync + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.open() {
            Ok(writer) => Box::new(writer),
            // Events emitted here would be swallowed by the dispatcher
            // reentrancy guard, so report the failure directly.
            Err(err) => {
                eprintln!(
                    "failed to open log file {}: {err}, falling back to stderr",
                    self.path.display()
                );
                Box::new(io::stderr())
            }
        }
    }
}
