//! Console output shared between the prompt loop and the state callback

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// Cloneable handle on the CLI's output stream
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Write a line
    pub fn print(&self, text: &str) {
        self.write(format_args!("{}\n", text));
    }

    /// Write a prompt without a line break
    pub fn prompt(&self, text: &str) {
        self.write(format_args!("{}", text));
    }

    fn write(&self, args: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_fmt(args).and_then(|_| out.flush()) {
            warn!("Console write failed: {}", e);
        }
    }
}
