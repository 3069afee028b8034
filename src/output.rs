use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Clonable handle to where a logger's bytes end up.
///
/// A `Logger` exposes one `Output` merging all of its enabled sinks so tests
/// and callers can observe or redirect the stream. Writes through a clone go
/// to the same underlying destination; shared writers are serialized behind a
/// mutex.
#[derive(Clone)]
pub struct Output {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Discard,
    Stdout,
    Shared(Arc<Mutex<Box<dyn Write + Send>>>),
    Multi(Vec<Output>),
}

impl Output {
    /// Swallow every byte. The output of a logger with no enabled sinks.
    pub fn discard() -> Output {
        Output { inner: Inner::Discard }
    }

    /// Process standard output.
    pub fn stdout() -> Output {
        Output { inner: Inner::Stdout }
    }

    /// Wrap an arbitrary writer (a rotating file, an in-memory buffer, ...).
    pub fn writer(w: impl Write + Send + 'static) -> Output {
        Output { inner: Inner::Shared(Arc::new(Mutex::new(Box::new(w)))) }
    }

    /// Fan out to several outputs. Zero targets degrade to discard.
    ///
    /// A failing target does not stop the others; the first error is
    /// reported after all targets were attempted.
    pub fn multi(outputs: Vec<Output>) -> Output {
        if outputs.is_empty() {
            Output::discard()
        } else {
            Output { inner: Inner::Multi(outputs) }
        }
    }

    /// In-memory output plus a handle for reading back what was written.
    /// Test helper for observing sink bytes synchronously.
    pub fn buffer() -> (Output, BufferHandle) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = BufferHandle(Arc::clone(&buf));
        (Output { inner: Inner::Shared(Arc::new(Mutex::new(Box::new(BufferWriter(buf))))) }, handle)
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.inner, Inner::Discard)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Discard => f.write_str("Output(discard)"),
            Inner::Stdout => f.write_str("Output(stdout)"),
            Inner::Shared(_) => f.write_str("Output(writer)"),
            Inner::Multi(outputs) => write!(f, "Output(multi x{})", outputs.len()),
        }
    }
}

fn lock_writer(shared: &Arc<Mutex<Box<dyn Write + Send>>>) -> MutexGuard<'_, Box<dyn Write + Send>> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.inner {
            Inner::Discard => Ok(buf.len()),
            Inner::Stdout => io::stdout().write(buf),
            Inner::Shared(shared) => lock_writer(shared).write(buf),
            Inner::Multi(outputs) => {
                let mut first_err = None;
                for output in outputs {
                    if let Err(e) = output.clone().write_all(buf) {
                        first_err.get_or_insert(e);
                    }
                }
                match first_err {
                    None => Ok(buf.len()),
                    Some(e) => Err(e),
                }
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.inner {
            Inner::Discard => Ok(()),
            Inner::Stdout => io::stdout().flush(),
            Inner::Shared(shared) => lock_writer(shared).flush(),
            Inner::Multi(outputs) => {
                let mut first_err = None;
                for output in outputs {
                    if let Err(e) = output.clone().flush() {
                        first_err.get_or_insert(e);
                    }
                }
                match first_err {
                    None => Ok(()),
                    Some(e) => Err(e),
                }
            }
        }
    }
}

/// Read side of [`Output::buffer`].
#[derive(Clone)]
pub struct BufferHandle(Arc<Mutex<Vec<u8>>>);

impl BufferHandle {
    pub fn bytes(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Complete lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.as_string().lines().map(str::to_string).collect()
    }
}

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut guard) => guard.extend_from_slice(buf),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
