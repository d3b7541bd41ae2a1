use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::rc::Rc;

/// Destination for printed text.
pub trait Console: fmt::Debug {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Release the sink. Called when it is swapped out of a memory.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory console. Clones share the same text, so a caller can keep a
/// handle and read what was printed after handing the console to a memory.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    text: Rc<RefCell<String>>,
    closed: Rc<Cell<bool>>,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer::default()
    }

    pub fn contents(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Console for Buffer {
    fn write(&mut self, text: &str) -> io::Result<()> {
        if self.closed.get() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write to a closed buffer",
            ));
        }
        self.text.borrow_mut().push_str(text);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed.set(true);
        Ok(())
    }
}

/// Console over any byte writer. Closing flushes it.
pub struct Stream<W: io::Write> {
    writer: W,
}

impl<W: io::Write> Stream<W> {
    pub fn new(writer: W) -> Self {
        Stream { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Console for Stream<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: io::Write> fmt::Debug for Stream<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}
