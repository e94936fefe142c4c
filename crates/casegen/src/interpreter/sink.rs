//! Output sinks receiving the finished buffer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::error::SinkError;

/// A destination for a finished output buffer, such as the clipboard.
///
/// Any `Fn(&str) -> Result<(), SinkError>` closure is a sink.
pub trait Sink {
    /// Receive the whole buffer of one run.
    fn emit(&self, text: &str) -> Result<(), SinkError>;
}

impl<F> Sink for F
where
    F: Fn(&str) -> Result<(), SinkError>,
{
    fn emit(&self, text: &str) -> Result<(), SinkError> {
        self(text)
    }
}

/// A sink that keeps every emitted buffer in memory.
///
/// Clones share the same storage, so a clone can be handed to a
/// [`Generator`](crate::Generator) and inspected afterwards.
///
/// ```
/// use casegen::{MemorySink, Sink};
///
/// let sink = MemorySink::new();
/// sink.emit("1 2 3").unwrap();
/// assert_eq!(sink.emitted(), vec!["1 2 3".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    emitted: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every buffer emitted so far, oldest first.
    pub fn emitted(&self) -> Vec<String> {
        self.emitted.borrow().clone()
    }
}

impl Sink for MemorySink {
    fn emit(&self, text: &str) -> Result<(), SinkError> {
        self.emitted.borrow_mut().push(text.to_string());
        Ok(())
    }
}
