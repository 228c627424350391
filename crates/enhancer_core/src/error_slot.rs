/// Single user-visible error. A newer error replaces the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorSlot {
    message: Option<String>,
}

impl ErrorSlot {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Returns whether an error was showing.
    pub fn clear(&mut self) -> bool {
        self.message.take().is_some()
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
