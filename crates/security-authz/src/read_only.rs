//! Read-only mode switch.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Tells whether the system currently refuses writes.
pub trait ReadOnlyGate: Send + Sync {
    fn is_read_only(&self) -> bool;
}

/// Gate toggled at runtime.
#[derive(Debug, Default)]
pub struct ReadOnlySwitch {
    read_only: AtomicBool,
}

impl ReadOnlySwitch {
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only: AtomicBool::new(read_only),
        }
    }

    /// Enter or leave read-only mode.
    pub fn set_read_only(&self, read_only: bool) {
        let previous = self.read_only.swap(read_only, Ordering::AcqRel);
        if previous != read_only {
            info!(read_only, "Read-only mode changed");
        }
    }
}

impl ReadOnlyGate for ReadOnlySwitch {
    fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let switch = ReadOnlySwitch::default();
        assert!(!switch.is_read_only());
        switch.set_read_only(true);
        assert!(switch.is_read_only());
        switch.set_read_only(false);
        assert!(!switch.is_read_only());
    }
}
