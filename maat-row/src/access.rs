use std::fmt;

/// Kind of access a transaction performs on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
        }
    }
}

/// Status reported by every record operation.
///
/// `Abort` is only ever returned by [`RowMaat::abort`](crate::RowMaat::abort)
/// and means the access was rolled back, not that anything failed.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Ok,
    Abort,
}

impl AccessStatus {
    pub fn is_ok(self) -> bool {
        self == AccessStatus::Ok
    }
}
