//! The pending-operation collection behind a pipeline instance.
//!
//! Operations are kept as structured data (flag + optional value), never as
//! pre-joined command fragments, so the two renderers in
//! [`compile`](super::compile) can serialize them independently.

/// One queued transformation: a tool flag, its optional argument, and the
/// ordering metadata the compiler sorts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub flag: String,
    pub value: Option<String>,
    /// Application-order tier; lower applies earlier.
    pub priority: i32,
    /// Append-time tiebreaker among equal priorities. Assigned
    /// monotonically and never reused within a set's lifetime.
    pub sequence: u64,
}

/// Insertion-ordered collection of pending [`Operation`]s.
///
/// Mutated only through [`push`](Self::push) and [`clear`](Self::clear);
/// the compiler reads it through [`sorted`](Self::sorted).
#[derive(Debug, Default, Clone)]
pub struct OperationSet {
    ops: Vec<Operation>,
    next_sequence: u64,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation with a fresh sequence number. Flag/value content
    /// is taken as-is; each transform method owns producing safe values.
    pub fn push(&mut self, flag: impl Into<String>, value: Option<String>, priority: i32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.ops.push(Operation {
            flag: flag.into(),
            value,
            priority,
            sequence,
        });
    }

    /// Empty the set. Sequence numbers keep counting up so no number is
    /// ever reused across a clear.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations in application order: ascending priority, append order
    /// among ties. The explicit `(priority, sequence)` key makes the tie
    /// order defined rather than sort-algorithm-dependent.
    pub fn sorted(&self) -> Vec<&Operation> {
        let mut sorted: Vec<&Operation> = self.ops.iter().collect();
        sorted.sort_by_key(|op| (op.priority, op.sequence));
        sorted
    }
}
