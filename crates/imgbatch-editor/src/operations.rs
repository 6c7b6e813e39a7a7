//! Ordered log of pending transforms.

use imgbatch_core::Operation;

/// Append-only record of the transforms applied since the source was loaded
/// or last saved. Operations are kept in application order and never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationLog {
    operations: Vec<Operation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operation: Operation) {
        tracing::debug!(action = operation.name(), "Recorded operation");
        self.operations.push(operation);
    }

    pub fn snapshot(&self) -> OperationLog {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: OperationLog) {
        self.operations = snapshot.operations;
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn to_vec(&self) -> Vec<Operation> {
        self.operations.clone()
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_application_order_and_duplicates() {
        let mut log = OperationLog::new();
        log.add(Operation::Rotate { angle: 90.0 });
        log.add(Operation::Rotate { angle: 90.0 });
        log.add(Operation::Flip {
            horizontal: true,
            vertical: false,
        });

        let names: Vec<_> = log.iter().map(Operation::name).collect();
        assert_eq!(names, vec!["rotate", "rotate", "flip"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut log = OperationLog::new();
        log.add(Operation::Rotate { angle: 45.0 });
        let snapshot = log.snapshot();

        log.add(Operation::Resize {
            width: 10,
            height: 10,
        });
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);

        log.restore(snapshot);
        assert_eq!(log.to_vec(), vec![Operation::Rotate { angle: 45.0 }]);

        log.clear();
        assert!(log.is_empty());
    }
}
