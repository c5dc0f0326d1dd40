use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

/// Registry of named 32-bit counters.
///
/// The registry owns the counter cells; subsystems acquire a handle per
/// counter at construction and bump it with relaxed atomics. Names are
/// dot-scoped by interface, e.g. `eth0.arp.requests_rx`.
pub struct StatRegistry {
    cells: RwLock<HashMap<String, Arc<AtomicU32>>>,
}

impl StatRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        StatRegistry {
            cells: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the counter registered under `name`, creating it at zero on
    /// first use. Handles stay valid for the life of the registry.
    pub fn counter(&self, name: &str) -> Arc<AtomicU32> {
        let mut cells = self.cells.write().unwrap();
        cells
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU32::new(0)))
            .clone()
    }

    /// Reads a counter by name, None if it was never registered.
    pub fn value(&self, name: &str) -> Option<u32> {
        let cells = self.cells.read().unwrap();
        cells.get(name).map(|cell| cell.load(Ordering::Relaxed))
    }

    /// Returns number of registered counters
    pub fn len(&self) -> usize {
        let cells = self.cells.read().unwrap();
        cells.len()
    }

    /// Returns true if no counter was registered yet
    pub fn is_empty(&self) -> bool {
        let cells = self.cells.read().unwrap();
        cells.is_empty()
    }
}
