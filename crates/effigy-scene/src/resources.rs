//! Ownership ledger for GPU-backed scene resources.
//!
//! Every [`Geometry`](crate::Geometry) and [`Material`](crate::Material)
//! holds a [`Ticket`] issued by a [`ResourceContext`]. Dropping the resource
//! drops the ticket, which returns it to the ledger, so dropping a whole
//! scene subtree frees everything it owned. Contexts are independent: two
//! viewers (or two tests) never see each other's counts.

use std::cell::RefCell;
use std::rc::Rc;

/// Kind of a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
}

/// Snapshot of a context's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceStats {
    pub live_geometries: usize,
    pub live_materials: usize,
    /// Resources ever issued by this context.
    pub total_created: usize,
}

impl ResourceStats {
    /// Number of resources currently alive.
    pub fn live(&self) -> usize {
        self.live_geometries + self.live_materials
    }
}

#[derive(Debug, Default)]
struct Ledger {
    stats: ResourceStats,
}

impl Ledger {
    fn live_mut(&mut self, kind: ResourceKind) -> &mut usize {
        match kind {
            ResourceKind::Geometry => &mut self.stats.live_geometries,
            ResourceKind::Material => &mut self.stats.live_materials,
        }
    }
}

/// A handle on one resource ledger. Cloning shares the ledger.
#[derive(Debug, Clone, Default)]
pub struct ResourceContext {
    ledger: Rc<RefCell<Ledger>>,
}

impl ResourceContext {
    /// Creates a context with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counts.
    pub fn stats(&self) -> ResourceStats {
        self.ledger.borrow().stats
    }

    /// Whether two handles share a ledger.
    pub fn same_ledger(&self, other: &ResourceContext) -> bool {
        Rc::ptr_eq(&self.ledger, &other.ledger)
    }

    pub(crate) fn acquire(&self, kind: ResourceKind) -> Ticket {
        {
            let mut ledger = self.ledger.borrow_mut();
            *ledger.live_mut(kind) += 1;
            ledger.stats.total_created += 1;
        }
        Ticket {
            ledger: Rc::clone(&self.ledger),
            kind,
        }
    }
}

/// Proof of one live resource; returns itself to the ledger on drop.
#[derive(Debug)]
pub struct Ticket {
    ledger: Rc<RefCell<Ledger>>,
    kind: ResourceKind,
}

impl Ticket {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        let live = ledger.live_mut(self.kind);
        *live = live.saturating_sub(1);
    }
}
