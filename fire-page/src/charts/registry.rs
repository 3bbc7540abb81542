//! Exclusive ownership of live chart handles, one slot per chart name.

use std::collections::HashMap;

use super::ChartName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPhase {
    Absent,
    Rendering,
    Rendered,
}

struct Slot<H> {
    handle: H,
    generation: u64,
    phase: ChartPhase,
}

/// Holds at most one handle per [`ChartName`].
///
/// Every install gets a fresh generation so a render completion that
/// arrives after its handle was replaced can be recognised and dropped.
pub struct ChartRegistry<H> {
    slots: HashMap<ChartName, Slot<H>>,
    next_generation: u64,
}

impl<H> Default for ChartRegistry<H> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next_generation: 1,
        }
    }
}

impl<H> ChartRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly created handle in the `Rendering` phase.
    ///
    /// Returns its generation and whatever handle previously occupied the
    /// slot; the caller owns (and must destroy) the displaced handle.
    pub fn install(&mut self, name: ChartName, handle: H) -> (u64, Option<H>) {
        let generation = self.next_generation;
        self.next_generation += 1;
        let displaced = self.slots.insert(
            name,
            Slot {
                handle,
                generation,
                phase: ChartPhase::Rendering,
            },
        );
        (generation, displaced.map(|slot| slot.handle))
    }

    /// `Rendering -> Rendered` if `generation` still owns the slot.
    pub fn mark_rendered(&mut self, name: ChartName, generation: u64) -> bool {
        match self.slots.get_mut(&name) {
            Some(slot) if slot.generation == generation => {
                slot.phase = ChartPhase::Rendered;
                true
            }
            _ => false,
        }
    }

    /// Remove the slot's handle, whatever its generation.
    pub fn take(&mut self, name: ChartName) -> Option<H> {
        self.slots.remove(&name).map(|slot| slot.handle)
    }

    /// Remove the slot's handle only if `generation` still owns it.
    pub fn take_if_current(&mut self, name: ChartName, generation: u64) -> Option<H> {
        if self.slots.get(&name)?.generation != generation {
            return None;
        }
        self.take(name)
    }

    pub fn handle(&self, name: ChartName) -> Option<&H> {
        self.slots.get(&name).map(|slot| &slot.handle)
    }

    pub fn phase(&self, name: ChartName) -> ChartPhase {
        self.slots
            .get(&name)
            .map(|slot| slot.phase)
            .unwrap_or(ChartPhase::Absent)
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }
}
