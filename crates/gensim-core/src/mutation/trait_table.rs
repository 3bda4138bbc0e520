use super::types::{MutationIndex, TraitInfo};

/// Per-trait effect/dominance storage, kept out of [`super::types::Mutation`]
/// itself so the mutation record stays fixed-size and `Copy` regardless of
/// how many traits a model defines (spec §3: "a mutation carries one
/// effect/dominance pair per trait the species defines").
///
/// Indexed in parallel with the owning [`super::block::MutationBlock`]:
/// column `t` holds one [`TraitInfo`] per mutation slot, growing in lockstep
/// with the block.
#[derive(Debug, Default)]
pub struct TraitTable {
    columns: Vec<Vec<TraitInfo>>,
}

impl TraitTable {
    pub fn new(num_traits: usize) -> Self {
        TraitTable {
            columns: (0..num_traits).map(|_| Vec::new()).collect(),
        }
    }

    pub fn num_traits(&self) -> usize {
        self.columns.len()
    }

    /// Extends every column to at least `capacity` slots, filling new
    /// entries with [`TraitInfo::default`]. Called whenever the backing
    /// mutation block grows.
    pub fn grow_to(&mut self, capacity: usize) {
        for column in &mut self.columns {
            if column.len() < capacity {
                column.resize(capacity, TraitInfo::default());
            }
        }
    }

    pub fn set(&mut self, trait_id: usize, index: MutationIndex, info: TraitInfo) {
        let column = &mut self.columns[trait_id];
        if column.len() <= index as usize {
            column.resize(index as usize + 1, TraitInfo::default());
        }
        column[index as usize] = info;
    }

    pub fn get(&self, trait_id: usize, index: MutationIndex) -> TraitInfo {
        self.columns
            .get(trait_id)
            .and_then(|column| column.get(index as usize))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_slots_default_to_zero_effect() {
        let table = TraitTable::new(2);
        let info = table.get(0, 5);
        assert_eq!(info.effect, 0.0);
        assert_eq!(info.dominance, 0.5);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut table = TraitTable::new(1);
        table.set(0, 3, TraitInfo { effect: 0.25, dominance: 0.1 });
        let info = table.get(0, 3);
        assert_eq!(info.effect, 0.25);
        assert_eq!(info.dominance, 0.1);
    }

    #[test]
    fn grow_to_extends_without_disturbing_existing_values() {
        let mut table = TraitTable::new(1);
        table.set(0, 1, TraitInfo { effect: 1.0, dominance: 1.0 });
        table.grow_to(10);
        assert_eq!(table.get(0, 1).effect, 1.0);
        assert_eq!(table.get(0, 9).effect, 0.0);
    }
}
