use hashbrown::HashMap;

use gensim_core::prelude::{Haplosome, MutationIndex, MutationRegistry};
use gensim_core::TraitCombination;
use gensim_error::GensimResult;

/// Computes one trait's phenotype value for a diploid individual from the
/// per-mutation effect/dominance pairs carried in the species' trait table
/// (original source `trait.cpp`, spec §11 "Trait composition mode").
///
/// A mutation present on both haplosomes (homozygous) contributes its full
/// `effect`; present on exactly one (heterozygous) it contributes
/// `dominance * effect`. Additive combination sums contributions starting
/// from `0.0`; multiplicative combination starts from `1.0` and multiplies
/// in `(1.0 + contribution)` per mutation, the standard selection-coefficient
/// convention so a neutral mutation (`effect == 0`) leaves fitness unchanged.
pub fn trait_value(
    registry: &MutationRegistry,
    trait_id: usize,
    combination: TraitCombination,
    haplosome_a: &Haplosome,
    haplosome_b: &Haplosome,
) -> GensimResult<f64> {
    let mut occurrences: HashMap<MutationIndex, u8> = HashMap::new();
    for haplosome in [haplosome_a, haplosome_b] {
        if !haplosome.is_populated() {
            continue;
        }
        for run in haplosome.mutruns()? {
            for &index in run.as_slice() {
                *occurrences.entry(index).or_insert(0) += 1;
            }
        }
    }

    let mut value = match combination {
        TraitCombination::Additive => 0.0,
        TraitCombination::Multiplicative => 1.0,
    };

    for (index, count) in occurrences {
        let info = registry.traits().get(trait_id, index);
        let contribution = if count >= 2 { info.effect } else { info.dominance * info.effect } as f64;
        match combination {
            TraitCombination::Additive => value += contribution,
            TraitCombination::Multiplicative => value *= 1.0 + contribution,
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gensim_core::prelude::{Mutation, MutationRegistry, Nucleotide};
    use gensim_core::TraitInfo;

    #[test]
    fn homozygous_mutation_contributes_full_effect_additively() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(Mutation::new(0, 0, 10, 0, 0, Nucleotide::None), 2).unwrap();
        registry.traits_mut().set(0, index, TraitInfo { effect: 0.2, dominance: 0.5 });

        let run = gensim_core::MutationRun::from_sorted(vec![index]);
        let a = Haplosome::new_populated(0, vec![run.clone()]);
        let b = Haplosome::new_populated(0, vec![run]);

        let value = trait_value(&registry, 0, TraitCombination::Additive, &a, &b).unwrap();
        assert!((value - 0.2).abs() < 1e-9);
    }

    #[test]
    fn heterozygous_mutation_is_dominance_weighted() {
        let mut registry = MutationRegistry::new(1);
        let index = registry.register(Mutation::new(0, 0, 10, 0, 0, Nucleotide::None), 1).unwrap();
        registry.traits_mut().set(0, index, TraitInfo { effect: 0.4, dominance: 0.25 });

        let run = gensim_core::MutationRun::from_sorted(vec![index]);
        let a = Haplosome::new_populated(0, vec![run]);
        let b = Haplosome::new_populated(0, vec![gensim_core::MutationRun::empty()]);

        let value = trait_value(&registry, 0, TraitCombination::Additive, &a, &b).unwrap();
        assert!((value - 0.1).abs() < 1e-9);
    }

    #[test]
    fn multiplicative_combination_starts_from_one() {
        let registry = MutationRegistry::new(1);
        let a = Haplosome::new_populated(0, vec![gensim_core::MutationRun::empty()]);
        let b = Haplosome::new_populated(0, vec![gensim_core::MutationRun::empty()]);
        let value = trait_value(&registry, 0, TraitCombination::Multiplicative, &a, &b).unwrap();
        assert_eq!(value, 1.0);
    }
}
