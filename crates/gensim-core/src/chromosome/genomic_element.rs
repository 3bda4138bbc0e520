use gensim_error::{GensimError, GensimResult};

/// A mutation-type proportion entry in a [`GenomicElementType`]: when a new
/// mutation falls inside an element of this type, its muttype is chosen
/// proportional to these weights.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationTypeProportion {
    pub muttype_id: u32,
    pub weight: f64,
}

/// A named set of mutation types and their relative proportions, shared by
/// every [`GenomicElement`] that references it (spec §3 "a sorted,
/// non-overlapping sequence of genomic elements each referencing a
/// genomic-element-type").
#[derive(Clone, Debug, PartialEq)]
pub struct GenomicElementType {
    pub id: u32,
    pub proportions: Vec<MutationTypeProportion>,
}

impl GenomicElementType {
    pub fn new(id: u32, proportions: Vec<MutationTypeProportion>) -> GensimResult<Self> {
        if proportions.is_empty() {
            return Err(GensimError::config(format!(
                "genomic element type {id} has no mutation type proportions"
            )));
        }
        if proportions.iter().any(|p| p.weight < 0.0) {
            return Err(GensimError::config(format!(
                "genomic element type {id} has a negative mutation type weight"
            )));
        }
        Ok(GenomicElementType { id, proportions })
    }

    /// Picks a muttype id from this element's proportions using `u`, a
    /// uniform draw in `[0, total_weight)`.
    pub fn pick_muttype(&self, u: f64) -> u32 {
        let mut acc = 0.0;
        for p in &self.proportions {
            acc += p.weight;
            if u < acc {
                return p.muttype_id;
            }
        }
        self.proportions.last().expect("non-empty by construction").muttype_id
    }

    pub fn total_weight(&self) -> f64 {
        self.proportions.iter().map(|p| p.weight).sum()
    }
}

/// One non-overlapping span of a [`super::chromosome::Chromosome`], typed by
/// reference to a [`GenomicElementType`] (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct GenomicElement {
    pub start: i64,
    pub end: i64,
    pub element_type_id: u32,
}

impl GenomicElement {
    pub fn contains(&self, position: i64) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Validates that `elements` are sorted ascending by start and
/// non-overlapping (spec §3 invariant; spec §7 "overlapping genomic
/// elements" is a configuration error).
pub fn validate_elements(elements: &[GenomicElement]) -> GensimResult<()> {
    for pair in elements.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start <= a.end {
            return Err(GensimError::config(format!(
                "genomic elements overlap: [{}, {}] and [{}, {}]",
                a.start, a.end, b.start, b.end
            )));
        }
    }
    for e in elements {
        if e.end < e.start {
            return Err(GensimError::config(format!(
                "genomic element [{}, {}] has end before start",
                e.start, e.end
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_muttype_respects_cumulative_weights() {
        let get = GenomicElementType::new(
            0,
            vec![
                MutationTypeProportion { muttype_id: 1, weight: 0.9 },
                MutationTypeProportion { muttype_id: 2, weight: 0.1 },
            ],
        )
        .unwrap();
        assert_eq!(get.pick_muttype(0.0), 1);
        assert_eq!(get.pick_muttype(0.95), 2);
    }

    #[test]
    fn overlapping_elements_are_rejected() {
        let elements = vec![
            GenomicElement { start: 0, end: 99, element_type_id: 0 },
            GenomicElement { start: 50, end: 150, element_type_id: 0 },
        ];
        assert!(validate_elements(&elements).is_err());
    }

    #[test]
    fn adjacent_non_overlapping_elements_are_valid() {
        let elements = vec![
            GenomicElement { start: 0, end: 99, element_type_id: 0 },
            GenomicElement { start: 100, end: 199, element_type_id: 0 },
        ];
        assert!(validate_elements(&elements).is_ok());
    }
}
