use super::haplosome::Haplosome;

/// Recycles [`Haplosome`] shells discarded at a generation swap (spec §4.9
/// "the previous generation's individuals are freed back into a junkyard
/// pool rather than dropped outright, since their haplosome shells are
/// reused for the next generation's offspring").
///
/// Reuse here is about the `Haplosome` struct itself, not its
/// [`crate::run::MutationRun`] contents: those are `Arc`-shared and clean
/// themselves up independently when the last reference drops.
#[derive(Default)]
pub struct HaplosomePool {
    free: Vec<Haplosome>,
}

impl HaplosomePool {
    pub fn new() -> Self {
        HaplosomePool { free: Vec::new() }
    }

    pub fn recycle(&mut self, mut haplosome: Haplosome) {
        let chromosome_index = haplosome.chromosome_index();
        haplosome.reset_to_null(chromosome_index);
        self.free.push(haplosome);
    }

    pub fn take_null(&mut self, chromosome_index: u16) -> Haplosome {
        match self.free.pop() {
            Some(mut haplosome) => {
                haplosome.reset_to_null(chromosome_index);
                haplosome
            }
            None => Haplosome::new_null(chromosome_index),
        }
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recycled_haplosomes_are_counted() {
        let mut pool = HaplosomePool::new();
        pool.recycle(Haplosome::new_null(0));
        pool.recycle(Haplosome::new_null(0));
        assert_eq!(pool.len(), 2);
    }
}
