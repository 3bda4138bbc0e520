use std::time::Instant;

use gensim_error::GensimResult;
use tracing::debug;

use crate::species::Species;

/// One phase of the per-tick sequence spec §4.10 lays out: a named unit of
/// work the coordinator's pipeline times and runs in order every tick.
pub trait TickStep: Send {
    fn name(&self) -> &'static str;
    fn run(&mut self, species: &mut Species) -> GensimResult<()>;
}

/// Runs [`TickStep`]s in order against a [`Species`]. This is just a `Vec`
/// the species coordinator assembles once at construction from the fixed
/// Wright-Fisher phase order spec §4.10 specifies, since the phase sequence
/// itself is not user-configurable.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn TickStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn add_step(&mut self, step: Box<dyn TickStep>) {
        self.steps.push(step);
    }

    pub fn run(&mut self, species: &mut Species) -> GensimResult<()> {
        for step in self.steps.iter_mut() {
            let timer = Instant::now();
            step.run(species)?;
            debug!(step = step.name(), elapsed_us = timer.elapsed().as_micros(), "tick phase complete");
        }
        Ok(())
    }
}
