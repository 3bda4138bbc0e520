pub mod breakpoints;
pub mod crossover_mutation;
pub mod events;
pub mod mutations;

pub use breakpoints::{Breakpoint, draw_breakpoints, draw_weighted_position};
pub use crossover_mutation::{CrossoverOutput, crossover_mutation};
pub use events::{EventCounts, draw_event_counts};
pub use mutations::draw_mutation_positions;
