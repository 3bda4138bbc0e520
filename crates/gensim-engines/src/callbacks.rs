use gensim_core::prelude::Mutation;
use gensim_error::GensimResult;

use crate::individual::Individual;
use crate::species::Species;

/// What a registered mutation callback decides about a newly drawn mutation
/// (spec §4.6 step 4: "callbacks may rewrite the mutation or reject it
/// (requesting redraw)").
///
/// The embedding application is the out-of-scope scripting runtime (spec
/// §1); these are the Rust-side hook points it would be wired to, modeled
/// as plain closures rather than a script-evaluation call.
pub enum MutationDecision {
    Accept,
    Reject,
    Rewrite(Mutation),
}

pub type EventCallback = Box<dyn FnMut(&mut Species) -> GensimResult<()> + Send>;
pub type MutationCallback = Box<dyn FnMut(&Mutation) -> MutationDecision + Send>;
pub type ModifyChildCallback = Box<dyn FnMut(&Individual) -> bool + Send>;

/// Callback lists for one species coordinator, one slot per per-tick
/// scripting hook spec §4.10 names (first/early/late-event scripts) plus
/// the two per-offspring hooks spec §4.6 and its `modifyChild` reference
/// describe.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) first_event: Vec<EventCallback>,
    pub(crate) early_event: Vec<EventCallback>,
    pub(crate) late_event: Vec<EventCallback>,
    pub(crate) mutation: Vec<MutationCallback>,
    pub(crate) modify_child: Vec<ModifyChildCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Callbacks::default()
    }

    pub fn on_first_event(&mut self, callback: EventCallback) {
        self.first_event.push(callback);
    }

    pub fn on_early_event(&mut self, callback: EventCallback) {
        self.early_event.push(callback);
    }

    pub fn on_late_event(&mut self, callback: EventCallback) {
        self.late_event.push(callback);
    }

    pub fn on_mutation(&mut self, callback: MutationCallback) {
        self.mutation.push(callback);
    }

    pub fn on_modify_child(&mut self, callback: ModifyChildCallback) {
        self.modify_child.push(callback);
    }

    pub fn has_mutation_callbacks(&self) -> bool {
        !self.mutation.is_empty()
    }

    pub fn has_modify_child_callbacks(&self) -> bool {
        !self.modify_child.is_empty()
    }
}
