use std::ops::Deref;

use pensum_progress::ProgressStore;
use pensum_shared::State;

mod catalog;
mod category;
mod chapter;
mod detail;

pub use catalog::*;
pub use category::*;
pub use chapter::*;
pub use detail::*;

/// Student-facing reads. Unpublished courses, topics and chapters never leave
/// this module.
#[derive(Clone)]
pub struct Query {
    state: State,
    progress: ProgressStore,
}

impl Deref for Query {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Query {
    pub fn new(state: State) -> Self {
        Self {
            progress: ProgressStore(state.clone()),
            state,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }
}
