use derive_new::new;
use serde::{Deserialize, Serialize};

pub use counter::*;
pub use event_id::*;

mod counter;
mod event_id;

/// An event document together with its denormalized counters.
///
/// The counters are only ever changed through [crate::store::CounterStore::increment], never written back from a
/// value that was read first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub views_count: i64,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
}

impl Event {
    pub fn get(&self, counter: Counter) -> i64 {
        match counter {
            Counter::Views => self.views_count,
            Counter::Likes => self.likes_count,
            Counter::Comments => self.comments_count,
        }
    }

    pub fn get_mut(&mut self, counter: Counter) -> &mut i64 {
        match counter {
            Counter::Views => &mut self.views_count,
            Counter::Likes => &mut self.likes_count,
            Counter::Comments => &mut self.comments_count,
        }
    }
}
