//! Board services: views and the reloadable facade.

mod board;
mod view;

pub use board::{BoardError, BoardResult, ReloadOutcome, TaskBoard};
pub use view::{BucketView, BucketViewBuilder};
