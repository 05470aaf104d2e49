//! Controller system: the trait, the attribute contract, the open/closed
//! state machine.

pub mod attrs;
pub mod state;
pub mod traits;

pub use state::{DismissPolicy, OpenEvent, OpenState};
pub use traits::{Context, Controller};
