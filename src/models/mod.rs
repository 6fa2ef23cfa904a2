pub mod error;
pub mod macros;
pub mod policy;
pub mod schedule;
pub mod slot;
pub mod time;
pub mod transitions;

pub use error::*;
pub use policy::SchedulingPolicy;
pub use schedule::*;
pub use slot::*;
pub use time::*;
pub use transitions::{allowed_sources, transition, SlotOperation};
