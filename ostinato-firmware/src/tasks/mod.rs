//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod input;
pub mod runtime;

pub use input::input_task;
pub use runtime::runtime_task;
