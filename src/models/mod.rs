pub mod assignment;
pub mod day_slot;
pub mod fixed_event;
pub mod task;
pub mod task_event;
pub mod window;

pub use assignment::Assignment;
pub use day_slot::DaySlot;
pub use fixed_event::{EventOwnership, FixedEvent};
pub use task::{Priority, Task, TaskStatus};
pub use task_event::TaskEvent;
pub use window::{WindowKind, WindowTemplate};
