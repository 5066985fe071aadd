pub mod client;
pub mod google;
pub mod writer;

pub use client::CalendarService;
pub use writer::CalendarWriter;
