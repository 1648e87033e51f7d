pub mod calculator;
pub mod clock;
pub mod registry;

pub use calculator::{calculator_tool, magic_calculator};
pub use clock::{time_checker, time_checker_tool};
pub use registry::ToolRegistry;
