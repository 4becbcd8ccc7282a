//! 应用层：组合根与进程生命周期

pub mod shutdown;
pub mod workbench;

pub use shutdown::{install_termination_signals, TerminationSignal};
pub use workbench::Workbench;
