//! CLI commands

pub mod dispatch;
pub mod neutron;
pub mod register;
pub mod status;
pub mod switch;

pub use dispatch::DispatchCommand;
pub use neutron::NeutronPluginCommand;
pub use register::RegisterCommand;
pub use status::StatusCommand;
pub use switch::SwitchCommand;
