pub mod scripted_runner;
pub mod system_runner;

pub use scripted_runner::ScriptedRunner;
pub use system_runner::SystemCommandRunner;
