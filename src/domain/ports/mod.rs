pub mod command;
pub mod publisher;

pub use command::{command_line, CommandError, CommandOutput, CommandRunner};
pub use publisher::{PublishError, RecordPublisher};
