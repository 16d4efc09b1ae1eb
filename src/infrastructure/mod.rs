pub mod os;
pub mod probes;
pub mod publish;
