pub mod push;

pub use push::PushCommand;
