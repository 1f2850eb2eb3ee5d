mod args;

pub use args::{merge_flags, Cli, Commands, RenameFlagArgs};
