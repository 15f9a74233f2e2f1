//! NavIntent-, NavCommand- und NavEffect-Enums für den Intent/Command-Datenfluss.

mod command;
mod effect;
mod intent;

pub use command::NavCommand;
pub use effect::NavEffect;
pub use intent::NavIntent;
