mod commands;
mod handlers;
mod host;
mod script;

pub use commands::{Cli, Commands};
pub use handlers::{handle_list, handle_run};
pub use host::{parse_screen, HeadlessShell};
pub use script::{parse_line, ScriptLine};
