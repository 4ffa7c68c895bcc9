use std::str::FromStr;

use crate::entity::Rgb;
use crate::error::{Result, StickiesError};
use crate::shell::Event;

/// One line of input to `stickies run`
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Event(Event),
    List,
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> Result<ScriptLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(ScriptLine::Blank);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let event = match command {
        "list" | "ls" => return Ok(ScriptLine::List),
        "quit" | "exit" => return Ok(ScriptLine::Quit),
        "new" => {
            expect_args(command, &args, 0)?;
            Event::CreateRequested
        }
        "toggle" => {
            expect_args(command, &args, 0)?;
            Event::ToggleVisibilityRequested
        }
        "delete" | "rm" => {
            expect_args(command, &args, 1)?;
            Event::DeleteRequested(arg(command, args[0])?)
        }
        "color" => {
            expect_args(command, &args, 4)?;
            let r: i64 = arg(command, args[1])?;
            let g: i64 = arg(command, args[2])?;
            let b: i64 = arg(command, args[3])?;
            Event::ColorChangeRequested(arg(command, args[0])?, Rgb::clamped(r, g, b))
        }
        "font" => {
            expect_args(command, &args, 2)?;
            Event::FontSizeChangeRequested(arg(command, args[0])?, arg(command, args[1])?)
        }
        "bold" => {
            expect_args(command, &args, 1)?;
            Event::BoldToggleRequested(arg(command, args[0])?)
        }
        "entry" => {
            expect_args(command, &args, 1)?;
            Event::TextVisibilityToggleRequested(arg(command, args[0])?)
        }
        "move" => {
            expect_args(command, &args, 3)?;
            Event::MoveDelta(arg(command, args[0])?, arg(command, args[1])?, arg(command, args[2])?)
        }
        "resize" => {
            expect_args(command, &args, 3)?;
            Event::ResizeDelta(arg(command, args[0])?, arg(command, args[1])?, arg(command, args[2])?)
        }
        "release" => {
            expect_args(command, &args, 1)?;
            Event::Released(arg(command, args[0])?)
        }
        "text" => {
            // Body is everything after the ID, `\n` escapes become newlines
            let (id, body) = match rest.split_once(char::is_whitespace) {
                Some((id, body)) => (id, body),
                None => (rest, ""),
            };
            if id.is_empty() {
                return Err(usage(command, "expects an ID"));
            }
            Event::TextChanged(arg(command, id)?, body.replace("\\n", "\n"))
        }
        other => {
            return Err(StickiesError::InvalidCommand(format!(
                "unknown command '{}'",
                other
            )))
        }
    };

    Ok(ScriptLine::Event(event))
}

fn expect_args(command: &str, args: &[&str], count: usize) -> Result<()> {
    if args.len() == count {
        Ok(())
    } else {
        Err(usage(
            command,
            &format!("expects {} argument(s), got {}", count, args.len()),
        ))
    }
}

fn arg<T: FromStr>(command: &str, value: &str) -> Result<T> {
    value
        .trim_start_matches('+')
        .parse()
        .map_err(|_| usage(command, &format!("invalid argument '{}'", value)))
}

fn usage(command: &str, message: &str) -> StickiesError {
    StickiesError::InvalidCommand(format!("{}: {}", command, message))
}
