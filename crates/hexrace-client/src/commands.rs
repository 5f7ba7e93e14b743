//! Line commands read from stdin.
//!
//! `study` stands in for the host application reporting a finished study
//! item.

use hexrace_core::{HexCoord, StudyEvent};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join,
    Leave,
    Move { target: HexCoord, climb: bool },
    Study(StudyEvent),
    Ruin,
    Wager,
    Recall,
    Flare,
    /// Read the thermometer
    Ping,
    Trap(HexCoord),
    Untrap(HexCoord),
    Look,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

const MOVE_USAGE: &str = "move <q> <r> [climb]";
const STUDY_USAGE: &str = "study <grade> <ms>";
const TRAP_USAGE: &str = "trap <q> <r>";
const UNTRAP_USAGE: &str = "untrap <q> <r>";

fn coord(args: &[&str], usage: &'static str) -> Result<HexCoord, CommandError> {
    match args {
        [q, r, ..] => {
            let q = q.parse().map_err(|_| CommandError::Usage(usage))?;
            let r = r.parse().map_err(|_| CommandError::Usage(usage))?;
            Ok(HexCoord::new(q, r))
        }
        _ => Err(CommandError::Usage(usage)),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = words.split_first().ok_or(CommandError::Empty)?;

        match name.to_ascii_lowercase().as_str() {
            "join" => Ok(Command::Join),
            "leave" => Ok(Command::Leave),
            "move" | "m" => {
                let target = coord(args, MOVE_USAGE)?;
                let climb = match args.get(2) {
                    None => false,
                    Some(word) if word.eq_ignore_ascii_case("climb") => true,
                    Some(_) => return Err(CommandError::Usage(MOVE_USAGE)),
                };
                Ok(Command::Move { target, climb })
            }
            "study" | "s" => match args {
                [grade, ms] => {
                    let grade = grade.parse().map_err(|_| CommandError::Usage(STUDY_USAGE))?;
                    let ms = ms.parse().map_err(|_| CommandError::Usage(STUDY_USAGE))?;
                    Ok(Command::Study(StudyEvent::new(grade, ms)))
                }
                _ => Err(CommandError::Usage(STUDY_USAGE)),
            },
            "ruin" => Ok(Command::Ruin),
            "wager" => Ok(Command::Wager),
            "recall" => Ok(Command::Recall),
            "flare" => Ok(Command::Flare),
            "ping" => Ok(Command::Ping),
            "trap" => Ok(Command::Trap(coord(args, TRAP_USAGE)?)),
            "untrap" => Ok(Command::Untrap(coord(args, UNTRAP_USAGE)?)),
            "look" | "l" => Ok(Command::Look),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!("join".parse::<Command>(), Ok(Command::Join));
        assert_eq!(
            "move 1 -1".parse::<Command>(),
            Ok(Command::Move {
                target: HexCoord::new(1, -1),
                climb: false
            })
        );
        assert_eq!(
            "  MOVE 0 2 climb ".parse::<Command>(),
            Ok(Command::Move {
                target: HexCoord::new(0, 2),
                climb: true
            })
        );
        assert_eq!(
            "study 3 4200".parse::<Command>(),
            Ok(Command::Study(StudyEvent::new(3, 4200)))
        );
        assert_eq!("untrap -2 1".parse::<Command>(), Ok(Command::Untrap(HexCoord::new(-2, 1))));
        assert_eq!("Recall".parse::<Command>(), Ok(Command::Recall));
        assert_eq!("flare".parse::<Command>(), Ok(Command::Flare));
        assert_eq!("ping".parse::<Command>(), Ok(Command::Ping));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!("move 1".parse::<Command>(), Err(CommandError::Usage(MOVE_USAGE)));
        assert_eq!("move 1 1 fly".parse::<Command>(), Err(CommandError::Usage(MOVE_USAGE)));
        assert_eq!("study x 10".parse::<Command>(), Err(CommandError::Usage(STUDY_USAGE)));
    }
}
