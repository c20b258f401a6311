use std::str::FromStr;

use anyhow::{Context, bail};
use sweep_core::{Coord, Coord2};

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command");
        };

        let command = match verb {
            "r" | "reveal" => Self::Reveal(parse_coords(&mut words)?),
            "f" | "flag" => Self::Flag(parse_coords(&mut words)?),
            "n" | "new" => Self::NewGame,
            "q" | "quit" => Self::Quit,
            other => bail!("Unknown command {other:?}, expected r X Y, f X Y, n or q"),
        };

        if let Some(extra) = words.next() {
            bail!("Unexpected argument {extra:?}");
        }
        Ok(command)
    }
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let mut next = |axis: &str| -> anyhow::Result<Coord> {
        let word = words.next().with_context(|| format!("Missing {axis} coordinate"))?;
        word.parse()
            .with_context(|| format!("Invalid {axis} coordinate {word:?}"))
    };
    Ok((next("x")?, next("y")?))
}
