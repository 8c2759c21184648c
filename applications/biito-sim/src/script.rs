//! Transport scripts
//!
//! Steps are written `name` or `name:arg`, e.g.
//! `load:t1 play wait:1500 seek:30 next pause`.

use anyhow::{anyhow, bail, Context};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One scripted transport step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Load a track by id
    Load(String),
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Seek to seconds
    Seek(f64),
    /// Seek to a fraction of the track
    Fraction(f64),
    Shuffle,
    Repeat,
    /// Process controller signals for a while
    Wait(Duration),
    Background,
    Foreground,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let require = || arg.ok_or_else(|| anyhow!("step '{name}' needs an argument"));

        let step = match name {
            "load" => Self::Load(require()?.to_string()),
            "play" => Self::Play,
            "pause" => Self::Pause,
            "toggle" => Self::Toggle,
            "next" => Self::Next,
            "previous" | "prev" => Self::Previous,
            "seek" => Self::Seek(
                require()?
                    .parse()
                    .with_context(|| format!("invalid seek position in '{s}'"))?,
            ),
            "fraction" => Self::Fraction(
                require()?
                    .parse()
                    .with_context(|| format!("invalid fraction in '{s}'"))?,
            ),
            "shuffle" => Self::Shuffle,
            "repeat" => Self::Repeat,
            "wait" => Self::Wait(Duration::from_millis(
                require()?
                    .parse()
                    .with_context(|| format!("invalid wait in '{s}'"))?,
            )),
            "background" => Self::Background,
            "foreground" => Self::Foreground,
            other => bail!("unknown step '{other}'"),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(id) => write!(f, "load:{id}"),
            Self::Play => write!(f, "play"),
            Self::Pause => write!(f, "pause"),
            Self::Toggle => write!(f, "toggle"),
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
            Self::Seek(secs) => write!(f, "seek:{secs}"),
            Self::Fraction(fraction) => write!(f, "fraction:{fraction}"),
            Self::Shuffle => write!(f, "shuffle"),
            Self::Repeat => write!(f, "repeat"),
            Self::Wait(d) => write!(f, "wait:{}", d.as_millis()),
            Self::Background => write!(f, "background"),
            Self::Foreground => write!(f, "foreground"),
        }
    }
}

/// Parse every step, failing on the first bad one
pub fn parse_steps<S: AsRef<str>>(steps: &[S]) -> anyhow::Result<Vec<Step>> {
    steps.iter().map(|s| s.as_ref().parse()).collect()
}
