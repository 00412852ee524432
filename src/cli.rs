// Argument handling for the gitstats binary.
// Kept apart from `main` so the cache and output streams can be swapped in tests.

use std::io::Write;
use std::process::ExitCode;

use gitstats::{Result, StatsCache};

pub const USAGE: &str =
    "usage: gitstats [--invalidate] <owner/name | https://github.com/owner/name>...";

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NothingResolved,
    Usage,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::NothingResolved => 1,
            Outcome::Usage => 2,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Run one invocation. `build` is only called once the arguments are valid.
pub async fn run<F, O, E>(
    mut args: Vec<String>,
    build: F,
    out: &mut O,
    err: &mut E,
) -> Result<Outcome>
where
    F: FnOnce() -> Result<StatsCache>,
    O: Write,
    E: Write,
{
    if args.iter().any(|a| a == "-h" || a == "--help") {
        writeln!(out, "{}", USAGE)?;
        return Ok(Outcome::Success);
    }

    let invalidate = take_flag(&mut args, "--invalidate");
    if args.is_empty() {
        writeln!(err, "{}", USAGE)?;
        return Ok(Outcome::Usage);
    }

    let cache = build()?;

    if invalidate {
        for arg in &args {
            if !cache.invalidate(arg)? {
                writeln!(err, "not a repository reference: {:?}", arg)?;
            }
        }
        return Ok(Outcome::Success);
    }

    // One session for the whole invocation so the refresh cap bounds latency.
    let mut session = cache.session();
    let mut resolved = 0;
    for arg in &args {
        match session.fetch(arg).await? {
            Some(stats) => {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                resolved += 1;
            }
            None => writeln!(err, "no statistics available for {:?}", arg)?,
        }
    }

    Ok(if resolved > 0 {
        Outcome::Success
    } else {
        Outcome::NothingResolved
    })
}

/// Remove every occurrence of `flag`, returning whether it was present.
pub fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != flag);
    args.len() != before
}
