//! Mode specifications
//!
//! A mode is either an absolute octal value (`775`) or a symbolic chmod
//! expression (`g+rwX`, `u=rwx,g=rx,o=`). Both are applied per entry by the
//! walk strategy and passed verbatim to `chmod -R` by the shell strategy.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

const USER_BITS: u32 = 0o700;
const GROUP_BITS: u32 = 0o070;
const OTHER_BITS: u32 = 0o007;
const ALL_BITS: u32 = USER_BITS | GROUP_BITS | OTHER_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Remove,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Perms {
    read: bool,
    write: bool,
    exec: bool,
    /// `X`: execute only for directories or already-executable files
    exec_if_any: bool,
}

impl Perms {
    fn template(&self, has_exec: bool) -> u32 {
        let mut bits = 0;
        if self.read {
            bits |= 0o444;
        }
        if self.write {
            bits |= 0o222;
        }
        if self.exec || (self.exec_if_any && has_exec) {
            bits |= 0o111;
        }
        bits
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    who: u32,
    actions: Vec<(Op, Perms)>,
}

/// Permission bits to apply to every entry under a repaired path
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ModeSpec {
    Octal(u32),
    Symbolic { text: String, clauses: Vec<Clause> },
}

impl ModeSpec {
    /// Compute the permission bits an entry ends up with.
    pub fn apply(&self, current: u32, is_dir: bool) -> u32 {
        match self {
            ModeSpec::Octal(bits) => *bits,
            ModeSpec::Symbolic { clauses, .. } => {
                let mut mode = current & 0o7777;
                for clause in clauses {
                    for (op, perms) in &clause.actions {
                        let has_exec = is_dir || mode & 0o111 != 0;
                        let bits = perms.template(has_exec) & clause.who;
                        mode = match op {
                            Op::Add => mode | bits,
                            Op::Remove => mode & !bits,
                            Op::Set => (mode & !clause.who) | bits,
                        };
                    }
                }
                mode
            }
        }
    }
}

impl fmt::Display for ModeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSpec::Octal(bits) => write!(f, "{:o}", bits),
            ModeSpec::Symbolic { text, .. } => f.write_str(text),
        }
    }
}

impl Default for ModeSpec {
    fn default() -> Self {
        ModeSpec::Octal(0o775)
    }
}

impl FromStr for ModeSpec {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);

        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if digits.len() > 4 || digits.chars().any(|c| c > '7') {
                return Err(ConfigurationError::InvalidMode(s.to_string()));
            }
            return u32::from_str_radix(digits, 8)
                .map(ModeSpec::Octal)
                .map_err(|_| ConfigurationError::InvalidMode(s.to_string()));
        }

        let clauses = trimmed
            .split(',')
            .map(|clause| {
                parse_clause(clause).ok_or_else(|| ConfigurationError::InvalidMode(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModeSpec::Symbolic {
            text: trimmed.to_string(),
            clauses,
        })
    }
}

impl TryFrom<String> for ModeSpec {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn parse_clause(clause: &str) -> Option<Clause> {
    let mut chars = clause.chars().peekable();

    let mut who = 0;
    while let Some(&c) = chars.peek() {
        match c {
            'u' => who |= USER_BITS,
            'g' => who |= GROUP_BITS,
            'o' => who |= OTHER_BITS,
            'a' => who |= ALL_BITS,
            _ => break,
        }
        chars.next();
    }
    if who == 0 {
        who = ALL_BITS;
    }

    let mut actions = Vec::new();
    while let Some(c) = chars.next() {
        let op = match c {
            '+' => Op::Add,
            '-' => Op::Remove,
            '=' => Op::Set,
            _ => return None,
        };
        let mut perms = Perms::default();
        while let Some(&p) = chars.peek() {
            match p {
                'r' => perms.read = true,
                'w' => perms.write = true,
                'x' => perms.exec = true,
                'X' => perms.exec_if_any = true,
                '+' | '-' | '=' => break,
                _ => return None,
            }
            chars.next();
        }
        actions.push((op, perms));
    }

    if actions.is_empty() {
        return None;
    }
    Some(Clause { who, actions })
}
