use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{CoreResult, IndexOutOfRangeSnafu};

define_wire_enum! {
    /// Author of a turn, from the user's point of view.
    Role, "role" {
        User => "user",
        Partner => "partner",
        Other => "other",
    }
}

impl Role {
    /// Label shown next to a turn and used in the `You: ...` paste format.
    pub fn display_label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Partner => "Partner",
            Role::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered dialog turns, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatTurn> {
        self.turns.iter()
    }

    /// Appends a turn with trimmed text. Whitespace-only text is ignored and
    /// `false` is returned.
    pub fn add_turn(&mut self, role: Role, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.turns.push(ChatTurn::new(role, trimmed));
        true
    }

    pub fn remove_turn(&mut self, index: usize) -> CoreResult<ChatTurn> {
        ensure!(
            index < self.turns.len(),
            IndexOutOfRangeSnafu {
                stage: "remove-turn",
                index,
                len: self.turns.len(),
            }
        );
        Ok(self.turns.remove(index))
    }

    /// Swaps the turn with its predecessor. No-op on the first turn or an invalid index.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.turns.len() {
            return false;
        }

        self.turns.swap(index - 1, index);
        true
    }

    /// Swaps the turn with its successor. No-op on the last turn or an invalid index.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.turns.len().saturating_sub(1) {
            return false;
        }

        self.turns.swap(index, index + 1);
        true
    }

    /// Replaces every turn, as a paste does.
    pub fn replace_with(&mut self, turns: Vec<ChatTurn>) {
        self.turns = turns;
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn into_turns(self) -> Vec<ChatTurn> {
        self.turns
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatTurn;
    type IntoIter = std::slice::Iter<'a, ChatTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

const USER_PREFIX: &str = "you:";
const PARTNER_PREFIX: &str = "partner:";

/// Turns a pasted block of dialog into role-tagged turns.
///
/// Blank lines are dropped. `You:` and `Partner:` prefixes (any case) assign the role
/// and are stripped together with surrounding whitespace; a prefixed line with nothing
/// after it still yields an empty turn. Unprefixed lines keep their text as-is and
/// alternate partner/user by their position among the kept lines, starting with partner.
///
/// Never fails: the result always has one turn per non-blank line.
pub fn parse_dialog(raw: &str) -> Vec<ChatTurn> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            if let Some(rest) = strip_prefix_ignore_ascii_case(line, USER_PREFIX) {
                ChatTurn::new(Role::User, rest.trim())
            } else if let Some(rest) = strip_prefix_ignore_ascii_case(line, PARTNER_PREFIX) {
                ChatTurn::new(Role::Partner, rest.trim())
            } else {
                let role = if index % 2 == 0 {
                    Role::Partner
                } else {
                    Role::User
                };
                ChatTurn::new(role, line)
            }
        })
        .collect()
}

/// Renders turns back into the `You: ...` / `Partner: ...` line format.
pub fn format_dialog<'a>(turns: impl IntoIterator<Item = &'a ChatTurn>) -> String {
    turns
        .into_iter()
        .map(|turn| format!("{}: {}", turn.role.display_label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_prefix_ignore_ascii_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}
