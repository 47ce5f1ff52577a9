/*
 * @file commands.rs
 * @brief Keyword command table and matching logic
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Keyword dispatch table for spoken commands.
//!
//! Matching is substring containment over lowercased text, evaluated
//! against an ordered table. Precedence lives in the table itself rather
//! than in control flow, so it can be tested and extended in one place.

/// The action a spoken command maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Time,
    Date,
    Wikipedia,
    PlayMusic,
    OpenYoutube,
    OpenGoogle,
    Rename,
    Screenshot,
    Joke,
    Shutdown,
    Restart,
    Offline,
}

/// One entry of the dispatch table.
///
/// # Details
/// A rule fires when any of its trigger substrings appears in the
/// utterance. The utterance is expected to be lowercased already; capture
/// guarantees that.
#[derive(Debug)]
pub struct CommandRule {
    /// Trigger substrings that activate this command.
    pub triggers: &'static [&'static str],
    /// The action to dispatch.
    pub kind: CommandKind,
}

/// The ordered dispatch table.
///
/// Earlier entries win: exactly one handler fires per utterance even when
/// several triggers are present. The order is part of the assistant's
/// observable behavior, so reordering entries is a behavior change.
pub const COMMANDS: &[CommandRule] = &[
    CommandRule {
        triggers: &["time"],
        kind: CommandKind::Time,
    },
    CommandRule {
        triggers: &["date"],
        kind: CommandKind::Date,
    },
    CommandRule {
        triggers: &["wikipedia"],
        kind: CommandKind::Wikipedia,
    },
    CommandRule {
        triggers: &["play music"],
        kind: CommandKind::PlayMusic,
    },
    CommandRule {
        triggers: &["open youtube"],
        kind: CommandKind::OpenYoutube,
    },
    CommandRule {
        triggers: &["open google"],
        kind: CommandKind::OpenGoogle,
    },
    CommandRule {
        triggers: &["change your name"],
        kind: CommandKind::Rename,
    },
    CommandRule {
        triggers: &["screenshot"],
        kind: CommandKind::Screenshot,
    },
    CommandRule {
        triggers: &["tell me a joke"],
        kind: CommandKind::Joke,
    },
    CommandRule {
        triggers: &["shutdown"],
        kind: CommandKind::Shutdown,
    },
    CommandRule {
        triggers: &["restart"],
        kind: CommandKind::Restart,
    },
    CommandRule {
        triggers: &["offline", "exit"],
        kind: CommandKind::Offline,
    },
];

/// Finds the first rule whose trigger appears in the utterance.
///
/// # Arguments
/// * `text` - The lowercased utterance to match.
///
/// # Returns
/// * `Some(&CommandRule)` - The highest-precedence matching rule.
/// * `None` - No trigger matched; the caller treats this as a no-op.
pub fn match_command(text: &str) -> Option<&'static CommandRule> {
    COMMANDS
        .iter()
        .find(|rule| rule.triggers.iter().any(|trigger| text.contains(trigger)))
}

/// Removes a trigger keyword from an utterance to derive its argument.
///
/// # Details
/// Every occurrence of the keyword is removed, interior whitespace runs are
/// collapsed to single spaces, and the ends are trimmed. "what's the
/// wikipedia entry for rust" with keyword "wikipedia" therefore becomes
/// "what's the entry for rust".
///
/// # Arguments
/// * `text` - The full lowercased utterance.
/// * `trigger` - The keyword to strip.
///
/// # Returns
/// The remaining text; empty when the utterance was only the keyword.
pub fn strip_trigger(text: &str, trigger: &str) -> String {
    text.replace(trigger, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_rules_win_when_several_triggers_match() {
        let matched = match_command("what time is it according to wikipedia").unwrap();
        assert_eq!(matched.kind, CommandKind::Time);
    }

    #[test]
    fn each_vocabulary_word_routes_to_its_action() {
        let cases = [
            ("what is the date today", CommandKind::Date),
            ("wikipedia rust language", CommandKind::Wikipedia),
            ("please play music", CommandKind::PlayMusic),
            ("open youtube for me", CommandKind::OpenYoutube),
            ("open google", CommandKind::OpenGoogle),
            ("i want to change your name", CommandKind::Rename),
            ("take a screenshot", CommandKind::Screenshot),
            ("tell me a joke", CommandKind::Joke),
            ("shutdown the computer", CommandKind::Shutdown),
            ("restart the computer", CommandKind::Restart),
        ];
        for (utterance, expected) in cases {
            assert_eq!(match_command(utterance).unwrap().kind, expected);
        }
    }

    #[test]
    fn offline_and_exit_share_one_rule() {
        assert_eq!(match_command("go offline").unwrap().kind, CommandKind::Offline);
        assert_eq!(match_command("exit now").unwrap().kind, CommandKind::Offline);
    }

    #[test]
    fn unmatched_text_is_a_no_op() {
        assert!(match_command("hello there").is_none());
    }

    #[test]
    fn strip_trigger_derives_the_query() {
        assert_eq!(
            strip_trigger("what's the wikipedia entry for rust", "wikipedia"),
            "what's the entry for rust"
        );
    }

    #[test]
    fn strip_trigger_handles_song_fragments() {
        assert_eq!(strip_trigger("play music despacito", "play music"), "despacito");
        assert_eq!(strip_trigger("play music", "play music"), "");
    }
}
