//! Text console for a training session.
//!
//! One command per line on the input; each response is `= text` on success or
//! `? text` on failure, followed by a blank line. A numeric id before the
//! command is echoed after the `=`/`?`, as in GTP.
//!
//! ## Commands
//!
//! - `play <coord>` - Play a move (`pd`, `16,4`, `16 4`, or `tenuki`)
//! - `restart` - Return to the first branch point
//! - `reject` - The last mistake was not a mistake
//! - `board` - Show the board
//! - `candidates` - List the recorded continuations
//! - `mistakes` - Total mistakes over all sessions
//! - `comment` - Comment of the current node
//! - `status` - Session state, current node, learner color
//! - `list_commands`, `known_command <cmd>`, `name`, `version`, `quit`

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crate::board::Coordinate;
use crate::session::{MoveOutcome, Session, SessionState};

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "candidates",
    "comment",
    "known_command",
    "list_commands",
    "mistakes",
    "name",
    "play",
    "quit",
    "reject",
    "restart",
    "status",
    "version",
];

pub struct TutorConsole {
    session: Session,
    /// Pause before an automated reply is reported
    reply_delay: Duration,
}

impl TutorConsole {
    pub fn new(session: Session, reply_delay: Duration) -> Self {
        Self {
            session,
            reply_delay,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            let (success, message) = self.execute(&command, args);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn candidate_list(&self) -> String {
        let coords: Vec<String> = self
            .session
            .candidates()
            .coordinates()
            .map(|c| c.to_string())
            .collect();
        coords.join(" ")
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "joseki-tutor".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "play" => {
                if args.is_empty() {
                    return (false, "missing coordinate".to_string());
                }
                let size = self.session.board().size();
                let Some(coord) = Coordinate::parse_user(&args.join(" "), size) else {
                    return (false, format!("invalid coordinate '{}'", args.join(" ")));
                };
                self.play(coord)
            }

            "restart" => {
                self.session.restart();
                (true, format!("candidates: {}", self.candidate_list()))
            }

            "reject" => {
                if self.session.reject_last_mistake() {
                    (true, format!("total mistakes {}", self.session.total_mistakes()))
                } else {
                    (false, "no mistake to withdraw".to_string())
                }
            }

            "board" => (true, format!("\n{}", self.session.board())),

            "candidates" => (true, self.candidate_list()),

            "mistakes" => (true, self.session.total_mistakes().to_string()),

            "comment" => (true, self.session.comment().unwrap_or_default().to_string()),

            "status" => {
                let state = match self.session.state() {
                    SessionState::Playing => "playing",
                    SessionState::EndOfVariation => "end of variation",
                };
                (
                    true,
                    format!(
                        "{state}, node {}, learner {}",
                        self.session.current(),
                        self.session.learner()
                    ),
                )
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn play(&mut self, coord: Coordinate) -> (bool, String) {
        match self.session.human_move(coord) {
            MoveOutcome::Finished => (false, "end of variation, restart to play again".to_string()),
            MoveOutcome::Mistake {
                total_mistakes,
                candidates,
                ..
            } => {
                let expected: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                (
                    false,
                    format!(
                        "mistake (total {total_mistakes}); candidates: {}",
                        expected.join(" ")
                    ),
                )
            }
            MoveOutcome::Played {
                captured,
                reply,
                state,
            } => {
                let mut parts = Vec::new();
                if let Some((color, at)) = reply {
                    if !self.reply_delay.is_zero() {
                        thread::sleep(self.reply_delay);
                    }
                    parts.push(format!("{color} {at}"));
                }
                if !captured.is_empty() {
                    let taken: Vec<String> = captured.iter().map(|c| c.to_string()).collect();
                    parts.push(format!("captured {}", taken.join(" ")));
                }
                match state {
                    SessionState::EndOfVariation => parts.push("END OF VARIATION".to_string()),
                    SessionState::Playing => {
                        parts.push(format!("candidates: {}", self.candidate_list()))
                    }
                }
                if let Some(comment) = self.session.comment() {
                    parts.push(format!("comment: {comment}"));
                }
                (true, parts.join("; "))
            }
        }
    }
}
