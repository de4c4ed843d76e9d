//! Command-line argument handling.

use anyhow::{bail, Result};

pub const USAGE: &str = "\
Usage: pws <command>

Commands:
  login [username]   Sign in (password from PWS_PASSWORD or prompt)
  logout             Sign out and forget the session
  status             Show who is signed in
  submissions        Load your submissions
  help               Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Logout,
    Status,
    Submissions,
    Help,
}

impl Command {
    /// Parse the arguments following the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let command = match args.first().map(String::as_str) {
            None | Some("status") => Command::Status,
            Some("login") => {
                if args.len() > 2 {
                    bail!("login takes at most one argument\n\n{}", USAGE);
                }
                Command::Login {
                    username: args.get(1).cloned(),
                }
            }
            Some("logout") => Command::Logout,
            Some("submissions") => Command::Submissions,
            Some("help" | "-h" | "--help") => Command::Help,
            Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
        };

        if !matches!(command, Command::Login { .. }) && args.len() > 1 {
            bail!("Unexpected argument '{}'\n\n{}", args[1], USAGE);
        }
        Ok(command)
    }
}
