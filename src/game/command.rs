//! Command parsing

/// Every command the shell knows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Ls,
    Cat,
    Run,
    Connect,
    Help,
    Clear,
    Reset,
    Decode,
    Scan,
    Matrix,
    Coffee,
    Echo,
    Hack,
    Dance,
    Time,
    /// Anything else, keeps the token as typed (lowercased)
    Unknown(String),
}

impl Command {
    /// Names in completion order
    pub const NAMES: [&'static str; 16] = [
        "login", "ls", "cat", "run", "connect", "help", "clear", "reset", "decode", "scan",
        "matrix", "coffee", "echo", "hack", "dance", "time",
    ];

    /// Resolve a lowercased command token
    pub fn parse(token: &str) -> Self {
        match token {
            "login" => Command::Login,
            "ls" => Command::Ls,
            "cat" => Command::Cat,
            "run" => Command::Run,
            "connect" => Command::Connect,
            "help" => Command::Help,
            "clear" => Command::Clear,
            "reset" => Command::Reset,
            "decode" => Command::Decode,
            "scan" => Command::Scan,
            "matrix" => Command::Matrix,
            "coffee" => Command::Coffee,
            "echo" => Command::Echo,
            "hack" => Command::Hack,
            "dance" => Command::Dance,
            "time" => Command::Time,
            other => Command::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Login => "login",
            Command::Ls => "ls",
            Command::Cat => "cat",
            Command::Run => "run",
            Command::Connect => "connect",
            Command::Help => "help",
            Command::Clear => "clear",
            Command::Reset => "reset",
            Command::Decode => "decode",
            Command::Scan => "scan",
            Command::Matrix => "matrix",
            Command::Coffee => "coffee",
            Command::Echo => "echo",
            Command::Hack => "hack",
            Command::Dance => "dance",
            Command::Time => "time",
            Command::Unknown(token) => token,
        }
    }

    /// Commands that answer with access denied before login
    pub fn requires_login(&self) -> bool {
        !matches!(
            self,
            Command::Login | Command::Help | Command::Clear | Command::Reset | Command::Unknown(_)
        )
    }
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    /// Arguments with their original case
    pub args: Vec<String>,
}

impl Invocation {
    /// All arguments joined by single spaces
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }

    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Split a raw line into command and arguments. None for blank input.
pub fn tokenize(raw: &str) -> Option<Invocation> {
    let mut tokens = raw.split_whitespace();
    let command = Command::parse(&tokens.next()?.to_lowercase());
    let args = tokens.map(str::to_string).collect();
    Some(Invocation { command, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_command_only() {
        let inv = tokenize("  DECODE  c3ViamVjdF96ZXJv  ").unwrap();
        assert_eq!(inv.command, Command::Decode);
        assert_eq!(inv.args, vec!["c3ViamVjdF96ZXJv"]);
    }

    #[test]
    fn test_blank_input_has_no_invocation() {
        assert!(tokenize("").is_none());
        assert!(tokenize("   \t ").is_none());
    }

    #[test]
    fn test_unknown_keeps_token() {
        let inv = tokenize("Sudo rm").unwrap();
        assert_eq!(inv.command, Command::Unknown("sudo".into()));
        assert_eq!(inv.command.name(), "sudo");
    }

    #[test]
    fn test_every_name_parses_to_itself() {
        for name in Command::NAMES {
            let command = Command::parse(name);
            assert!(!matches!(command, Command::Unknown(_)), "{}", name);
            assert_eq!(command.name(), name);
        }
    }

    #[test]
    fn test_joined_args_collapse_whitespace() {
        let inv = tokenize("echo hello    world").unwrap();
        assert_eq!(inv.joined_args(), "hello world");
    }
}
