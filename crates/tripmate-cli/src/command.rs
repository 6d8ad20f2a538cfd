use crate::error::CliError;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    List,
    New(String),
    Open(String),
    Delete(String),
    Clear,
    Tools,
    Help,
    Quit,
    Chat(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CliError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Chat(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "login" => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(username), Some(password), None) => Ok(Command::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    }),
                    _ => Err(CliError::Usage("/login <username> <password>")),
                }
            }
            "logout" => Ok(Command::Logout),
            "list" => Ok(Command::List),
            "new" => {
                let title = if args.is_empty() { "New conversation" } else { args };
                Ok(Command::New(title.to_string()))
            }
            "open" => required(args, "/open <conversation-id>").map(Command::Open),
            "delete" => required(args, "/delete <conversation-id>").map(Command::Delete),
            "clear" => Ok(Command::Clear),
            "tools" => Ok(Command::Tools),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CliError::UnknownCommand(format!("/{}", other))),
        }
    }
}

fn required(args: &str, usage: &'static str) -> Result<String, CliError> {
    if args.is_empty() {
        Err(CliError::Usage(usage))
    } else {
        Ok(args.to_string())
    }
}

pub const HELP: &str = "\
/login <user> <password>  sign in
/logout                   sign out
/list                     list conversations
/new [title]              start a conversation
/open <id>                open a conversation
/delete <id>              delete a conversation
/clear                    clear the current conversation
/tools                    show tool activity
/quit                     exit
anything else is sent as a message";
