//! Command-line argument parsing for the fomo CLI.

/// Options for `fomo chat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    pub project_id: String,
    pub agent_id: Option<String>,
    /// Use the offline echo server
    pub mock: bool,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Store an API key; prompts when none is given
    Login { api_key: Option<String> },
    /// Remove the stored API key
    Logout,
    /// Interactive chat session
    Chat(ChatArgs),
    /// List pending approvals over REST
    Approvals { project_id: Option<String> },
    /// Unusable arguments, with the reason
    Invalid(String),
}

pub const USAGE: &str = "\
Usage: fomo <command> [options]

Commands:
  chat --project <id> [--agent <id>] [--mock]   Chat with an agent
  approvals [--project <id>]                    List pending approvals
  login [--api-key <key>]                       Store your API key
  logout                                        Forget your API key
  help                                          Show this help
  --version, -V                                 Show version";

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use fomo::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["fomo".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);
    let Some(command) = args.next() else {
        return CliCommand::Help;
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "--version" | "-V" | "version" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "logout" => CliCommand::Logout,
        "login" => match Options::parse(&rest, &["--api-key"], &[]) {
            Ok(opts) => CliCommand::Login {
                api_key: opts.value("--api-key"),
            },
            Err(e) => CliCommand::Invalid(e),
        },
        "approvals" => match Options::parse(&rest, &["--project", "-p"], &[]) {
            Ok(opts) => CliCommand::Approvals {
                project_id: opts.value("--project").or_else(|| opts.value("-p")),
            },
            Err(e) => CliCommand::Invalid(e),
        },
        "chat" => match Options::parse(&rest, &["--project", "-p", "--agent", "-a"], &["--mock"]) {
            Ok(opts) => match opts.value("--project").or_else(|| opts.value("-p")) {
                Some(project_id) => CliCommand::Chat(ChatArgs {
                    project_id,
                    agent_id: opts.value("--agent").or_else(|| opts.value("-a")),
                    mock: opts.flag("--mock"),
                }),
                None => CliCommand::Invalid("chat requires --project <id>".to_string()),
            },
            Err(e) => CliCommand::Invalid(e),
        },
        other => CliCommand::Invalid(format!("unknown command '{}'", other)),
    }
}

/// Flat `--name value` / `--name=value` / `--flag` option list.
struct Options {
    values: Vec<(String, String)>,
    flags: Vec<String>,
}

impl Options {
    fn parse(args: &[String], valued: &[&str], flags: &[&str]) -> Result<Self, String> {
        let mut values = Vec::new();
        let mut set_flags = Vec::new();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            if let Some((name, value)) = arg.split_once('=') {
                if valued.contains(&name) {
                    values.push((name.to_string(), value.to_string()));
                    continue;
                }
            }
            if valued.contains(&arg.as_str()) {
                match iter.next() {
                    Some(value) => values.push((arg.clone(), value.clone())),
                    None => return Err(format!("{} requires a value", arg)),
                }
            } else if flags.contains(&arg.as_str()) {
                set_flags.push(arg.clone());
            } else {
                return Err(format!("unexpected argument '{}'", arg));
            }
        }

        Ok(Self {
            values,
            flags: set_flags,
        })
    }

    /// Last value given for `name`.
    fn value(&self, name: &str) -> Option<String> {
        self.values
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }
}
