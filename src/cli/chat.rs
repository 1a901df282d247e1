//! Interactive chat loop for `fomo chat`.
//!
//! Reads lines from stdin and socket notices concurrently. Plain lines are
//! sent as chat messages; lines starting with `/` are client commands.

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::chat::ChatClient;
use crate::models::Usage;
use crate::traits::Connector;
use crate::websocket::{CloseDecision, InboundEvent, SessionEndReason, SocketNotice};

pub const REPL_HELP: &str = "\
/session [agent]     start a session
/approve <id> [note] approve a pending action
/deny <id> [note]    deny a pending action
/usage               show token and cost totals
/clear               forget the conversation and event log
/reconnect           reconnect with a fresh retry budget
/quit                leave";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    Session { agent_id: Option<String> },
    Approve { approval_id: String, note: Option<String> },
    Deny { approval_id: String, note: Option<String> },
    Usage,
    Clear,
    Reconnect,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse a line typed at the prompt.
pub fn parse_repl_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Message(line.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match name {
        "session" => ReplCommand::Session {
            agent_id: arg.map(str::to_string),
        },
        "approve" | "deny" => {
            let Some(arg) = arg else {
                return ReplCommand::Unknown(format!("/{} needs an approval id", name));
            };
            let mut words = arg.splitn(2, char::is_whitespace);
            let approval_id = words.next().unwrap_or_default().to_string();
            let note = words
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            if name == "approve" {
                ReplCommand::Approve { approval_id, note }
            } else {
                ReplCommand::Deny { approval_id, note }
            }
        }
        "usage" => ReplCommand::Usage,
        "clear" => ReplCommand::Clear,
        "reconnect" => ReplCommand::Reconnect,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(format!("unknown command /{}", other)),
    }
}

pub fn format_usage(usage: &Usage) -> String {
    format!(
        "{} in / {} out tokens, ${:.4}",
        usage.input_tokens, usage.output_tokens, usage.cost_usd
    )
}

/// Text to print for a socket notice, if any.
///
/// Content deltas are returned bare so they can be printed without a newline.
pub fn describe_notice(notice: &SocketNotice) -> Option<String> {
    match notice {
        SocketNotice::Opened => None,
        SocketNotice::Reconnected => Some("[reconnected]".to_string()),
        SocketNotice::Reconnecting { attempt } => {
            Some(format!("[reconnecting, attempt {}]", attempt))
        }
        SocketNotice::Error(message) => Some(format!("[socket error: {}]", message)),
        SocketNotice::Closed { decision, .. } => match decision {
            CloseDecision::Scheduled { .. } => Some("[connection lost]".to_string()),
            CloseDecision::Exhausted => Some("[connection lost, giving up]".to_string()),
            CloseDecision::CleanClose | CloseDecision::Disabled => {
                Some("[disconnected]".to_string())
            }
        },
        SocketNotice::Event(event) => match event {
            InboundEvent::AuthSuccess => Some("[connected]".to_string()),
            InboundEvent::SessionCreated(e) => Some(format!("[session {}]", e.session_id)),
            InboundEvent::ContentDelta(d) => Some(d.text.clone()),
            InboundEvent::ToolStart(t) => Some(format!("\n[tool {} started]", t.tool)),
            InboundEvent::ToolComplete(t) => Some(format!(
                "[tool {} {}]",
                t.tool_call_id,
                if t.success { "ok" } else { "failed" }
            )),
            InboundEvent::ApprovalRequired(a) => Some(format!(
                "\n[approval {} needed for {}: {}]",
                a.approval_id, a.tool, a.action
            )),
            InboundEvent::MessageComplete(m) => Some(format!("\n[{}]", format_usage(&m.usage))),
            InboundEvent::CostAlert(c) => Some(format!(
                "[cost alert: ${:.2} of ${:.2} ({:.0}%)]",
                c.current_spend, c.budget, c.percent
            )),
            InboundEvent::SessionEnded(e) => Some(format!(
                "[session {} ended: {}]",
                e.session_id,
                match e.reason {
                    SessionEndReason::Completed => "completed",
                    SessionEndReason::Error => "error",
                    SessionEndReason::Timeout => "timeout",
                    SessionEndReason::Terminated => "terminated",
                }
            )),
            InboundEvent::Error(e) => Some(format!("[server error {}: {}]", e.code, e.message)),
        },
    }
}

fn print_notice(notice: &SocketNotice) {
    use std::io::Write;

    match (notice, describe_notice(notice)) {
        (SocketNotice::Event(InboundEvent::ContentDelta(_)), Some(text)) => {
            print!("{}", text);
            let _ = std::io::stdout().flush();
        }
        (_, Some(text)) => println!("{}", text),
        (_, None) => {}
    }
}

/// Decides when the REPL should ask for a new session: whenever the client
/// is connected without one and no request is outstanding.
#[derive(Debug, Default)]
struct SessionGate {
    in_flight: bool,
}

impl SessionGate {
    fn should_request(&self, connected: bool, has_session: bool) -> bool {
        connected && !has_session && !self.in_flight
    }

    fn requested(&mut self) {
        self.in_flight = true;
    }

    /// A created session answers the request; a lost connection voids it.
    fn observe(&mut self, notice: &SocketNotice) {
        match notice {
            SocketNotice::Event(InboundEvent::SessionCreated(_))
            | SocketNotice::Closed { .. } => self.in_flight = false,
            _ => {}
        }
    }

    fn poll<C: Connector>(&mut self, client: &ChatClient<C>, agent_id: &Option<String>) {
        if self.should_request(
            client.connection_state().is_connected(),
            client.session_id().is_some(),
        ) {
            debug!("Requesting a new session");
            client.create_session(agent_id.clone(), None);
            self.requested();
        }
    }
}

/// Apply a parsed line. Returns `false` when the user asked to quit.
fn handle_command<C: Connector>(client: &mut ChatClient<C>, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Message(text) => client.send(text),
        ReplCommand::Session { agent_id } => client.create_session(agent_id, None),
        ReplCommand::Approve { approval_id, note } => client.approve(approval_id, note),
        ReplCommand::Deny { approval_id, note } => client.deny(approval_id, note),
        ReplCommand::Usage => println!("{}", format_usage(&client.usage())),
        ReplCommand::Clear => {
            client.clear_chat();
            client.clear_events();
            println!("[cleared]");
        }
        ReplCommand::Reconnect => client.reconnect(),
        ReplCommand::Help => println!("{}", REPL_HELP),
        ReplCommand::Unknown(message) => println!("{}", message),
        ReplCommand::Empty => {}
        ReplCommand::Quit => return false,
    }
    true
}

/// Run the chat loop until `/quit`, end of input, or the socket gives up.
pub async fn run_chat<C: Connector>(
    mut client: ChatClient<C>,
    agent_id: Option<String>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sessions = SessionGate::default();
    let mut socket_live = true;

    client.connect();
    println!("Type a message, or /help for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let command = parse_repl_command(&line);
                        if command == ReplCommand::Reconnect {
                            socket_live = true;
                        }
                        if !handle_command(&mut client, command) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            notice = client.next_update(), if socket_live => {
                match notice {
                    Some(notice) => {
                        sessions.observe(&notice);
                        print_notice(&notice);
                    }
                    None => {
                        debug!("Socket idle; waiting for /reconnect");
                        socket_live = false;
                    }
                }
            }
        }
        sessions.poll(&client, &agent_id);
    }

    client.disconnect();
    Ok(())
}
