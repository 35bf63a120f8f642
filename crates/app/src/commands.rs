use fdd_copilot_core::QuestionCategory;

pub const HELP: &str = "\
:category <name>  load a hypothesis (revenue, expenses, profit-metrics, assets, gaps)
:pick <n>         choose predefined question n
:ask              submit the chosen predefined question
:copy <n>         copy follow-up question n to the clipboard
:history          show the conversation so far
:help             show this help
:quit             leave
anything else is sent as a custom question";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Category(QuestionCategory),
    Pick(usize),
    Ask,
    Copy(usize),
    History,
    Help,
    Quit,
    Question(String),
    Empty,
    Invalid(String),
}

/// Interprets one line of chat input. Positions are 1-based as typed and
/// returned 0-based.
pub fn parse_line(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }

    let Some(command) = line.strip_prefix(':') else {
        return ChatCommand::Question(line.to_string());
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };

    match name {
        "category" | "c" => match argument.parse::<QuestionCategory>() {
            Ok(category) => ChatCommand::Category(category),
            Err(error) => ChatCommand::Invalid(error.to_string()),
        },
        "pick" | "p" => position(argument).map_or_else(ChatCommand::Invalid, ChatCommand::Pick),
        "copy" => position(argument).map_or_else(ChatCommand::Invalid, ChatCommand::Copy),
        "ask" | "a" => ChatCommand::Ask,
        "history" | "h" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "q" | "exit" => ChatCommand::Quit,
        other => ChatCommand::Invalid(format!("unknown command :{other}")),
    }
}

fn position(argument: &str) -> Result<usize, String> {
    argument
        .parse::<usize>()
        .ok()
        .and_then(zero_based)
        .ok_or_else(|| format!("expected a number starting at 1, got {argument:?}"))
}

/// Converts a typed 1-based number to a position; 0 has none.
pub fn zero_based(number: usize) -> Option<usize> {
    number.checked_sub(1)
}
