/// One line of the interactive prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Put { key: String, value: String },
    Get { key: String },
    Exit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Command::Empty,
        ["put", key, value] => Command::Put {
            key: key.to_string(),
            value: value.to_string(),
        },
        ["get", key] => Command::Get {
            key: key.to_string(),
        },
        ["exit"] => Command::Exit,
        _ => Command::Invalid(line.trim().to_string()),
    }
}
