/// A parsed REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Page(i64),
    Next,
    Prev,
    Sort(String),
    Search { column: String, text: String },
    Clear(String),
    Query(Option<String>),
    Show,
    Columns,
    Logs(usize),
    Export(String),
    Help,
    Quit,
}

impl Command {
    /// Parse one line; the error is a usage message for the user
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "page" => rest
                .parse::<i64>()
                .map(Command::Page)
                .map_err(|_| "Usage: page <number>".to_string()),
            "next" | "n" => Ok(Command::Next),
            "prev" | "p" => Ok(Command::Prev),
            "sort" if !rest.is_empty() => Ok(Command::Sort(rest.to_string())),
            "sort" => Err("Usage: sort <column>".to_string()),
            "search" => match rest.split_once(char::is_whitespace) {
                Some((column, text)) => Ok(Command::Search {
                    column: column.to_string(),
                    text: text.trim().to_string(),
                }),
                None if !rest.is_empty() => Ok(Command::Search {
                    column: rest.to_string(),
                    text: String::new(),
                }),
                None => Err("Usage: search <column> <text>".to_string()),
            },
            "clear" if !rest.is_empty() => Ok(Command::Clear(rest.to_string())),
            "clear" => Err("Usage: clear <column>".to_string()),
            "query" if rest.is_empty() => Ok(Command::Query(None)),
            "query" => Ok(Command::Query(Some(rest.to_string()))),
            "show" => Ok(Command::Show),
            "columns" => Ok(Command::Columns),
            "\\logs" => {
                if rest.is_empty() {
                    Ok(Command::Logs(20))
                } else {
                    rest.parse::<usize>()
                        .map(Command::Logs)
                        .map_err(|_| "Usage: \\logs [count]".to_string())
                }
            }
            "\\export" if !rest.is_empty() => Ok(Command::Export(rest.to_string())),
            "\\export" => Err("Usage: \\export <filename>".to_string()),
            "\\help" | "help" => Ok(Command::Help),
            "\\quit" | "\\q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}'. Type \\help for commands.", other)),
        }
    }
}
