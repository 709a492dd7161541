use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{BlazerError, Result};

#[derive(Parser)]
#[command(name = "blazer")]
#[command(version)]
#[command(about = "Taiko Trailblazer points automation for a batch of wallets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml, then $BLAZER_ENV.toml)
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wrap and unwrap ETH until a daily points target is met
    Wrap {
        /// Wallets to use: all, 3, 1,2,5 or 2-4
        #[arg(short, long, default_value = "all")]
        wallets: String,
    },
    /// Vote on Rubyscore until the daily gas target is met
    Vote {
        #[arg(short, long, default_value = "all")]
        wallets: String,
    },
    /// Print wallet statistics and save the daily snapshot
    Check {
        #[arg(short, long, default_value = "all")]
        wallets: String,
    },
}

/// Interactive menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Wrap,
    Rubyscore,
    Checker,
    Reselect,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 5] = [
        MenuChoice::Wrap,
        MenuChoice::Rubyscore,
        MenuChoice::Checker,
        MenuChoice::Reselect,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::Wrap => "💼 Wrap-Unwrap",
            MenuChoice::Rubyscore => "💻 Rubyscore",
            MenuChoice::Checker => "📊 Checker",
            MenuChoice::Reselect => "🔙 Go back to wallet selection",
            MenuChoice::Exit => "❌ Exit",
        }
    }

    /// Accepts the menu number or a keyword
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "wrap" => Some(MenuChoice::Wrap),
            "2" | "vote" | "rubyscore" => Some(MenuChoice::Rubyscore),
            "3" | "check" | "checker" => Some(MenuChoice::Checker),
            "4" | "back" => Some(MenuChoice::Reselect),
            "5" | "exit" | "quit" | "q" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub const SELECTION_HELP: &str = "Select accounts to work with. Format:\n\
    1 - to select only the first wallet\n\
    1,2,3 - to select the first, second, and third wallets\n\
    1-3 - to select wallets from the first to the third inclusive\n\
    all - to select all wallets (or press Enter)\n";

/// Parse a wallet selection into 1-based indices.
///
/// Accepts `all` (or nothing), a single index, a comma list, or an
/// inclusive `a-b` range. Indices must lie in `1..=total`.
pub fn parse_wallet_selection(input: &str, total: usize) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Ok((1..=total).collect());
    }

    let parse_index = |raw: &str| -> Result<usize> {
        let index: usize = raw
            .trim()
            .parse()
            .map_err(|_| BlazerError::Selection(format!("'{}' is not a wallet number", raw.trim())))?;
        if index == 0 || index > total {
            return Err(BlazerError::Selection(format!(
                "wallet {} is out of range 1-{}",
                index, total
            )));
        }
        Ok(index)
    };

    if input.contains(',') {
        let mut indices = Vec::new();
        for part in input.split(',') {
            let index = parse_index(part)?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        return Ok(indices);
    }

    if let Some((first, last)) = input.split_once('-') {
        let first = parse_index(first)?;
        let last = parse_index(last)?;
        if first > last {
            return Err(BlazerError::Selection(format!(
                "range {}-{} is inverted",
                first, last
            )));
        }
        return Ok((first..=last).collect());
    }

    Ok(vec![parse_index(input)?])
}

/// Line-editor prompts for the interactive loop
pub struct Prompt {
    editor: DefaultEditor,
}

impl Prompt {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| BlazerError::Internal(format!("failed to open terminal: {}", e)))?;
        Ok(Self { editor })
    }

    /// `Ok(None)` when the user pressed Ctrl-C or Ctrl-D
    fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(BlazerError::Internal(format!("terminal read failed: {}", e))),
        }
    }

    /// Ask which wallets to use; a single wallet is selected without asking
    pub fn select_wallets(&mut self, total: usize) -> Result<Option<Vec<usize>>> {
        if total == 1 {
            return Ok(Some(vec![1]));
        }
        println!("{}", SELECTION_HELP);
        match self.read("Enter your choice: ")? {
            Some(line) => parse_wallet_selection(&line, total).map(Some),
            None => Ok(None),
        }
    }

    pub fn select_module(&mut self) -> Result<Option<MenuChoice>> {
        println!();
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            println!("  {}. {}", i + 1, choice.label());
        }

        loop {
            let Some(line) = self.read("\n❓ Select module: ")? else {
                return Ok(None);
            };
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => println!("Unknown choice '{}', enter 1-5", line.trim()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_and_empty_select_everything() {
        assert_eq!(parse_wallet_selection("all", 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_wallet_selection("", 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_wallet_selection("  ALL ", 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_single_list_and_range() {
        assert_eq!(parse_wallet_selection("2", 5).unwrap(), vec![2]);
        assert_eq!(parse_wallet_selection("1, 3,5", 5).unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_wallet_selection("2-4", 5).unwrap(), vec![2, 3, 4]);
        assert_eq!(parse_wallet_selection("3-3", 5).unwrap(), vec![3]);
    }

    #[test]
    fn test_list_drops_duplicates() {
        assert_eq!(parse_wallet_selection("2,2,1", 3).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_invalid_selections_are_errors() {
        for input in ["0", "6", "abc", "1,x", "4-2", "1-9", "-", "1,,2"] {
            let err = parse_wallet_selection(input, 5).unwrap_err();
            assert!(matches!(err, BlazerError::Selection(_)), "{} accepted", input);
        }
    }

    #[test]
    fn test_menu_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Wrap));
        assert_eq!(MenuChoice::parse(" vote "), Some(MenuChoice::Rubyscore));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::Checker));
        assert_eq!(MenuChoice::parse("back"), Some(MenuChoice::Reselect));
        assert_eq!(MenuChoice::parse("q"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("9"), None);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["blazer", "vote", "--wallets", "1-2"]).unwrap();
        match cli.command {
            Some(Commands::Vote { wallets }) => assert_eq!(wallets, "1-2"),
            _ => panic!("expected vote"),
        }

        let cli = Cli::try_parse_from(["blazer"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "config");
    }
}
