//! Interactive command loop over a search session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use partscout_core::config::AppConfig;
use partscout_core::matcher::{MatchQuery, SearchOutcome, Similarity};
use partscout_core::session::{LoadResolution, SearchResolution, SearchSession, SessionState};
use partscout_core::ScoutError;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Load(PathBuf),
    Search(String),
    Image(PathBuf),
    Status,
    Reset,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "load" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
        "load" => return Err("usage: load <workbook path>".into()),
        "search" if !rest.is_empty() => Command::Search(rest.to_string()),
        "search" => return Err("usage: search <free-form text>".into()),
        "image" if !rest.is_empty() => Command::Image(PathBuf::from(rest)),
        "image" => return Err("usage: image <photo path>".into()),
        "status" => Command::Status,
        "reset" => Command::Reset,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

const HELP: &str = "\
Commands:
  load <path>      import a catalog workbook (column A codes, column B descriptions, no header row)
  search <text>    find matching part codes by description
  image <path>     find matching part codes by photo
  status           show session state and catalog size
  reset            discard the catalog and start over
  quit             leave the shell";

/// Run the shell until EOF or `quit`.
pub async fn run(session: Arc<SearchSession>) -> Result<()> {
    println!("{} - type 'help' for commands.", AppConfig::APP_NAME);
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        match command {
            Command::Load(path) => match session.load_catalog(&path).await {
                Ok(LoadResolution::Loaded(count)) => println!("Catalog loaded: {count} parts."),
                Ok(LoadResolution::Superseded) => println!("Import superseded by a reset."),
                Err(err) => print_error(&err),
            },
            Command::Search(text) => match MatchQuery::text(text) {
                Ok(query) => run_search(&session, query).await,
                Err(err) => print_error(&err),
            },
            Command::Image(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => match MatchQuery::image(bytes) {
                    Ok(query) => run_search(&session, query).await,
                    Err(err) => print_error(&err),
                },
                Err(err) => println!("Could not read {}: {err}", path.display()),
            },
            Command::Status => print_status(&session),
            Command::Reset => {
                session.reset();
                println!("Session reset. Import a catalog to begin again.");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

async fn run_search(session: &SearchSession, query: MatchQuery) {
    println!("Searching...");
    match session.search(query).await {
        Ok(SearchResolution::Completed(outcome)) => print_outcome(&outcome),
        Ok(SearchResolution::Superseded) => println!("Search superseded by a newer query."),
        Err(err) => print_error(&err),
    }
}

fn print_outcome(outcome: &SearchOutcome) {
    if let Some(part_type) = &outcome.identified_part_type {
        println!("Identified part type: {part_type}");
    }
    match outcome.primary() {
        Some(primary) => {
            println!(
                "Best match: {}  {}  [{} confidence]",
                primary.code,
                primary.description,
                similarity_label(primary.similarity)
            );
            for alternative in &outcome.candidates[1..] {
                println!(
                    "  also: {}  {}  [{} confidence]",
                    alternative.code,
                    alternative.description,
                    similarity_label(alternative.similarity)
                );
            }
        }
        None => println!("No confident match in the catalog."),
    }
}

fn print_status(session: &SearchSession) {
    let state = session.state();
    println!("State: {state}");
    match state {
        SessionState::Initial => println!("No catalog loaded."),
        _ => println!("Catalog: {} parts.", session.catalog_len()),
    }
    if let Some(error) = session.last_error() {
        println!("Last error: {error}");
    }
}

fn print_error(err: &ScoutError) {
    println!("{err}");
    if err.is_retryable() {
        println!("The catalog is still loaded; you can retry the same search.");
    }
}

fn similarity_label(similarity: Similarity) -> &'static str {
    match similarity {
        Similarity::High => "high",
        Similarity::Medium => "medium",
        Similarity::Low => "low",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("load parts.xlsx").unwrap(),
            Some(Command::Load(PathBuf::from("parts.xlsx")))
        );
        assert_eq!(
            parse_command("search hydraulic pump 25L").unwrap(),
            Some(Command::Search("hydraulic pump 25L".into()))
        );
        assert_eq!(
            parse_command("image photo.jpg").unwrap(),
            Some(Command::Image(PathBuf::from("photo.jpg")))
        );
        assert_eq!(parse_command("reset").unwrap(), Some(Command::Reset));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_blank_and_unknown_input() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("search").is_err());
        assert!(parse_command("load   ").is_err());
    }

    #[test]
    fn test_similarity_labels() {
        assert_eq!(similarity_label(Similarity::High), "high");
        assert_eq!(similarity_label(Similarity::Low), "low");
    }
}
