use chrono::NaiveDate;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::explorer::render::{render, render_genres};
use crate::explorer::Explorer;

const HELP: &str = "\
Commands:
  search <text>   set the search text (alias: / <text>)
  enter           restart the current search at page 1
  genre [id]      filter by genre id, no id for all genres
  date [date]     filter by release date (YYYY-MM-DD or YYYY), no date to clear
  clear           clear all filters
  next, prev      change page
  show            show the current results
  genres          list the available genres
  quit            exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Enter,
    Genre(String),
    Date(String),
    Clear,
    Next,
    Previous,
    Show,
    Genres,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if let Some(text) = line.strip_prefix('/') {
            return Ok(Command::Search(text.trim().to_string()));
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "enter" | "" => Ok(Command::Enter),
            "genre" | "g" => Ok(Command::Genre(rest.to_string())),
            "date" | "d" => Ok(Command::Date(parse_date(rest)?)),
            "clear" | "c" => Ok(Command::Clear),
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "p" => Ok(Command::Previous),
            "show" => Ok(Command::Show),
            "genres" => Ok(Command::Genres),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Accept what a date picker would produce: a calendar date, or an empty
/// value. A bare year is accepted too.
fn parse_date(input: &str) -> Result<String, CommandError> {
    if input.is_empty() {
        return Ok(String::new());
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.format("%Y-%m-%d").to_string());
    }

    if input.len() == 4 {
        if let Some(date) = input
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        {
            return Ok(date.format("%Y").to_string());
        }
    }

    Err(CommandError::InvalidDate(input.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD or YYYY")]
    InvalidDate(String),
}

/// Apply one command to the explorer and render right away. A change shows
/// the loading state; the caller renders again once it settles.
/// Returns false when the user quits.
pub async fn dispatch<W>(explorer: &Explorer, command: Command, out: &mut W) -> std::io::Result<bool>
where
    W: AsyncWrite + Unpin,
{
    debug!(?command, "dispatch");

    let changed = match command {
        Command::Search(text) => explorer.set_search(&text),
        Command::Enter => explorer.commit_search(),
        Command::Genre(id) => explorer.select_genre(&id),
        Command::Date(date) => explorer.set_release_date(&date),
        Command::Clear => explorer.clear(),
        Command::Next => explorer.next_page().await,
        Command::Previous => explorer.previous_page().await,
        Command::Show => true,
        Command::Genres => {
            let view = explorer.view().await;
            out.write_all(render_genres(&view).as_bytes()).await?;
            return Ok(true);
        }
        Command::Help => {
            out.write_all(HELP.as_bytes()).await?;
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    };

    if changed {
        render_view(explorer, out).await?;
    }
    Ok(true)
}

async fn render_view<W>(explorer: &Explorer, out: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let view = explorer.view().await;
    out.write_all(render(&view, explorer.config()).as_bytes()).await
}

async fn prompt<W>(out: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(b"> ").await?;
    out.flush().await
}

/// Mount the explorer and drive it from `input` until it ends or the user
/// quits. Input stays live while requests are in flight; the view is
/// rendered again each time everything outstanding has settled.
pub async fn run_interactive<R, W>(explorer: Arc<Explorer>, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let handle = explorer.mount();

    render_view(&explorer, &mut out).await?;
    prompt(&mut out).await?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            biased;

            _ = explorer.wait_idle(), if explorer.has_pending() => {
                out.write_all(b"\n").await?;
                render_view(&explorer, &mut out).await?;
                prompt(&mut out).await?;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Command::parse(&line) {
                    Ok(command) => {
                        if !dispatch(&explorer, command, &mut out).await? {
                            break;
                        }
                    }
                    Err(e) => {
                        out.write_all(format!("{}\n", e).as_bytes()).await?;
                    }
                }
                prompt(&mut out).await?;
            }
        }
    }

    handle.synchronizer.abort();
    handle.genres.abort();
    info!("explorer closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogApi, CatalogError, CatalogRequest, Genre, MoviePage};
    use crate::config::CatalogConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StalledCatalog;

    #[async_trait]
    impl CatalogApi for StalledCatalog {
        async fn genres(&self, _request: &CatalogRequest) -> Result<Vec<Genre>, CatalogError> {
            std::future::pending().await
        }

        async fn movies(&self, _request: &CatalogRequest) -> Result<MoviePage, CatalogError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_quit_while_fetch_never_settles() {
        let explorer = Arc::new(Explorer::new(
            Arc::new(StalledCatalog),
            CatalogConfig {
                api_key: "KEY".to_string(),
                ..Default::default()
            },
        ));

        let input: &[u8] = b"search matrix\nquit\n";
        let mut output: Vec<u8> = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(5),
            run_interactive(explorer.clone(), input, &mut output),
        )
        .await
        .expect("front end stuck on an unsettled fetch")
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Loading movies...").count(), 2);
        assert!(!output.contains("No movies found."));
        assert_eq!(explorer.filters().snapshot().search_term, "matrix");
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("search the matrix").unwrap(), Command::Search("the matrix".to_string()));
        assert_eq!(Command::parse("/matrix").unwrap(), Command::Search("matrix".to_string()));
        assert_eq!(Command::parse("search").unwrap(), Command::Search(String::new()));
        assert_eq!(Command::parse("").unwrap(), Command::Enter);
        assert_eq!(Command::parse("genre 28").unwrap(), Command::Genre("28".to_string()));
        assert_eq!(Command::parse("genre").unwrap(), Command::Genre(String::new()));
        assert_eq!(Command::parse("PREV").unwrap(), Command::Previous);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert!(matches!(Command::parse("rewind"), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(Command::parse("date 1999-03-31").unwrap(), Command::Date("1999-03-31".to_string()));
        assert_eq!(Command::parse("date 1999").unwrap(), Command::Date("1999".to_string()));
        assert_eq!(Command::parse("date").unwrap(), Command::Date(String::new()));
        assert_eq!(
            Command::parse("date 1999-02-30"),
            Err(CommandError::InvalidDate("1999-02-30".to_string()))
        );
        assert!(Command::parse("date soon").is_err());
    }
}
