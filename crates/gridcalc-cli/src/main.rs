//! gridcalc CLI - evaluate formulas and run cell scripts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{evaluate_formula, format_number, Cell, NoCells};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Number of grid rows
    #[arg(long, default_value_t = 100, global = true)]
    rows: u32,

    /// Number of grid columns
    #[arg(long, default_value_t = 100, global = true)]
    cols: u32,

    /// Deepest chain of references followed while evaluating
    #[arg(long = "max-depth", default_value_t = 256, global = true)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one formula; references are not available
    Eval {
        /// Formula text, with or without the leading '='
        formula: String,
    },

    /// Load a script of cell assignments and print the results
    ///
    /// Each line is `<A1> <text>`. Blank lines and lines starting with '#'
    /// are skipped.
    Run {
        /// Script file, or '-' for stdin
        script: PathBuf,

        /// Only print these cells (repeatable)
        #[arg(short, long = "show")]
        show: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = GridSettings::default()
        .with_rows(cli.rows)
        .with_cols(cli.cols)
        .with_max_chain_depth(cli.max_depth);

    match cli.command {
        Commands::Eval { formula } => eval(&formula),
        Commands::Run { script, show } => run(&script, &show, settings),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn eval(formula: &str) -> Result<()> {
    match evaluate_formula(formula, &mut NoCells) {
        Ok(n) => {
            println!("{}", format_number(n));
            Ok(())
        }
        Err(e) => {
            println!("{}", e.code());
            Err(e).with_context(|| format!("Failed to evaluate '{}'", formula))
        }
    }
}

fn run(script: &Path, show: &[String], settings: GridSettings) -> Result<()> {
    let text = read_script(script)?;
    let mut grid = Grid::with_settings(settings).context("Invalid grid settings")?;

    for line in parse_script(&text) {
        grid.store_a1(line.address, line.text)
            .with_context(|| format!("line {}: cannot store into '{}'", line.number, line.address))?;
    }

    let stats = grid.recalculate();
    tracing::info!(
        formulas = stats.formula_count,
        errors = stats.errors,
        circular = stats.circular_references,
        "script loaded"
    );

    let output = render(&mut grid, show)?;
    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;

    Ok(())
}

fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read script from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

/// One assignment from a script
#[derive(Debug, PartialEq)]
struct ScriptLine<'a> {
    /// 1-based line number in the script
    number: usize,
    address: &'a str,
    text: &'a str,
}

/// Split a script into assignments
///
/// The first run of whitespace separates the address from the raw text,
/// which may be empty.
fn parse_script(script: &str) -> Vec<ScriptLine<'_>> {
    script
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let (address, text) = match line.split_once(char::is_whitespace) {
                Some((address, rest)) => (address, rest.trim_start()),
                None => (line, ""),
            };

            Some(ScriptLine {
                number: idx + 1,
                address,
                text,
            })
        })
        .collect()
}

/// `A1<TAB>display` lines, for the requested cells or every non-empty one
fn render(grid: &mut Grid, show: &[String]) -> Result<String> {
    let positions: Vec<Position> = if show.is_empty() {
        grid.non_empty_cells().map(Cell::position).collect()
    } else {
        show.iter()
            .map(|a1| {
                grid.position(a1)
                    .with_context(|| format!("Cannot show '{}'", a1))
            })
            .collect::<Result<_>>()?
    };

    let mut output = String::new();
    for position in positions {
        output.push_str(&format!("{}\t{}\n", position, grid.display_value(position)));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_script() {
        let script = "# totals\nA1 10\n\n  B1   =A1 * 2\nC1\nD1 two words  \n";
        let lines = parse_script(script);

        assert_eq!(
            lines,
            vec![
                ScriptLine {
                    number: 2,
                    address: "A1",
                    text: "10"
                },
                ScriptLine {
                    number: 4,
                    address: "B1",
                    text: "=A1 * 2"
                },
                ScriptLine {
                    number: 5,
                    address: "C1",
                    text: ""
                },
                ScriptLine {
                    number: 6,
                    address: "D1",
                    text: "two words  "
                },
            ]
        );
    }

    #[test]
    fn test_render_all_cells() {
        let mut grid = Grid::new();
        for line in parse_script("B1 =A1/4\nA1 10\nA2 =B1*0\nC3 =1/0") {
            grid.store_a1(line.address, line.text).unwrap();
        }

        assert_eq!(
            render(&mut grid, &[]).unwrap(),
            "A1\t10\nB1\t2.5\nA2\t0\nC3\t#DIV/0!\n"
        );
    }

    #[test]
    fn test_render_selected_cells() {
        let mut grid = Grid::new();
        grid.store_a1("A1", "=2+3*4").unwrap();

        let show = vec!["a1".to_string(), "Z9".to_string()];
        assert_eq!(render(&mut grid, &show).unwrap(), "A1\t14\nZ9\t\n");

        let bad = vec!["A0".to_string()];
        assert!(render(&mut grid, &bad).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["gridcalc", "-vv", "run", "-", "--show", "A1", "--rows", "5"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rows, 5);
        assert_eq!(cli.cols, 100);
        match cli.command {
            Commands::Run { script, show } => {
                assert_eq!(script, PathBuf::from("-"));
                assert_eq!(show, vec!["A1".to_string()]);
            }
            Commands::Eval { .. } => panic!("expected run"),
        }
    }
}
