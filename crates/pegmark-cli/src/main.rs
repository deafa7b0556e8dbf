//! Command-line interface for pegmark.
//!
//! Converts Markdown files (or stdin) to HTML, or dumps the parsed element
//! trees with `--tree`.
//!
//! Usage:
//!   pegmark [OPTIONS] [FILES]...   - Convert each file, or stdin when none given

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use pegmark_config::{Config, Options};
use pegmark_engine::{Driver, Extensions, Formatter, HtmlFormatter, TreeFormatter};

#[derive(Debug, Parser)]
#[command(name = "pegmark", version, about = "Convert Markdown to HTML")]
struct Cli {
    /// Markdown files to convert; reads stdin when none are given
    files: Vec<PathBuf>,

    /// Typographic quotes, dashes and ellipses
    #[arg(long)]
    smart: bool,

    /// Footnotes: [^label] references and ^[inline notes]
    #[arg(long)]
    notes: bool,

    /// Drop raw HTML
    #[arg(long)]
    filter_html: bool,

    /// Drop <style> blocks
    #[arg(long)]
    filter_styles: bool,

    /// Definition lists
    #[arg(long)]
    dlists: bool,

    /// Print the parsed element tree instead of HTML
    #[arg(long)]
    tree: bool,

    /// Config file (default: ~/.config/pegmark/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// File options with the command-line switches turned on top.
    fn extensions(&self, file: Options) -> Extensions {
        Extensions {
            smart: file.smart || self.smart,
            notes: file.notes || self.notes,
            filter_html: file.filter_html || self.filter_html,
            filter_styles: file.filter_styles || self.filter_styles,
            dlists: file.dlists || self.dlists,
        }
    }
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            log::error!("{e:#}");
            process::exit(2);
        }
    }
}

/// Convert every input. Returns `false` if any document failed.
fn run(cli: &Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    let extensions = cli.extensions(config.extensions);
    log::debug!("Extensions: {extensions:?}");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut driver = Driver::new(extensions);
    let mut ok = true;

    if cli.files.is_empty() {
        let mut formatter = formatter(cli.tree, &mut out);
        if let Err(e) = driver.markdown(io::stdin().lock(), &mut formatter) {
            log::error!("<stdin>: {e}");
            ok = false;
        }
    } else {
        for path in &cli.files {
            if let Err(e) = convert(&mut driver, path, cli.tree, &mut out) {
                log::error!("{}: {e:#}", path.display());
                ok = false;
            }
        }
    }

    out.flush()?;
    Ok(ok)
}

fn convert(driver: &mut Driver, path: &Path, tree: bool, out: &mut dyn Write) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut formatter = formatter(tree, out);
    driver.markdown(file, &mut formatter)?;
    Ok(())
}

fn formatter<'a>(tree: bool, out: &'a mut dyn Write) -> Box<dyn Formatter + 'a> {
    if tree {
        Box::new(TreeFormatter::new(out))
    } else {
        Box::new(HtmlFormatter::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_add_to_file_options() {
        let cli = Cli::parse_from(["pegmark", "--smart", "--dlists", "a.md"]);
        let extensions = cli.extensions(Options {
            notes: true,
            ..Options::default()
        });

        assert!(extensions.smart && extensions.notes && extensions.dlists);
        assert!(!extensions.filter_html && !extensions.filter_styles);
        assert_eq!(cli.files, vec![PathBuf::from("a.md")]);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
