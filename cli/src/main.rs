mod test_runner;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use interpreter::{Library, RunError};
use sketch::memory::{Console, Memory, Stream, Value};
use sketch::tree::{Child, RangeTree};

const SUBCOMMANDS: &[&str] = &["run", "tree", "check", "test", "help"];

#[derive(Parser)]
#[command(name = "sketch", version, about = "Markdown template engine built on range trees")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document to stdout
    Run(RunArgs),

    /// Print a document's range tree
    Tree(TreeArgs),

    /// Sketch and compile a document without running it
    Check(CheckArgs),

    /// Run .test.md test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Markdown document to render
    file: String,

    /// Extra documents available to `$include`. Repeatable.
    #[arg(short, long)]
    include: Vec<String>,

    /// Initial binding, as name=value. Repeatable.
    #[arg(short, long, value_parser = parse_binding)]
    set: Vec<(String, String)>,

    /// Stop after this many loop iterations
    #[arg(long)]
    max_steps: Option<usize>,

    /// Suppress output (just check for errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TreeArgs {
    /// Markdown document to sketch
    file: String,

    /// List each node's parts, gaps included, instead of the hierarchy
    #[arg(long)]
    flat: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Markdown document to check
    file: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // If the first positional arg is not a known subcommand, inject "run" so
    // `sketch file.md` works like `sketch run file.md`.
    let mut args: Vec<String> = std::env::args().collect();
    let first_positional = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, arg)| !arg.starts_with('-'))
        .map(|(index, arg)| (index, arg.clone()));
    if let Some((index, first)) = first_positional {
        if !SUBCOMMANDS.contains(&first.as_str()) {
            args.insert(index, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);
    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Run(run_args) => do_run(run_args, color_choice),
        Command::Tree(tree_args) => do_tree(tree_args, color_choice),
        Command::Check(check_args) => do_check(check_args, color_choice),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn parse_binding(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, found '{}'", text))?;
    if !interpreter::directive::is_name(name) {
        return Err(format!("'{}' is not a valid name", name));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Library rooted at the document's directory, with the document loaded.
/// Exits with diagnostics when loading fails.
fn load(file: &str, color_choice: ColorChoice) -> (Library, sketch::Document) {
    let path = Path::new(file);
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();

    let mut library = Library::with_base_dir(base_dir);
    match library.load(&file_name) {
        Ok(document) => (library, document),
        Err(error) => fail(&library, &error, color_choice),
    }
}

fn do_run(args: RunArgs, color_choice: ColorChoice) {
    let (mut library, document) = load(&args.file, color_choice);
    for include in &args.include {
        // Relative to the working directory, like the main file.
        let path = std::env::current_dir()
            .map(|dir| dir.join(include))
            .unwrap_or_else(|_| PathBuf::from(include));
        if let Err(error) = library.load(path) {
            fail(&library, &error, color_choice);
        }
    }
    emit_warnings(&library, &document, color_choice);

    let console: Box<dyn Console> = if args.quiet {
        Box::new(Stream::new(std::io::sink()))
    } else {
        Box::new(Stream::new(std::io::stdout()))
    };
    let mut memory = Memory::with_console(console);
    if let Some(limit) = args.max_steps {
        memory = memory.with_step_limit(limit);
    }
    for (name, value) in args.set {
        memory.set(name, Value::text(value));
    }

    match interpreter::execute_program_with(&library, &document, memory) {
        Ok(mut memory) => {
            if let Err(error) = memory.set_console(Box::new(Stream::new(std::io::sink()))) {
                eprintln!("error: cannot flush output: {}", error);
                process::exit(1);
            }
        }
        Err(failure) => fail(&library, &RunError::Execution(failure), color_choice),
    }
}

fn do_tree(args: TreeArgs, color_choice: ColorChoice) {
    let (library, document) = load(&args.file, color_choice);
    emit_warnings(&library, &document, color_choice);
    let Some(compilation) = library.compilation(&document) else {
        return;
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = if args.flat {
        write_flat(&mut out, &compilation.tree)
    } else {
        write!(out, "{}", compilation.tree)
    };
    if let Err(error) = result {
        eprintln!("error: cannot write tree: {}", error);
        process::exit(1);
    }
}

fn write_flat(out: &mut impl Write, tree: &RangeTree) -> std::io::Result<()> {
    let Some(root) = tree.root() else {
        return Ok(());
    };
    for (depth, id) in tree.hierarchy(root) {
        if tree.node(id).first_child().is_none() {
            continue;
        }
        let pad = "  ".repeat(depth);
        writeln!(out, "{}{} {}", pad, tree.sketch(id).kind, tree.range(id))?;
        for part in tree.flat_children(id) {
            match part {
                Child::Node(child) => {
                    writeln!(out, "{}  - {} {}", pad, tree.sketch(child).kind, tree.range(child))?
                }
                Child::Gap(range) => writeln!(
                    out,
                    "{}  - gap {} {:?}",
                    pad,
                    range,
                    tree.document().slice(range)
                )?,
            }
        }
    }
    Ok(())
}

fn do_check(args: CheckArgs, color_choice: ColorChoice) {
    let (library, document) = load(&args.file, color_choice);
    emit_warnings(&library, &document, color_choice);
    eprintln!("ok: {} compiled successfully", args.file);
}

fn emit_warnings(library: &Library, document: &sketch::Document, color_choice: ColorChoice) {
    let diagnostics: Vec<Diagnostic<usize>> = library
        .warnings(document)
        .iter()
        .map(|warning| warning.to_diagnostic())
        .collect();
    emit(library.files(), &diagnostics, color_choice);
}

/// Report `error` and exit.
fn fail(library: &Library, error: &RunError, color_choice: ColorChoice) -> ! {
    let diagnostics = error.diagnostics();
    if diagnostics.is_empty() {
        eprintln!("error: {}", error);
    } else {
        emit(library.files(), &diagnostics, color_choice);
    }
    process::exit(1);
}

fn emit(
    files: &SimpleFiles<String, String>,
    diagnostics: &[Diagnostic<usize>],
    color_choice: ColorChoice,
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
    }
}
