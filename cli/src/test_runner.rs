use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use interpreter::{Library, RunError};
use sketch::memory::{Buffer, Memory, Value};
use sketch::parser::CompileFailure;

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's range must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Bindings set in the base frame before the document runs.
    #[serde(default)]
    pub vars: BTreeMap<String, toml::Value>,

    /// Expected exact output (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected execution error; the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If true, the test expects compiling to fail.
    #[serde(default)]
    pub expect_compile_error: bool,

    /// Expected sketch warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// Loop iteration budget for the run.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

fn toml_to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::text(text.as_str()),
        other => Value::text(other.to_string()),
    }
}

/// Split a `.test.md` file into its TOML config and document source.
///
/// The file opens with a `---` line; the next `---` line closes the front
/// matter and everything after it is the document.
fn split_front_matter(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.split_inclusive('\n');
    let opening = lines.next().unwrap_or_default();
    if opening.trim_end() != "---" {
        return Err("a test file must open with a `---` line".into());
    }
    let front = opening.len();
    let mut offset = front;
    for line in lines {
        if line.trim_end() == "---" {
            let config = toml::from_str(&content[front..offset])
                .map_err(|error| format!("invalid front matter: {}", error))?;
            return Ok((config, &content[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err("front matter is never closed by a `---` line".into())
}

#[derive(Debug)]
pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let finish = |description: Option<String>, outcome: TestOutcome| TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return finish(None, TestOutcome::Fail(format!("cannot read file: {}", e))),
    };
    let (config, source) = match split_front_matter(&content) {
        Ok(pair) => pair,
        Err(e) => return finish(None, TestOutcome::Fail(format!("frontmatter error: {}", e))),
    };
    let description = config.description.clone();
    let outcome = match check(path, &config, source) {
        Some(reason) => TestOutcome::Fail(reason),
        None => TestOutcome::Pass,
    };
    finish(description, outcome)
}

/// Run one document against its expectations. Returns `Some(reason)` on mismatch.
fn check(path: &Path, config: &TestConfig, source: &str) -> Option<String> {
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut library = Library::with_base_dir(base_dir);
    let compiled = library.add_source(path.display().to_string(), source);

    if config.expect_compile_error {
        return match compiled {
            Err(RunError::Compile { .. }) => None,
            Err(other) => Some(format!("expected compile error, got: {}", other)),
            Ok(_) => Some("expected compile error, but compiling succeeded".into()),
        };
    }
    let document = match compiled {
        Ok(document) => document,
        Err(RunError::Compile { errors, .. }) => {
            let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
            return Some(format!("unexpected compile error: {}", messages.join("; ")));
        }
        Err(other) => return Some(format!("unexpected error: {}", other)),
    };

    let buffer = Buffer::new();
    let mut memory = Memory::with_console(Box::new(buffer.clone()));
    if let Some(limit) = config.max_steps {
        memory = memory.with_step_limit(limit);
    }
    for (name, value) in &config.vars {
        memory.set(name.clone(), toml_to_value(value));
    }
    let result = interpreter::execute_program_with(&library, &document, memory);

    let mismatch = match (&config.expect_error, &config.expect_output, result) {
        (Some(expected_err), _, Err(failure)) => {
            let err_str = failure.to_string();
            if err_str.contains(expected_err.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected_err, err_str
                ))
            }
        }
        (Some(expected_err), _, Ok(_)) => Some(format!(
            "expected error containing \"{}\", but execution succeeded",
            expected_err
        )),
        (None, _, Err(failure)) => Some(format!("unexpected execution error: {}", failure)),
        (None, Some(expected_output), Ok(_)) => {
            let actual = buffer.contents();
            let actual_trimmed = actual.trim();
            let expected_trimmed = expected_output.trim();
            if actual_trimmed == expected_trimmed {
                None
            } else {
                Some(format!(
                    "output mismatch\n  expected: {}\n  actual:   {}",
                    expected_trimmed, actual_trimmed
                ))
            }
        }
        (None, None, Ok(_)) => None,
    };
    if mismatch.is_some() {
        return mismatch;
    }

    let expected_warnings = config.expect_warnings.as_ref()?;
    compare_warnings(source, library.warnings(&document), expected_warnings)
}

/// 1-based line holding byte `offset` of `source`.
fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end]
        .iter()
        .filter(|&&byte| byte == b'\n')
        .count()
        + 1
}

/// Compare sketch warnings with the expected ones, in order.
fn compare_warnings(
    source: &str,
    warnings: &[CompileFailure],
    expected: &[ExpectedWarning],
) -> Option<String> {
    if warnings.len() != expected.len() {
        let reported: String = warnings
            .iter()
            .map(|warning| format!("\n    {}", warning))
            .collect();
        return Some(format!(
            "{} warning(s) expected, {} reported:{}",
            expected.len(),
            warnings.len(),
            if reported.is_empty() { " none".to_string() } else { reported }
        ));
    }
    warnings
        .iter()
        .zip(expected)
        .enumerate()
        .find_map(|(index, (warning, expected))| {
            let message = warning.to_string();
            if !message.contains(&expected.contains) {
                return Some(format!(
                    "warning {}: {:?} does not mention {:?}",
                    index + 1,
                    message,
                    expected.contains
                ));
            }
            let line = line_of(source, warning.range.start());
            match expected.line {
                Some(wanted) if wanted != line => Some(format!(
                    "warning {}: reported on line {}, expected line {}",
                    index + 1,
                    line,
                    wanted
                )),
                _ => None,
            }
        })
}

/// `.test.md` files under `root`, keyed by the folder they sit in relative
/// to `root` (`""` for `root` itself). Each list is sorted.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut folders = vec![root.to_path_buf()];
    while let Some(folder) = folders.pop() {
        let Ok(entries) = std::fs::read_dir(&folder) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                folders.push(path);
            } else if is_test_file(&path) {
                found.entry(category_of(root, &folder)).or_default().push(path);
            }
        }
    }
    found.values_mut().for_each(|files| files.sort());
    found
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".test.md"))
}

/// `folder` relative to `root`, with `/` separators on every platform.
fn category_of(root: &Path, folder: &Path) -> String {
    folder
        .strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// Print the categories found under `path` with their file counts.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("{} is a single test file", path.display());
        return;
    }
    let found = discover(path);
    if found.is_empty() {
        eprintln!("no .test.md files under {}", path.display());
        return;
    }
    eprintln!("categories under {}:", path.display());
    for (category, files) in &found {
        eprintln!("  {:<24} {} file(s)", category_label(category), files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

fn label_of<'a>(result: &'a TestResult) -> &'a str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("?")
    })
}

/// Run all `.test.md` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover(path);
        if all_categories.is_empty() {
            eprintln!("no .test.md files found in {}", path.display());
            return 1;
        }
        select_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if path.is_dir() {
            eprintln!();
            eprintln!("{}", paint(category_label(cat), "1", no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), label_of(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), label_of(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", paint("ok", "32", no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

fn select_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all_categories;
    }
    let mut filtered = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let prefix = format!("{}/", req);
        let matching: Vec<&String> = all_categories
            .keys()
            .filter(|cat| cat.as_str() == req || cat.starts_with(&prefix))
            .collect();
        if matching.is_empty() {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for cat in matching {
            filtered.insert(cat.clone(), all_categories[cat].clone());
        }
    }
    filtered
}
