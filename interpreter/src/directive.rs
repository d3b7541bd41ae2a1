//! Template directives written inside inline code spans.
//!
//! A code span whose text starts with `$` is a directive; anything else is
//! plain code and renders verbatim.

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `$name`
    Print(String),
    /// `$name = text`
    Set { name: String, value: String },
    /// `$let name = text`
    Let { name: String, value: String },
    /// `$name += text`
    Append { name: String, value: String },
    /// `$if name`
    If(String),
    /// `$repeat n` or `$repeat $name`
    Repeat(Count),
    /// `$capture name`
    Capture(String),
    /// `$include document`
    Include(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Count {
    Literal(usize),
    Variable(String),
}

impl Directive {
    /// Block directives take the rest of their enclosing node as body.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Directive::If(_) | Directive::Repeat(_) | Directive::Capture(_)
        )
    }
}

/// Parse the text of a code span.
///
/// Returns `None` when the text is not a directive at all.
pub fn parse(code: &str) -> Option<Result<Directive, String>> {
    let body = code.trim().strip_prefix('$')?;
    Some(parse_body(body))
}

fn parse_body(body: &str) -> Result<Directive, String> {
    let (keyword, rest) = split_word(body);
    match keyword {
        "let" => {
            let (name, value) = assignment(rest, "=")
                .ok_or_else(|| format!("expected `$let name = value`, found `${}`", body))?;
            Ok(Directive::Let { name, value })
        }
        "if" => Ok(Directive::If(single_name("if", rest)?)),
        "capture" => Ok(Directive::Capture(single_name("capture", rest)?)),
        "repeat" => Ok(Directive::Repeat(count(rest)?)),
        "include" => {
            let document = rest.trim();
            if document.is_empty() {
                return Err("`$include` needs a document name".to_string());
            }
            Ok(Directive::Include(document.to_string()))
        }
        _ => variable(body),
    }
}

fn variable(body: &str) -> Result<Directive, String> {
    if let Some((name, value)) = assignment(body, "+=") {
        return Ok(Directive::Append { name, value });
    }
    if let Some((name, value)) = assignment(body, "=") {
        return Ok(Directive::Set { name, value });
    }
    let name = body.trim();
    if is_name(name) {
        Ok(Directive::Print(name.to_string()))
    } else if name.is_empty() {
        Err("empty directive".to_string())
    } else {
        Err(format!("'{}' is not a valid name", name))
    }
}

/// `name <op> value`, with a valid name on the left.
fn assignment(text: &str, op: &str) -> Option<(String, String)> {
    let (name, value) = text.split_once(op)?;
    let name = name.trim();
    if !is_name(name) {
        return None;
    }
    Some((name.to_string(), literal(value)))
}

/// Surrounding whitespace is dropped unless the value is double-quoted.
fn literal(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn single_name(keyword: &str, rest: &str) -> Result<String, String> {
    let name = rest.trim();
    if is_name(name) {
        Ok(name.to_string())
    } else if name.is_empty() {
        Err(format!("`${}` needs a variable name", keyword))
    } else {
        Err(format!("'{}' is not a valid name", name))
    }
}

fn count(rest: &str) -> Result<Count, String> {
    let rest = rest.trim();
    if let Some(name) = rest.strip_prefix('$') {
        if is_name(name) {
            return Ok(Count::Variable(name.to_string()));
        }
        return Err(format!("'{}' is not a valid name", name));
    }
    rest.parse::<usize>()
        .map(Count::Literal)
        .map_err(|_| format!("'{}' is not a valid count", rest))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// `[A-Za-z_][A-Za-z0-9_.-]*`
pub fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
