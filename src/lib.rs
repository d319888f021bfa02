#![allow(clippy::module_inception)]

use std::{fs, path::Path, rc::Rc, sync::Once};

use crate::{
    ast::ast::File,
    checker::checker::check_file,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

pub mod ast;
pub mod checker;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod scope;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, so normal compiler runs stay quiet.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }

        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::from_default_env())
            .init();
    });
}

/// Tokenizes and parses `source` into an unchecked module.
pub fn parse_source(source: &str, file_name: &str) -> Result<File, Error> {
    let tokens = tokenize(source.to_string(), Some(file_name.to_string()))?;
    let (_, file) = parse(tokens, Rc::new(file_name.to_string()));
    file
}

/// Parses `source` and runs type resolution plus every semantic check.
///
/// The returned module is ready for code generation.
pub fn check_source(source: &str, file_name: &str) -> Result<File, Error> {
    let mut file = parse_source(source, file_name)?;
    check_file(&mut file)?;
    Ok(file)
}

pub fn get_line_at_position(file: &Path, position: u32) -> Option<(usize, String, usize)> {
    let content = fs::read_to_string(file).ok()?;
    let pos = position as usize;

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    None
}

pub fn display_error(error: &Error, file: &Path) {
    /*
        Error: DuplicateDefinition (`x` is already defined in this scope)
        -> main.prance
           |
        20 | var x: Int
           | ----^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}", file.as_os_str().to_string_lossy());

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = get_line_at_position(file, position.0) else {
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    #[test]
    fn test_get_line_at_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "var x: Int\nx = 1\nfun f() {{\n    x = 2\n}}\n").unwrap();

        let (line_number, line, line_pos) = super::get_line_at_position(file.path(), 4).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "var x: Int\n");
        assert_eq!(line_pos, 4);

        let (line_number, line, line_pos) = super::get_line_at_position(file.path(), 31).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "    x = 2\n");
        assert_eq!(line_pos, 4);

        assert!(super::get_line_at_position(file.path(), 500).is_none());
    }
}
