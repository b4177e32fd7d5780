//! Version-gated keyword resolution.
//!
//! Length-bucketed lookup: the identifier's length filters to a handful
//! of candidates (Python keywords are 2-8 chars) before any string
//! comparison. Several words are keywords only under some versions or
//! future flags:
//!
//! - `with`/`as`: keywords from 2.6 (or `with_statement` future import)
//! - `print`: a keyword only in 2.x without `print_function`
//! - `exec`: 2.x only
//! - `nonlocal`, `True`, `False`: 3.x only
//! - `async`/`await`: from 3.5; the parser decides whether a given
//!   occurrence is a keyword or a plain name

use pylon_ir::{FutureOptions, PythonVersion, TokenKind};

/// Look up a reserved keyword by text under the given version and
/// future flags. Returns `None` for plain identifiers.
#[inline]
pub fn lookup(text: &str, version: PythonVersion, future: FutureOptions) -> Option<TokenKind> {
    let bytes = text.as_bytes();
    let len = bytes.len();

    // All keywords are 2-8 chars and start with an ASCII letter.
    if !(2..=8).contains(&len) || !bytes[0].is_ascii_alphabetic() {
        return None;
    }

    match len {
        2 => match text {
            "as" if has_with(version, future) => Some(TokenKind::As),
            "if" => Some(TokenKind::If),
            "in" => Some(TokenKind::In),
            "is" => Some(TokenKind::Is),
            "or" => Some(TokenKind::Or),
            _ => None,
        },
        3 => match text {
            "and" => Some(TokenKind::And),
            "def" => Some(TokenKind::Def),
            "del" => Some(TokenKind::Del),
            "for" => Some(TokenKind::For),
            "not" => Some(TokenKind::Not),
            "try" => Some(TokenKind::Try),
            _ => None,
        },
        4 => match text {
            "elif" => Some(TokenKind::Elif),
            "else" => Some(TokenKind::Else),
            "exec" if version.is_2x() => Some(TokenKind::Exec),
            "from" => Some(TokenKind::From),
            "None" => Some(TokenKind::NoneKw),
            "pass" => Some(TokenKind::Pass),
            "True" if version.is_3x() => Some(TokenKind::TrueKw),
            "with" if has_with(version, future) => Some(TokenKind::With),
            _ => None,
        },
        5 => match text {
            "async" if version.supports_async_await() => Some(TokenKind::Async),
            "await" if version.supports_async_await() => Some(TokenKind::Await),
            "break" => Some(TokenKind::Break),
            "class" => Some(TokenKind::Class),
            "False" if version.is_3x() => Some(TokenKind::FalseKw),
            "print" if version.is_2x() && !future.contains(FutureOptions::PRINT_FUNCTION) => {
                Some(TokenKind::Print)
            }
            "raise" => Some(TokenKind::Raise),
            "while" => Some(TokenKind::While),
            "yield" => Some(TokenKind::Yield),
            _ => None,
        },
        6 => match text {
            "assert" => Some(TokenKind::Assert),
            "except" => Some(TokenKind::Except),
            "global" => Some(TokenKind::Global),
            "import" => Some(TokenKind::Import),
            "lambda" => Some(TokenKind::Lambda),
            "return" => Some(TokenKind::Return),
            _ => None,
        },
        7 => match text {
            "finally" => Some(TokenKind::Finally),
            _ => None,
        },
        8 => match text {
            "continue" => Some(TokenKind::Continue),
            "nonlocal" if version.is_3x() => Some(TokenKind::Nonlocal),
            _ => None,
        },
        _ => None,
    }
}

#[inline]
fn has_with(version: PythonVersion, future: FutureOptions) -> bool {
    version.has_with_statement() || future.contains(FutureOptions::WITH_STATEMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_ir::PythonVersion as V;

    fn by_version(text: &str, version: V) -> Option<TokenKind> {
        lookup(text, version, FutureOptions::from_version(version))
    }

    #[test]
    fn core_keywords_all_versions() {
        for v in [V::V24, V::V27, V::V30, V::V37] {
            assert_eq!(by_version("def", v), Some(TokenKind::Def));
            assert_eq!(by_version("return", v), Some(TokenKind::Return));
            assert_eq!(by_version("lambda", v), Some(TokenKind::Lambda));
            assert_eq!(by_version("spam", v), None);
        }
    }

    #[test]
    fn with_as_gated_on_26() {
        assert_eq!(by_version("with", V::V24), None);
        assert_eq!(by_version("as", V::V25), None);
        assert_eq!(by_version("with", V::V26), Some(TokenKind::With));
        assert_eq!(by_version("as", V::V30), Some(TokenKind::As));
    }

    #[test]
    fn with_via_future_import() {
        let future = FutureOptions::from_version(V::V25) | FutureOptions::WITH_STATEMENT;
        assert_eq!(lookup("with", V::V25, future), Some(TokenKind::With));
    }

    #[test]
    fn print_keyword_gates() {
        assert_eq!(by_version("print", V::V27), Some(TokenKind::Print));
        assert_eq!(by_version("print", V::V35), None);
        let future = FutureOptions::from_version(V::V27) | FutureOptions::PRINT_FUNCTION;
        assert_eq!(lookup("print", V::V27, future), None);
    }

    #[test]
    fn version_split_keywords() {
        assert_eq!(by_version("exec", V::V27), Some(TokenKind::Exec));
        assert_eq!(by_version("exec", V::V30), None);
        assert_eq!(by_version("nonlocal", V::V27), None);
        assert_eq!(by_version("nonlocal", V::V30), Some(TokenKind::Nonlocal));
        assert_eq!(by_version("True", V::V27), None);
        assert_eq!(by_version("True", V::V30), Some(TokenKind::TrueKw));
    }

    #[test]
    fn async_await_from_35() {
        assert_eq!(by_version("async", V::V34), None);
        assert_eq!(by_version("async", V::V35), Some(TokenKind::Async));
        assert_eq!(by_version("await", V::V36), Some(TokenKind::Await));
    }
}
