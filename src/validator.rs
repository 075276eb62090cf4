use crate::error::{ErrorKind, JaviError, Span};
use crate::scan::{self, LiteralTracker};

/// The exact main-method signature the interpreter recognizes. Whitespace
/// variations are not tolerated; both the validator and the body extractor go
/// through [`locate_main`], so they can never disagree about it.
pub const MAIN_SIGNATURE: &str = "public static void main(String[] args)";

const CLASS_KEYWORDS: &str = "public class";

/// Structural pre-flight checks, run before any statement executes.
/// Pure function over the source text.
pub fn validate(source: &str) -> Result<(), JaviError> {
    let class_idx = match source.find(CLASS_KEYWORDS) {
        Some(idx) => idx,
        None => {
            return Err(JaviError::new(
                ErrorKind::MissingClass,
                Span::single(0),
                "No public class declaration found".to_string(),
            ));
        }
    };

    if locate_main(source).is_none() {
        return Err(JaviError::new(
            ErrorKind::MissingMain,
            Span::new(class_idx, class_idx + CLASS_KEYWORDS.len()),
            format!("No main method found: expected '{}'", MAIN_SIGNATURE),
        ));
    }

    parse_class_name(source, class_idx)?;
    check_braces(source)?;

    Ok(())
}

/// Byte index of the main-method signature, if present.
pub fn locate_main(source: &str) -> Option<usize> {
    source.find(MAIN_SIGNATURE)
}

/// Extract the main-method body text and its byte offset in `source`.
///
/// Validation already guarantees the signature exists, so a failure here means
/// the body braces could not be read.
pub fn extract_main_body(source: &str) -> Result<(&str, usize), JaviError> {
    let not_found = |pos: usize| {
        JaviError::new(
            ErrorKind::MainBodyNotFound,
            Span::single(pos),
            "Could not extract the main method body".to_string(),
        )
    };

    let sig = locate_main(source).ok_or_else(|| not_found(0))?;
    let after_sig = sig + MAIN_SIGNATURE.len();
    let open = source[after_sig..]
        .find('{')
        .map(|rel| after_sig + rel)
        .ok_or_else(|| not_found(after_sig.min(source.len().saturating_sub(1))))?;
    let close = scan::find_matching(source, open, '{', '}').ok_or_else(|| not_found(open))?;

    Ok((&source[open + 1..close], open + 1))
}

fn parse_class_name(source: &str, class_idx: usize) -> Result<(), JaviError> {
    let name_offset = class_idx + CLASS_KEYWORDS.len();
    let rest = &source[name_offset..];
    let trimmed = rest.trim_start();
    let ws = rest.len() - trimmed.len();
    let name: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();

    if ws == 0 || !scan::is_identifier(&name) {
        return Err(JaviError::new(
            ErrorKind::MalformedClassName,
            Span::single(name_offset.min(source.len().saturating_sub(1))),
            "Could not parse a class name from the class declaration".to_string(),
        ));
    }

    Ok(())
}

/// Single left-to-right scan tracking brace depth, ignoring braces inside
/// quoted literals. Depth going negative names the offending position; depth
/// ending positive names the number of missing closers.
fn check_braces(source: &str) -> Result<(), JaviError> {
    let mut literals = LiteralTracker::new();
    let mut depth: i32 = 0;

    for (i, c) in source.char_indices() {
        if literals.step(c) {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(JaviError::new(
                        ErrorKind::UnbalancedBraces,
                        Span::single(i),
                        format!("Unexpected '}}' at position {}", i),
                    ));
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        let plural = if depth == 1 { "" } else { "s" };
        return Err(JaviError::new(
            ErrorKind::UnbalancedBraces,
            Span::single(source.len().saturating_sub(1)),
            format!("Missing {} closing brace{}", depth, plural),
        ));
    }

    Ok(())
}
