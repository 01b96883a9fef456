//! Markdown code fence handling for oracle responses.

/// Remove exactly one fence layer from an oracle response.
///
/// The first line opening a fence (three or more backticks or tildes, with an
/// optional info string such as `java`) starts the block; the first later line
/// made only of the same character, at least as long, closes it. Text around
/// the block is dropped. Without a fence the input is returned unchanged; an
/// unterminated fence yields everything after the opening line.
pub fn strip_fence(text: &str) -> &str {
    let Some(open) = find_opening(text) else {
        return text;
    };
    let body = &text[open.body_start..];

    let Some(close_start) = find_closing(body, open.ch, open.len) else {
        return body;
    };

    let inner = &body[..close_start];
    let inner = inner.strip_suffix('\n').unwrap_or(inner);
    if open.crlf {
        inner.strip_suffix('\r').unwrap_or(inner)
    } else {
        inner
    }
}

/// Wrap `code` in a fence that no backtick run inside `code` can close.
pub fn wrap_fence(code: &str, info: &str) -> String {
    let longest = longest_run(code, '`');
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}{info}\n{code}\n{fence}")
}

struct Opening {
    ch: char,
    len: usize,
    body_start: usize,
    crlf: bool,
}

fn find_opening(text: &str) -> Option<Opening> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let content = line.strip_suffix('\n').unwrap_or(line);
        let crlf = content.ends_with('\r');
        let content = content.strip_suffix('\r').unwrap_or(content);
        let trimmed = content.trim_start();

        let Some(ch) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') else {
            continue;
        };
        let len = trimmed.chars().take_while(|c| *c == ch).count();
        if len < 3 {
            continue;
        }
        // A backtick fence's info string may not contain backticks.
        let info = &trimmed[len..];
        if ch == '`' && info.contains('`') {
            continue;
        }

        return Some(Opening {
            ch,
            len,
            body_start: start + line.len(),
            crlf,
        });
    }
    None
}

fn find_closing(body: &str, ch: char, min_len: usize) -> Option<usize> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|c| *c == ch).count();
        if len >= min_len && len == trimmed.chars().count() {
            return Some(start);
        }
    }
    None
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
