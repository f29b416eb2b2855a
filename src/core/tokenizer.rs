// src/core/tokenizer.rs

//! Splits a raw command line into argument tokens.
//!
//! Rules:
//! - Tokens are separated by runs of the space character.
//! - A `'` or `"` at the start of a token opens a quoted region that ends at the next
//!   matching quote. Inside it, the *other* quote character may open one nested level,
//!   which is kept verbatim (`'a "b" c'` -> `a "b" c`). A third level is an internal error.
//! - A quote that appears in the middle of a token is an ordinary character
//!   (`unquoted'text` is a single token).
//! - Closing the outer quote ends the token; text glued after it starts a new one.
//! - An unterminated quote is not an error: the rest of the line becomes one token.
//!
//! Known limitation: quoting only delimits whole tokens, so `name="a b"` is split into
//! `name="a` and `b"`. Named parameters with multi-word values are not supported.

use crate::constants::{MAX_QUOTE_DEPTH, TOKEN_SEPARATOR};
use thiserror::Error;

/// Input the tokenizer refuses to split.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// A third quote level was opened.
    #[error("Quote nesting deeper than {max} levels at position {position}.")]
    QuoteNestingOverflow {
        /// Char index of the offending quote.
        position: usize,
        /// The supported depth.
        max: usize,
    },
}

struct Split {
    tokens: Vec<String>,
    /// Whether the input ended inside an unterminated quote.
    open_quote: bool,
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn split(raw: &str) -> Result<Split, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quotes: Vec<char> = Vec::with_capacity(MAX_QUOTE_DEPTH);

    for (position, c) in raw.chars().enumerate() {
        if let Some(&open) = quotes.last() {
            if c == open {
                quotes.pop();
                if quotes.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                    continue;
                }
            } else if is_quote(c) {
                if quotes.len() >= MAX_QUOTE_DEPTH {
                    return Err(TokenizeError::QuoteNestingOverflow {
                        position,
                        max: MAX_QUOTE_DEPTH,
                    });
                }
                quotes.push(c);
            }
            current.push(c);
            continue;
        }

        if c == TOKEN_SEPARATOR {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                in_token = false;
            }
        } else if is_quote(c) && !in_token {
            quotes.push(c);
            in_token = true;
        } else {
            current.push(c);
            in_token = true;
        }
    }

    if in_token {
        tokens.push(current);
    }

    Ok(Split {
        tokens,
        open_quote: !quotes.is_empty(),
    })
}

/// Tokenizes a line that is about to be executed. Empty input yields no tokens.
pub fn for_execute(raw: &str) -> Result<Vec<String>, TokenizeError> {
    split(raw).map(|split| split.tokens)
}

/// Tokenizes a line that is being assisted. The last token is always the one being
/// typed: when the line is empty or ends with a space (outside of quotes), an empty
/// token is appended.
pub fn for_assist(raw: &str) -> Result<Vec<String>, TokenizeError> {
    let Split {
        mut tokens,
        open_quote,
    } = split(raw)?;
    if raw.is_empty() || (raw.ends_with(TOKEN_SEPARATOR) && !open_quote) {
        tokens.push(String::new());
    }
    log::trace!("Assist tokens for '{}': {:?}", raw, tokens);
    Ok(tokens)
}

// MARK: --- UNIT TESTS ---
