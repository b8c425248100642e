//! Lexical analysis (tokenization) of a single command line.
//!
//! The grammar has no quoting or nesting: tokens are maximal runs of characters
//! other than space and tab. Tokens borrow from the input line, which is never
//! modified.

/// Characters that separate tokens.
const DELIMITERS: [char; 2] = [' ', '\t'];

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Iterator over the tokens of a line.
///
/// Keeps an explicit byte cursor into the line, so two iterators over the same
/// line are fully independent.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer positioned at the start of `line`.
    pub fn new(line: &'a str) -> Self {
        Tokens {
            input: line,
            pos: 0,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_delimiters(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !is_delimiter(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.skip_delimiters();
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if is_delimiter(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        if self.pos == start {
            None
        } else {
            Some(&self.input[start..self.pos])
        }
    }
}

/// Splits `line` into tokens separated by one or more spaces or tabs.
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    Tokens::new(line).collect()
}
