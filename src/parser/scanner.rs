//! Character cursor over template source text
//!
//! The scanner is the substrate for the template parser. It tracks a byte
//! offset that always sits on a character boundary, supports bounded reads
//! and lets callers snapshot and restore the position for backtracking.

use thiserror::Error;

/// Errors raised by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A move or a required read ran past the end (or start) of the buffer
    #[error("scanner overflow at offset {offset}")]
    Overflow { offset: usize },
}

/// Saved scanner position, see [`Scanner::position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(usize);

/// Cursor over a borrowed source string
#[derive(Debug, Clone)]
pub struct Scanner<'s> {
    source: &'s str,
    offset: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source, offset: 0 }
    }

    /// The full source text
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Text from the cursor to the end of input
    pub fn remaining(&self) -> &'s str {
        &self.source[self.offset..]
    }

    /// Character under the cursor, `None` at end of input
    pub fn current(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn advance(&mut self) -> Result<(), ScanError> {
        match self.current() {
            Some(c) => {
                self.offset += c.len_utf8();
                Ok(())
            }
            None => Err(self.overflow()),
        }
    }

    pub fn retreat(&mut self) -> Result<(), ScanError> {
        match self.source[..self.offset].chars().next_back() {
            Some(c) => {
                self.offset -= c.len_utf8();
                Ok(())
            }
            None => Err(self.overflow()),
        }
    }

    pub fn position(&self) -> Position {
        Position(self.offset)
    }

    pub fn restore(&mut self, position: Position) {
        self.offset = position.0;
    }

    /// Slice of the source between a saved position and the cursor
    pub fn text_since(&self, position: Position) -> &'s str {
        &self.source[position.0..self.offset]
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        self.remaining().starts_with(literal)
    }

    /// Consume `literal` if the input continues with it
    pub fn read_literal(&mut self, literal: &str) -> bool {
        if self.starts_with(literal) {
            self.offset += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume characters while `predicate` holds
    pub fn read_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'s str {
        let start = self.offset;
        while let Some(c) = self.current() {
            if !predicate(c) {
                break;
            }
            self.offset += c.len_utf8();
        }
        &self.source[start..self.offset]
    }

    /// Consume characters up to the first one matching `predicate`
    ///
    /// If no character matches, a required read fails (leaving the cursor
    /// untouched) while an optional read returns everything up to the end.
    pub fn read_until_char(
        &mut self,
        mut predicate: impl FnMut(char) -> bool,
        required: bool,
    ) -> Result<&'s str, ScanError> {
        let start = self.offset;
        let text = self.read_while(|c| !predicate(c));
        if required && self.at_end() {
            self.offset = start;
            return Err(ScanError::Overflow { offset: start });
        }
        Ok(text)
    }

    /// Consume text up to `delimiter`
    ///
    /// The delimiter itself is consumed only when `consume_delimiter` is set.
    /// A missing delimiter is an overflow when `required`, otherwise the rest
    /// of the input is returned.
    pub fn read_until(
        &mut self,
        delimiter: &str,
        required: bool,
        consume_delimiter: bool,
    ) -> Result<&'s str, ScanError> {
        let start = self.offset;
        match self.remaining().find(delimiter) {
            Some(index) => {
                self.offset += index;
                let text = &self.source[start..self.offset];
                if consume_delimiter {
                    self.offset += delimiter.len();
                }
                Ok(text)
            }
            None if required => Err(ScanError::Overflow {
                offset: self.source.len(),
            }),
            None => {
                self.offset = self.source.len();
                Ok(&self.source[start..])
            }
        }
    }

    /// Consume exactly `count` characters
    pub fn read_exact(&mut self, count: usize) -> Result<&'s str, ScanError> {
        let start = self.offset;
        for _ in 0..count {
            if let Err(err) = self.advance() {
                self.offset = start;
                return Err(err);
            }
        }
        Ok(&self.source[start..self.offset])
    }

    fn overflow(&self) -> ScanError {
        ScanError::Overflow {
            offset: self.offset,
        }
    }
}
