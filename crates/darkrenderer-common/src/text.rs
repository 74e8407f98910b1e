//! Whitespace-tokenized numeric encoding.
//!
//! Every DarkRenderer wire message beyond the length-prefixed frame header is
//! plain UTF-8 text, tokens separated by arbitrary whitespace. This module
//! holds the handful of parse/format helpers every codec in
//! `darkrenderer-protocol` builds on, so each codec only has to describe its
//! own token layout.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("expected at least {expected} tokens, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("token {index} ({token:?}) is not a valid integer")]
    NotAnInteger { index: usize, token: String },

    #[error("token {index} ({token:?}) is not a valid float")]
    NotAFloat { index: usize, token: String },
}

/// A cursor over whitespace-separated tokens, consumed left to right.
///
/// Every scene/task/result message in the protocol is a flat run of tokens
/// whose lengths are determined by counts that appear earlier in the same
/// message, so a cursor (rather than a one-shot split+collect) is the
/// natural shape: each field tells the next one how much to take.
pub struct Tokens<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokens {
            tokens: input.split_whitespace().collect(),
            pos: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn require(&self, n: usize) -> Result<(), TextError> {
        if self.remaining() < n {
            Err(TextError::Truncated {
                expected: self.pos + n,
                found: self.tokens.len(),
            })
        } else {
            Ok(())
        }
    }

    pub fn next_i64(&mut self) -> Result<i64, TextError> {
        self.require(1)?;
        let token = self.tokens[self.pos];
        let value = token.parse::<i64>().map_err(|_| TextError::NotAnInteger {
            index: self.pos,
            token: token.to_string(),
        })?;
        self.pos += 1;
        Ok(value)
    }

    pub fn next_usize(&mut self) -> Result<usize, TextError> {
        Ok(self.next_i64()?.max(0) as usize)
    }

    pub fn next_f64(&mut self) -> Result<f64, TextError> {
        self.require(1)?;
        let token = self.tokens[self.pos];
        let value = token.parse::<f64>().map_err(|_| TextError::NotAFloat {
            index: self.pos,
            token: token.to_string(),
        })?;
        self.pos += 1;
        Ok(value)
    }

    pub fn next_token(&mut self) -> Result<&'a str, TextError> {
        self.require(1)?;
        let token = self.tokens[self.pos];
        self.pos += 1;
        Ok(token)
    }

    /// Consumes exactly `n` tokens and parses them as signed integers.
    pub fn take_i64s(&mut self, n: usize) -> Result<Vec<i64>, TextError> {
        self.require(n)?;
        (0..n).map(|_| self.next_i64()).collect()
    }

    /// Consumes exactly `n` tokens and parses them as floats.
    pub fn take_f64s(&mut self, n: usize) -> Result<Vec<f64>, TextError> {
        self.require(n)?;
        (0..n).map(|_| self.next_f64()).collect()
    }

    /// True once every token has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the token that would be read next without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }
}

/// Appends `values` to `out` as space-separated decimal integers.
pub fn push_i64s(out: &mut String, values: &[i64]) {
    for v in values {
        out.push_str(&v.to_string());
        out.push(' ');
    }
}

/// Appends `values` to `out` as space-separated floats using the default
/// `f64` decimal representation, matching the source's `str(float)` output.
pub fn push_f64s(out: &mut String, values: &[f64]) {
    for v in values {
        out.push_str(&v.to_string());
        out.push(' ');
    }
}
