use crate::{
    textlocator::{LocatedCharacter, Location, TextLocator},
    token::{Token, TokenKind},
};
use log::trace;
use std::{mem::replace, str::Chars};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("invalid character `{0}` at {1}")]
    Char(char, Location),
    #[error("second decimal point in number at {0}")]
    SecondDecimalPoint(Location),
    #[error("expected `=` after `{0}` at {1}")]
    IncompleteOperator(char, Location),
    #[error("unknown identifier `{0}` at {1}")]
    UnknownIdentifier(String, Location),
    #[error("malformed number `{0}` at {1}")]
    Number(String, Location),
}

impl LexError {
    pub fn location(&self) -> Location {
        match self {
            Self::Char(_, loc)
            | Self::SecondDecimalPoint(loc)
            | Self::IncompleteOperator(_, loc)
            | Self::UnknownIdentifier(_, loc)
            | Self::Number(_, loc) => *loc,
        }
    }
}

const KEYWORDS: [(&str, TokenKind); 6] = [
    ("IF", TokenKind::If),
    ("THEN", TokenKind::Then),
    ("ELSE", TokenKind::Else),
    ("AND", TokenKind::And),
    ("OR", TokenKind::Or),
    ("NOT", TokenKind::Not),
];

/// Pulls tokens out of a character source one at a time.
///
/// `next_token` keeps returning an [`TokenKind::Eof`] token once the source is
/// exhausted. The `Iterator` impl stops before that token instead.
pub struct Scanner<I: Iterator<Item = char>> {
    characters: TextLocator<I>,
    cache: Option<LocatedCharacter>,
}

impl<I: Iterator<Item = char>> Iterator for Scanner<I> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            }) => None,
            res => Some(res),
        }
    }
}

impl<'a> Scanner<Chars<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.chars())
    }
}

impl<I: Iterator<Item = char>> Scanner<I> {
    pub fn new(characters: I) -> Self {
        let mut characters = TextLocator::new(characters);
        let cache = characters.next();
        Self { characters, cache }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind::*;
        self.skip_trivia();
        let Some(lc) = self.next_char() else {
            return Ok(Token {
                location: self.characters.location(),
                kind: Eof,
            });
        };

        let kind = match lc.value {
            '0'..='9' | '.' => self.num(&lc)?,
            c if c.is_alphabetic() => self.keyword(&lc)?,
            '+' => Plus,
            '-' => Minus,
            '*' => Asterisk,
            '/' => ForwardSlash,
            '^' => Hat,
            '%' => Mod,
            '&' => Ampersand,
            '|' => Pipe,
            '(' => OpenParen,
            ')' => CloseParen,
            '=' => self.require_equals(&lc, DoubleEquals)?,
            '!' => self.require_equals(&lc, NotEqual)?,
            '<' => self.optional_equals(LessThan, LessThanOrEqual),
            '>' => self.optional_equals(GreaterThan, GreaterThanOrEqual),
            c => return Err(LexError::Char(c, lc.location)),
        };

        let token = Token {
            location: lc.location,
            kind,
        };
        trace!("scanned `{}` at {}", token.kind, token.location);
        Ok(token)
    }

    fn next_char(&mut self) -> Option<LocatedCharacter> {
        replace(&mut self.cache, self.characters.next())
    }

    fn next_if<C>(&mut self, mut cond: C) -> Option<LocatedCharacter>
    where
        C: FnMut(char) -> bool,
    {
        let Some(lc) = &self.cache else {
            return None;
        };
        if cond(lc.value) {
            self.next_char()
        } else {
            None
        }
    }

    fn collect_while<T>(&mut self, mut cond: T, output: &mut String) -> Option<LocatedCharacter>
    where
        T: FnMut(char) -> bool,
    {
        let mut final_char = None;
        while let Some(lc) = self.next_if(&mut cond) {
            output.push(lc.value);
            final_char = Some(lc);
        }
        final_char
    }

    /// Whitespace and `#` comments, the latter up to and including the newline.
    fn skip_trivia(&mut self) {
        loop {
            if self.next_if(char::is_whitespace).is_some() {
                continue;
            }
            if self.next_if(|c| c == '#').is_some() {
                while self.next_if(|c| c != '\n').is_some() {}
                self.next_char();
                continue;
            }
            break;
        }
    }

    fn num(&mut self, lc: &LocatedCharacter) -> Result<TokenKind, LexError> {
        let mut nums = String::new();
        nums.push(lc.value);
        let mut seen_point = lc.value == '.';
        while let Some(next) = self.next_if(|c| c.is_ascii_digit() || c == '.') {
            if next.value == '.' {
                if seen_point {
                    return Err(LexError::SecondDecimalPoint(next.location));
                }
                seen_point = true;
            }
            nums.push(next.value);
        }

        if nums.starts_with('.') {
            nums.insert(0, '0');
        }
        if nums.ends_with('.') {
            nums.push('0');
        }
        match nums.parse() {
            Ok(n) => Ok(TokenKind::Number(n)),
            Err(_) => Err(LexError::Number(nums, lc.location)),
        }
    }

    fn keyword(&mut self, lc: &LocatedCharacter) -> Result<TokenKind, LexError> {
        let mut id = String::new();
        id.push(lc.value);
        self.collect_while(|c| c == '_' || c.is_alphanumeric(), &mut id);

        let upper = id.to_uppercase();
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == upper)
            .map(|(_, kind)| *kind)
            .ok_or(LexError::UnknownIdentifier(id, lc.location))
    }

    fn require_equals(
        &mut self,
        lc: &LocatedCharacter,
        kind: TokenKind,
    ) -> Result<TokenKind, LexError> {
        match self.next_if(|c| c == '=') {
            Some(_) => Ok(kind),
            None => Err(LexError::IncompleteOperator(lc.value, lc.location)),
        }
    }

    fn optional_equals(&mut self, single: TokenKind, with_equals: TokenKind) -> TokenKind {
        match self.next_if(|c| c == '=') {
            Some(_) => with_equals,
            None => single,
        }
    }
}
