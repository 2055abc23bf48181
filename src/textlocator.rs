use std::{
    fmt::{Display, Formatter},
    iter::Fuse,
    str::Chars,
};

/// One-indexed position of a character in the source text.
#[derive(Debug, Copy, Clone, PartialOrd, Ord, Eq, PartialEq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const START: Location = Location { line: 1, column: 1 };
}

impl Default for Location {
    fn default() -> Self {
        Self::START
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone)]
pub struct LocatedCharacter {
    pub value: char,
    pub location: Location,
}

/// Wraps a character source and stamps every character with where it was found.
#[derive(Debug)]
pub struct TextLocator<I: Iterator<Item = char>> {
    characters: Fuse<I>,
    next: Location,
}

impl<I: Iterator<Item = char>> Iterator for TextLocator<I> {
    type Item = LocatedCharacter;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.characters.next()?;
        let location = self.next;
        if value == '\n' {
            self.next.line += 1;
            self.next.column = 1;
        } else {
            self.next.column += 1;
        }
        Some(LocatedCharacter { value, location })
    }
}

impl<'a> TextLocator<Chars<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.chars())
    }
}

impl<I: Iterator<Item = char>> TextLocator<I> {
    pub fn new(text: I) -> Self {
        Self {
            characters: text.fuse(),
            next: Location::START,
        }
    }

    /// Location the next character will be reported at; past the end once exhausted.
    pub fn location(&self) -> Location {
        self.next
    }
}
