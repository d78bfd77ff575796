use super::token::*;
use super::Position;
use std::iter::Peekable;
use std::str::CharIndices;

pub fn lex(s: &str) -> Vec<(Token, Position)> {
    Lexer::new(s).collect()
}

fn is_scene_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn is_scene_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_scene_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Produces tokens tagged with their position. Whitespace and `//`
/// comments are dropped.
#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    row: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Lexer<'a> {
        Lexer {
            src,
            chars: src.char_indices().peekable(),
            row: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn offset(&mut self) -> usize {
        match self.chars.peek() {
            Some((i, _)) => *i,
            None => self.src.len(),
        }
    }

    /// Position of the next unread character.
    pub fn here(&mut self) -> Position {
        Position {
            row: self.row,
            col: self.col,
            offset: self.offset(),
            len: 0,
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if is_scene_whitespace(ch) {
                self.bump();
            } else if ch == '/' && self.peek_second() == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Token {
        let mut s = String::new();
        let mut real = false;
        let mut exp = false;
        while let Some(ch) = self.peek() {
            if is_scene_digit(ch) {
                s.push(ch);
            } else if ch == '.' && !real && !exp {
                real = true;
                s.push(ch);
            } else if (ch == 'e' || ch == 'E') && !exp {
                exp = true;
                real = true;
                s.push(ch);
                self.bump();
                if let Some(sign) = self.peek() {
                    if sign == '+' || sign == '-' {
                        s.push(sign);
                        self.bump();
                    }
                }
                continue;
            } else {
                break;
            }
            self.bump();
        }
        if real {
            match s.parse::<f32>() {
                Ok(n) => Token::Real(n),
                Err(_) => Token::Unknown(s),
            }
        } else {
            match s.parse::<i64>() {
                Ok(n) => Token::Integer(n),
                Err(_) => Token::Unknown(s),
            }
        }
    }

    fn text(&mut self) -> Token {
        let mut s = String::new();
        self.bump();
        loop {
            match self.bump() {
                Some('"') => return Token::Text(s.into()),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(ch) => s.push(ch),
                    None => break,
                },
                Some(ch) => s.push(ch),
                None => break,
            }
        }
        Token::Unknown(format!("\"{}", s))
    }

    fn alphabetic(&mut self) -> Token {
        let mut s = String::new();
        while let Some(ch) = self.peek() {
            if !is_scene_alphabetic(ch) && !is_scene_digit(ch) {
                break;
            }
            s.push(ch);
            self.bump();
        }
        match Word::from_str(&s) {
            Some(word) => Token::Word(word),
            None => Token::Ident(s.into()),
        }
    }

    fn minutia(&mut self) -> Token {
        let mut s = String::new();
        if let Some(ch) = self.bump() {
            s.push(ch);
        }
        if let Some(pk) = self.peek() {
            let mut two = s.clone();
            two.push(pk);
            if let Some(t) = Token::from_punctuation(&two) {
                self.bump();
                return t;
            }
        }
        match Token::from_punctuation(&s) {
            Some(t) => t,
            None => Token::Unknown(s),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Token, Position);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        let pk = self.peek()?;
        let offset = self.offset();
        let (row, col) = (self.row, self.col);
        let token = if is_scene_digit(pk) || (pk == '.' && self.peek_second().map_or(false, is_scene_digit)) {
            self.number()
        } else if is_scene_alphabetic(pk) {
            self.alphabetic()
        } else if pk == '"' {
            self.text()
        } else {
            self.minutia()
        };
        let len = self.offset() - offset;
        Some((
            token,
            Position {
                row,
                col,
                offset,
                len,
            },
        ))
    }
}
