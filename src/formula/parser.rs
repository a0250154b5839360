//! Formula tokenizer and recursive-descent parser.
//!
//! Grammar, loosest binding first: comparison, text concatenation (`&`),
//! additive, multiplicative, unary sign, exponent (`^`, right-associative),
//! postfix percent, primary. Primaries are numbers, string literals,
//! TRUE/FALSE, cell references (absolute `$` markers accepted and
//! discarded), rectangular ranges, function calls, and parenthesized
//! expressions.

use super::ErrorKind;
use crate::model::column_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    /// Postfix `%`: divides by 100.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Single-cell reference, 1-based.
    CellRef { row: u32, col: u32 },
    /// Rectangular range between two corners, inclusive.
    Range { start: (u32, u32), end: (u32, u32) },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    Punct(char),
    // Two-character comparison operators.
    Le,
    Ge,
    Ne,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ErrorKind> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // Exponent suffix like 1e-3.
                if i < bytes.len() && (bytes[i] | 0x20) == b'e' {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let n = src[start..i].parse().map_err(|_| ErrorKind::Parse)?;
                tokens.push(Token::Number(n));
            }
            b'"' => {
                i += 1;
                let mut text = String::new();
                loop {
                    if i >= bytes.len() {
                        return Err(ErrorKind::Parse);
                    }
                    if bytes[i] == b'"' {
                        // Doubled quote escapes a quote.
                        if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                            text.push('"');
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    let ch = src[i..].chars().next().ok_or(ErrorKind::Parse)?;
                    text.push(ch);
                    i += ch.len_utf8();
                }
                tokens.push(Token::Text(text));
            }
            b'$' | b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(src[start..i].to_string()));
            }
            b'<' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                    tokens.push(Token::Le);
                    i += 2;
                } else if i + 1 < bytes.len() && bytes[i + 1] == b'>' {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Punct('<'));
                    i += 1;
                }
            }
            b'>' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Punct('>'));
                    i += 1;
                }
            }
            b'+' | b'-' | b'*' | b'/' | b'^' | b'&' | b'%' | b'(' | b')' | b',' | b':' | b'=' => {
                tokens.push(Token::Punct(b as char));
                i += 1;
            }
            _ => return Err(ErrorKind::Parse),
        }
    }
    Ok(tokens)
}

/// Split an identifier like `$B$12` into a (row, col) pair, if it is an
/// A1-style reference.
fn ident_as_cell_ref(ident: &str) -> Option<(u32, u32)> {
    let s = ident.strip_prefix('$').unwrap_or(ident);
    let letters_len = s.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    if letters_len == 0 {
        return None;
    }
    let letters = s[..letters_len].to_ascii_uppercase();
    let rest = s[letters_len..].strip_prefix('$').unwrap_or(&s[letters_len..]);
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: u32 = rest.parse().ok()?;
    let col = column_index(&letters);
    if row == 0 || col == 0 {
        return None;
    }
    Some((row, col))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parse formula source (without the leading `=`) into an expression tree.
pub fn parse(src: &str) -> Result<Expr, ErrorKind> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ErrorKind::Parse);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.comparison()?;
    if parser.pos != parser.tokens.len() {
        return Err(ErrorKind::Parse);
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn comparison(&mut self) -> Result<Expr, ErrorKind> {
        let mut lhs = self.concat()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct('=')) => BinOp::Eq,
                Some(Token::Punct('<')) => BinOp::Lt,
                Some(Token::Punct('>')) => BinOp::Gt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Ge) => BinOp::Ge,
                Some(Token::Ne) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.concat()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn concat(&mut self) -> Result<Expr, ErrorKind> {
        let mut lhs = self.additive()?;
        while self.eat_punct('&') {
            let rhs = self.additive()?;
            lhs = Expr::Binary {
                op: BinOp::Concat,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ErrorKind> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct('+')) => BinOp::Add,
                Some(Token::Punct('-')) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ErrorKind> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct('*')) => BinOp::Mul,
                Some(Token::Punct('/')) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ErrorKind> {
        if self.eat_punct('-') {
            let expr = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            });
        }
        if self.eat_punct('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ErrorKind> {
        let base = self.postfix()?;
        if self.eat_punct('^') {
            // Right-associative.
            let exp = self.unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, ErrorKind> {
        let mut expr = self.primary()?;
        while self.eat_punct('%') {
            expr = Expr::Unary {
                op: UnaryOp::Percent,
                expr: Box::new(expr),
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ErrorKind> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s)),
            Some(Token::Punct('(')) => {
                let inner = self.comparison()?;
                if !self.eat_punct(')') {
                    return Err(ErrorKind::Parse);
                }
                Ok(inner)
            }
            Some(Token::Ident(ident)) => {
                if self.eat_punct('(') {
                    return self.call(ident);
                }
                match ident.to_ascii_uppercase().as_str() {
                    "TRUE" => return Ok(Expr::Bool(true)),
                    "FALSE" => return Ok(Expr::Bool(false)),
                    _ => {}
                }
                let Some(start) = ident_as_cell_ref(&ident) else {
                    return Err(ErrorKind::Name);
                };
                if self.eat_punct(':') {
                    let end = match self.bump() {
                        Some(Token::Ident(end_ident)) => {
                            ident_as_cell_ref(&end_ident).ok_or(ErrorKind::Ref)?
                        }
                        _ => return Err(ErrorKind::Parse),
                    };
                    return Ok(Expr::Range { start, end });
                }
                Ok(Expr::CellRef {
                    row: start.0,
                    col: start.1,
                })
            }
            _ => Err(ErrorKind::Parse),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, ErrorKind> {
        let mut args = Vec::new();
        if self.eat_punct(')') {
            return Ok(Expr::Call {
                name: name.to_ascii_uppercase(),
                args,
            });
        }
        loop {
            args.push(self.comparison()?);
            if self.eat_punct(',') {
                continue;
            }
            if self.eat_punct(')') {
                break;
            }
            return Err(ErrorKind::Parse);
        }
        Ok(Expr::Call {
            name: name.to_ascii_uppercase(),
            args,
        })
    }
}
