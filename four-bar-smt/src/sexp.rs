//! Owned S-expressions, the interchange format of SMT-LIB solvers.
use crate::{Error, Result};

/// An owned S-expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sexp {
    /// Symbol, numeral or keyword
    Atom(String),
    /// Parenthesized list
    List(Vec<Sexp>),
}

impl Sexp {
    /// Create an atom.
    pub fn atom<S: Into<String>>(s: S) -> Self {
        Self::Atom(s.into())
    }

    /// Create a list headed by an operator symbol.
    pub fn app<I>(op: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Sexp>,
    {
        let mut v = vec![Self::atom(op)];
        v.extend(args);
        Self::List(v)
    }

    /// Get the atom text.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Get the list items.
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Self::Atom(_) => None,
            Self::List(v) => Some(v),
        }
    }

    /// Split an application into its head symbol and arguments.
    pub fn as_app(&self) -> Option<(&str, &[Sexp])> {
        let (head, args) = self.as_list()?.split_first()?;
        Some((head.as_atom()?, args))
    }

    /// Read exactly one S-expression from text.
    pub fn parse(s: &str) -> Result<Self> {
        let tokens = tokenize(s)?;
        let mut pos = 0;
        let sexp = read(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(Error::Protocol(format!("trailing input in {s:?}")));
        }
        Ok(sexp)
    }
}

impl std::fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Atom(s) => write!(f, "{s}"),
            Self::List(v) => {
                write!(f, "(")?;
                for (i, s) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{s}")?;
                }
                write!(f, ")")
            }
        }
    }
}

enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(s: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start();
        let Some(c) = rest.chars().next() else { break };
        match c {
            '(' => {
                tokens.push(Token::Open);
                rest = &rest[1..];
            }
            ')' => {
                tokens.push(Token::Close);
                rest = &rest[1..];
            }
            ';' => rest = rest.find('\n').map_or("", |i| &rest[i..]),
            '|' | '"' => {
                let end = rest[1..]
                    .find(c)
                    .ok_or_else(|| Error::Protocol(format!("unterminated {c} in {s:?}")))?;
                tokens.push(Token::Atom(&rest[..end + 2]));
                rest = &rest[end + 2..];
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                    .unwrap_or(rest.len());
                tokens.push(Token::Atom(&rest[..end]));
                rest = &rest[end..];
            }
        }
    }
    Ok(tokens)
}

fn read(tokens: &[Token], pos: &mut usize) -> Result<Sexp> {
    let tok = tokens
        .get(*pos)
        .ok_or_else(|| Error::Protocol("unexpected end of input".to_string()))?;
    *pos += 1;
    match tok {
        Token::Atom(s) => Ok(Sexp::atom(*s)),
        Token::Close => Err(Error::Protocol("unexpected ')'".to_string())),
        Token::Open => {
            let mut v = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Token::Close) => {
                        *pos += 1;
                        break Ok(Sexp::List(v));
                    }
                    Some(_) => v.push(read(tokens, pos)?),
                    None => break Err(Error::Protocol("unbalanced '('".to_string())),
                }
            }
        }
    }
}
