use logos::{Logos, SpannedIter};

/// Iterator over the whitespace separated tokens of one line
pub struct TokenIter<'a> {
    input: &'a str,
    iter: SpannedIter<'a, LogosTokenKind>,
}

impl<'a> TokenIter<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: LogosTokenKind::lexer(input).spanned(),
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match self.iter.next()? {
            (Ok(LogosTokenKind::Word), span) => Some(&self.input[span]),
            (Ok(LogosTokenKind::Comment | LogosTokenKind::WS), _) => unreachable!(),
            // Anything the lexer does not know is still part of a name
            (Err(_), span) => Some(&self.input[span]),
        }
    }
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
enum LogosTokenKind {
    #[regex(r"[^ \t\r\f\n#]+")]
    Word,
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,
    #[regex(r"[ \t\r\f\n]+", logos::skip)]
    WS,
}

/// Split a line into tokens. `key=value` pairs are kept whole.
pub fn split(line: &str) -> Vec<&str> {
    TokenIter::new(line).collect()
}

/// A `.subckt`/`.gate` pin connection: `PORT=NET` or `PORT[IDX]=NET`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConn<'a> {
    pub port: &'a str,
    pub index: Option<&'a str>,
    pub net: &'a str,
}

impl<'a> PortConn<'a> {
    pub fn parse(token: &'a str) -> Option<Self> {
        let (pin, net) = token.rsplit_once('=')?;
        let (port, index) = match pin.strip_suffix(']').and_then(|p| p.split_once('[')) {
            Some((port, index)) => (port, Some(index)),
            None => (pin, None),
        };
        Some(PortConn { port, index, net })
    }
}

/// Net named by a connection token: the text after the last `=`, or the whole token
pub fn contact(token: &str) -> &str {
    token.rsplit_once('=').map_or(token, |(_, net)| net)
}

/// Reset pins follow the `R=` naming convention
pub fn is_reset_pin(token: &str) -> bool {
    token.starts_with("R=")
}
