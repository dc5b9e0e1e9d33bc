use crate::{
    error::BlifError,
    raw::{Directive, Keyword},
    token, NodeKind,
};

/// A cell directive with its output resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellRecord {
    pub(crate) kind: NodeKind,
    pub(crate) line: usize,
    pub(crate) tokens: Vec<String>,
    pub(crate) output_contact: String,
}

fn incomplete(d: &Directive, reason: &str, near: Option<&str>) -> BlifError {
    BlifError::IncompleteCell {
        directive: d.word.to_owned(),
        reason: reason.to_owned(),
        near: near.unwrap_or_default().to_owned(),
    }
}

impl<'a> TryFrom<&Directive<'a>> for CellRecord {
    type Error = BlifError;

    fn try_from(d: &Directive<'a>) -> Result<Self, Self::Error> {
        let kind = match d.keyword {
            Keyword::Names | Keyword::Conn => NodeKind::Names,
            Keyword::Subckt => NodeKind::Subckt,
            Keyword::Gate => NodeKind::Gate,
            _ => return Err(incomplete(d, "not a cell directive", None)),
        };
        let mut tokens: Vec<String> = d.tokens.iter().map(|t| t.to_string()).collect();

        let output_contact = match d.keyword {
            Keyword::Conn if tokens.len() != 2 => {
                return Err(incomplete(d, "expected two nets", d.tokens.last().copied()))
            }
            Keyword::Names | Keyword::Conn => match tokens.last() {
                Some(out) => out.clone(),
                None => return Err(incomplete(d, "no nets", None)),
            },
            _ => {
                if tokens.len() < 2 {
                    return Err(incomplete(d, "no pin connections", d.tokens.first().copied()));
                }
                // The output pin may be written before a trailing reset pin
                let n = tokens.len();
                if n > 2 && token::is_reset_pin(&tokens[n - 1]) {
                    tokens.swap(n - 2, n - 1);
                }
                let last = &tokens[n - 1];
                match token::PortConn::parse(last) {
                    Some(conn) if !conn.net.is_empty() => conn.net.to_owned(),
                    _ => return Err(incomplete(d, "no output connection", Some(last.as_str()))),
                }
            }
        };

        Ok(CellRecord {
            kind,
            line: d.line,
            tokens,
            output_contact,
        })
    }
}
