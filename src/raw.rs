use crate::token;

/// Directive keyword of a line starting with `.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    Model,
    Inputs,
    Outputs,
    Names,
    Subckt,
    Gate,
    /// EBLIF net-to-net connection
    Conn,
    /// EBLIF cell instance name
    Cname,
    /// EBLIF cell attribute
    Attr,
    /// EBLIF cell parameter
    Param,
    End,
    Other(String),
}

impl From<&str> for Keyword {
    fn from(value: &str) -> Self {
        match value {
            ".model" => Self::Model,
            ".inputs" => Self::Inputs,
            ".outputs" => Self::Outputs,
            ".names" => Self::Names,
            ".subckt" => Self::Subckt,
            ".gate" => Self::Gate,
            ".conn" => Self::Conn,
            ".cname" => Self::Cname,
            ".attr" => Self::Attr,
            ".param" => Self::Param,
            ".end" => Self::End,
            s => Self::Other(s.to_owned()),
        }
    }
}

impl Keyword {
    pub fn is_eblif(&self) -> bool {
        matches!(self, Self::Conn | Self::Cname | Self::Attr | Self::Param)
    }
}

/// A directive line split into keyword and tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub line: usize,
    /// The keyword exactly as written, `.subckt` etc.
    pub word: &'a str,
    pub keyword: Keyword,
    pub tokens: Vec<&'a str>,
}

impl<'a> Directive<'a> {
    /// Classify one logical line. Cover rows and blank lines are not directives.
    pub fn parse(line: usize, text: &'a str) -> Option<Self> {
        let mut tokens = token::split(text);
        if !tokens.first()?.starts_with('.') {
            return None;
        }
        let word = tokens.remove(0);
        Some(Directive {
            line,
            word,
            keyword: word.into(),
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(".names a b y", Keyword::Names, 3)]
    #[case("  .subckt LUT2 I0=a O=y", Keyword::Subckt, 3)]
    #[case(".latch d q re clk 0", Keyword::Other(".latch".to_owned()), 5)]
    #[case(".end", Keyword::End, 0)]
    fn classifies_directives(#[case] text: &str, #[case] keyword: Keyword, #[case] n: usize) {
        let d = Directive::parse(1, text).unwrap();
        assert_eq!(d.keyword, keyword);
        assert_eq!(d.tokens.len(), n);
    }

    #[rstest]
    #[case("11 1")]
    #[case("")]
    #[case("# .names a b")]
    fn cover_rows_are_not_directives(#[case] text: &str) {
        assert!(Directive::parse(1, text).is_none());
    }
}
