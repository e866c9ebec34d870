//! Element-name tokens of the AbiWord vocabulary.

/// Recognized element names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `<abiword>` document root
    Abiword,
    /// `<metadata>` block
    Metadata,
    /// `<m>` metadata entry
    M,
    /// `<history>` block
    History,
    /// `<revisions>` block
    Revisions,
    /// `<ignoredwords>` block
    IgnoredWords,
    /// `<s>` style definition
    S,
    /// `<l>` list definition
    L,
    /// `<pagesize>`
    PageSize,
    /// `<section>`
    Section,
    /// `<d>` data definition
    D,
    /// `<p>` paragraph
    P,
    /// `<c>` character span
    C,
    /// `<cbr>` column break
    Cbr,
    /// `<pbr>` page break
    Pbr,
    /// `<br>` line break
    Br,
    /// `<a>` hyperlink
    A,
    /// `<foot>` footnote
    Foot,
    /// `<endnote>`
    Endnote,
    /// `<table>`
    Table,
    /// `<cell>`
    Cell,
    /// `<image>`
    Image,
    /// Anything else; ignored for forward compatibility
    Unknown,
}

impl Token {
    /// Map a raw element name to its token.
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"abiword" => Token::Abiword,
            b"metadata" => Token::Metadata,
            b"m" => Token::M,
            b"history" => Token::History,
            b"revisions" => Token::Revisions,
            b"ignoredwords" => Token::IgnoredWords,
            b"s" => Token::S,
            b"l" => Token::L,
            b"pagesize" => Token::PageSize,
            b"section" => Token::Section,
            b"d" => Token::D,
            b"p" => Token::P,
            b"c" => Token::C,
            b"cbr" => Token::Cbr,
            b"pbr" => Token::Pbr,
            b"br" => Token::Br,
            b"a" => Token::A,
            b"foot" => Token::Foot,
            b"endnote" => Token::Endnote,
            b"table" => Token::Table,
            b"cell" => Token::Cell,
            b"image" => Token::Image,
            _ => Token::Unknown,
        }
    }

    /// Check whether this token is recognized.
    pub fn is_known(&self) -> bool {
        !matches!(self, Token::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(Token::from_name(b"p"), Token::P);
        assert_eq!(Token::from_name(b"ignoredwords"), Token::IgnoredWords);
        assert_eq!(Token::from_name(b"image"), Token::Image);
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(Token::from_name(b"field"), Token::Unknown);
        assert_eq!(Token::from_name(b"P"), Token::Unknown);
        assert!(!Token::from_name(b"").is_known());
    }
}
