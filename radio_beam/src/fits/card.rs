//! Single 80-column FITS header cards.
//!
//! Only the fixed/free value formats needed for header keywords are handled:
//! logical, integer, real and character-string values plus commentary cards.
//! Complex values and `CONTINUE` long strings are kept as commentary text.

use std::fmt;

use crate::error::{BeamError, BeamResult};

/// Width of one header card.
pub const CARD_LENGTH: usize = 80;

/// Keyword field width.
const KEYWORD_LENGTH: usize = 8;

/// Longest string value that fits between the quotes of a value card.
const MAX_STRING_LENGTH: usize = CARD_LENGTH - KEYWORD_LENGTH - 4;

/// Stand-in for characters a card cannot hold.
const REPLACEMENT_CHAR: char = '?';

/// Keywords whose cards carry free text instead of a value.
const COMMENTARY_KEYWORDS: [&str; 3] = ["COMMENT", "HISTORY", ""];

/// Value stored in a keyword card.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Undefined,
}

impl HeaderValue {
    /// Numeric value, if the card holds an integer or a real.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// String value, if the card holds one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value field as it appears after `= `.
    fn render(&self) -> String {
        match self {
            Self::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
            Self::Integer(i) => format!("{:>20}", i),
            Self::Real(r) => format!("{:>20}", format_real(*r)),
            Self::Text(s) => format!("'{:<8}'", quote_text(s)),
            Self::Undefined => String::new(),
        }
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Logical(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", format_real(*r)),
            Self::Text(s) => write!(f, "{}", s),
            Self::Undefined => Ok(()),
        }
    }
}

/// Escape a string value for a card, clipping it so the closing quote
/// still fits. A doubled quote is never split.
fn quote_text(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len().min(MAX_STRING_LENGTH));
    for ch in text.chars().map(to_card_char) {
        let width = if ch == '\'' { 2 } else { 1 };
        if quoted.len() + width > MAX_STRING_LENGTH {
            log::warn!(
                "String value longer than {} characters clipped: '{}'",
                MAX_STRING_LENGTH,
                text
            );
            break;
        }
        quoted.push(ch);
        if ch == '\'' {
            quoted.push('\'');
        }
    }
    quoted
}

/// Cards hold printable ASCII only.
fn to_card_char(ch: char) -> char {
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch
    } else {
        REPLACEMENT_CHAR
    }
}

/// Shortest round-trip representation with an upper-case exponent.
fn format_real(value: f64) -> String {
    let repr = format!("{:?}", value).to_uppercase();
    if repr.contains('.') || repr.contains('E') || repr.contains("INF") || repr.contains("NAN") {
        repr
    } else {
        format!("{}.0", repr)
    }
}

/// One header card.
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    /// `KEYWORD = value / comment`
    Keyword {
        keyword: String,
        value: HeaderValue,
        comment: Option<String>,
    },
    /// `HISTORY`, `COMMENT`, blank-keyword and any card without a value indicator.
    Commentary { keyword: String, text: String },
}

impl Card {
    /// New value card. The keyword is normalised to upper case.
    pub fn new(keyword: &str, value: impl Into<HeaderValue>) -> Self {
        Self::Keyword {
            keyword: keyword.trim().to_uppercase(),
            value: value.into(),
            comment: None,
        }
    }

    /// New `HISTORY` card.
    pub fn history(text: impl Into<String>) -> Self {
        Self::Commentary {
            keyword: "HISTORY".to_string(),
            text: text.into(),
        }
    }

    /// New `COMMENT` card.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Commentary {
            keyword: "COMMENT".to_string(),
            text: text.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        match self {
            Self::Keyword { keyword, .. } | Self::Commentary { keyword, .. } => keyword,
        }
    }

    pub fn value(&self) -> Option<&HeaderValue> {
        match self {
            Self::Keyword { value, .. } => Some(value),
            Self::Commentary { .. } => None,
        }
    }

    /// Free text of a commentary card.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Commentary { text, .. } => Some(text),
            Self::Keyword { .. } => None,
        }
    }

    /// Parse one card image. `line` is the 1-based card index used in errors.
    pub fn parse(image: &str, line: usize) -> BeamResult<Self> {
        if !image.is_ascii() {
            return Err(BeamError::header_parse(line, "card contains non-ASCII characters"));
        }
        let image = image.trim_end_matches(['\r', '\n']);
        if image.len() > CARD_LENGTH {
            return Err(BeamError::header_parse(
                line,
                format!("card is {} characters long (max {})", image.len(), CARD_LENGTH),
            ));
        }

        let keyword_end = image.len().min(KEYWORD_LENGTH);
        let keyword = image[..keyword_end].trim().to_uppercase();
        if keyword.contains(' ') {
            return Err(BeamError::header_parse(line, format!("invalid keyword '{}'", keyword)));
        }
        let rest = &image[keyword_end..];

        let is_commentary = COMMENTARY_KEYWORDS.contains(&keyword.as_str());
        if is_commentary || (!rest.starts_with("= ") && rest != "=") {
            return Ok(Self::Commentary {
                keyword,
                text: rest.trim_end().to_string(),
            });
        }

        let field = rest.get(2..).unwrap_or("");
        let (value, comment) = parse_value_field(field, line)?;
        Ok(Self::Keyword {
            keyword,
            value,
            comment,
        })
    }

    /// Render the card as an 80-column image padded with spaces.
    ///
    /// Characters outside printable ASCII become `?`. Over-long string values
    /// are clipped inside their quotes; comments and commentary text are cut
    /// at column 80.
    pub fn to_image(&self) -> String {
        let mut image = match self {
            Self::Keyword {
                keyword,
                value,
                comment,
            } => {
                let mut s = format!("{:<8}= {}", keyword, value.render());
                if let Some(comment) = comment {
                    s.push_str(" / ");
                    s.push_str(comment);
                }
                s
            }
            Self::Commentary { keyword, text } => format!("{:<8}{}", keyword, text),
        };
        let mut image: String = image.chars().map(to_card_char).collect();
        image.truncate(CARD_LENGTH);
        format!("{:<80}", image)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_image().trim_end())
    }
}

/// Split a value field into the value and the optional comment.
fn parse_value_field(field: &str, line: usize) -> BeamResult<(HeaderValue, Option<String>)> {
    let trimmed = field.trim_start();

    if let Some(body) = trimmed.strip_prefix('\'') {
        let mut text = String::new();
        let mut chars = body.char_indices().peekable();
        let mut closing = None;
        while let Some((idx, ch)) = chars.next() {
            if ch == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    text.push('\'');
                    chars.next();
                    continue;
                }
                closing = Some(idx);
                break;
            }
            text.push(ch);
        }
        let closing =
            closing.ok_or_else(|| BeamError::header_parse(line, "unterminated string value"))?;
        let comment = extract_comment(&body[closing + 1..]);
        return Ok((HeaderValue::Text(text.trim_end().to_string()), comment));
    }

    let (raw, comment) = match trimmed.find('/') {
        Some(pos) => (&trimmed[..pos], extract_comment(&trimmed[pos..])),
        None => (trimmed, None),
    };
    let raw = raw.trim();

    let value = match raw {
        "" => HeaderValue::Undefined,
        "T" => HeaderValue::Logical(true),
        "F" => HeaderValue::Logical(false),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                HeaderValue::Integer(i)
            } else {
                let normalised = raw.replace(['D', 'd'], "E");
                normalised.parse::<f64>().map(HeaderValue::Real).map_err(|_| {
                    BeamError::header_parse(line, format!("unsupported value '{}'", raw))
                })?
            }
        }
    };
    Ok((value, comment))
}

fn extract_comment(rest: &str) -> Option<String> {
    let rest = rest.trim();
    let comment = rest.strip_prefix('/')?.trim();
    if comment.is_empty() {
        None
    } else {
        Some(comment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_real_with_comment() {
        let card = Card::parse(
            "BMAJ    =   1.7599000000000E-03 / Beam major axis in degrees",
            1,
        )
        .unwrap();
        assert_eq!(card.keyword(), "BMAJ");
        assert_eq!(card.value().and_then(HeaderValue::as_f64), Some(1.7599e-3));
        match card {
            Card::Keyword { comment, .. } => {
                assert_eq!(comment.as_deref(), Some("Beam major axis in degrees"))
            }
            _ => panic!("expected keyword card"),
        }
    }

    #[test]
    fn test_parse_fortran_exponent() {
        let card = Card::parse("CDELT1  = -2.7777777777778D-04", 1).unwrap();
        let value = card.value().and_then(HeaderValue::as_f64).unwrap();
        assert!((value + 2.7777777777778e-4).abs() < 1e-18);
    }

    #[test]
    fn test_parse_string_with_escaped_quote() {
        let card = Card::parse("OBJECT  = 'M31''s core  ' / target", 1).unwrap();
        assert_eq!(card.value(), Some(&HeaderValue::Text("M31's core".to_string())));
    }

    #[test]
    fn test_parse_logical_and_integer() {
        let simple = Card::parse("SIMPLE  =                    T", 1).unwrap();
        assert_eq!(simple.value(), Some(&HeaderValue::Logical(true)));
        let naxis = Card::parse("NAXIS   =                    2", 2).unwrap();
        assert_eq!(naxis.value(), Some(&HeaderValue::Integer(2)));
    }

    #[test]
    fn test_history_card_keeps_text() {
        let card = Card::parse(
            "HISTORY AIPS   CLEAN BMAJ=  1.7599E-03 BMIN=  1.5740E-03 BPA=   2.61",
            3,
        )
        .unwrap();
        assert_eq!(card.keyword(), "HISTORY");
        assert!(card.text().unwrap().contains("BMAJ=  1.7599E-03"));
    }

    #[test]
    fn test_rejects_malformed_cards() {
        assert!(Card::parse("OBJECT  = 'unterminated", 7).is_err());
        assert!(Card::parse("NAXIS1  = twelve", 8).is_err());
        let long = "X".repeat(81);
        assert!(Card::parse(&long, 9).is_err());
    }

    #[test]
    fn test_image_is_80_columns_and_reparses() {
        let card = Card::new("bpa", 2.61);
        let image = card.to_image();
        assert_eq!(image.len(), CARD_LENGTH);
        assert!(image.starts_with("BPA     = "));
        assert_eq!(Card::parse(&image, 1).unwrap(), card);

        let text = Card::new("BUNIT", "Jy/beam").to_image();
        assert!(text.starts_with("BUNIT   = 'Jy/beam '"));
    }

    #[test]
    fn test_long_string_value_keeps_closing_quote() {
        let card = Card::new("OBJECT", "x".repeat(70));
        let image = card.to_image();
        assert_eq!(image.len(), CARD_LENGTH);
        assert!(image.ends_with('\''));
        let reparsed = Card::parse(&image, 1).unwrap();
        assert_eq!(reparsed.value(), Some(&HeaderValue::Text("x".repeat(MAX_STRING_LENGTH))));

        // a doubled quote is dropped whole rather than split
        let card = Card::new("OBJECT", format!("{}'", "y".repeat(MAX_STRING_LENGTH - 1)));
        let reparsed = Card::parse(&card.to_image(), 1).unwrap();
        assert_eq!(
            reparsed.value(),
            Some(&HeaderValue::Text("y".repeat(MAX_STRING_LENGTH - 1)))
        );
    }

    #[test]
    fn test_non_ascii_text_is_replaced() {
        let card = Card::history(format!("a{}", "\u{e9}".repeat(100)));
        let image = card.to_image();
        assert_eq!(image.len(), CARD_LENGTH);
        assert!(image.is_ascii());
        assert!(image.starts_with("HISTORY a???"));

        let card = Card::new("OBSERVER", "Bj\u{f6}rk");
        let reparsed = Card::parse(&card.to_image(), 1).unwrap();
        assert_eq!(reparsed.value(), Some(&HeaderValue::Text("Bj?rk".to_string())));
    }

    #[test]
    fn test_real_formatting_keeps_decimal_point() {
        assert_eq!(format_real(2.0), "2.0");
        assert_eq!(format_real(1e-10), "1E-10");
        assert_eq!(format_real(0.0017599), "0.0017599");
    }
}
