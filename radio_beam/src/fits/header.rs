//! Ordered FITS primary header.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::card::{Card, HeaderValue, CARD_LENGTH};
use crate::error::{BeamError, BeamResult};

/// Size of one FITS logical record.
pub const BLOCK_LENGTH: usize = 2880;

const END_KEYWORD: &str = "END";

/// FITS header as an ordered list of cards. The terminating `END` card is
/// implicit and never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<Card>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse header text.
    ///
    /// Accepts either newline separated cards (as printed by most tools) or a
    /// raw record string of concatenated 80-column cards. Parsing stops at the
    /// `END` card; a missing `END` is tolerated for text input.
    pub fn parse(text: &str) -> BeamResult<Self> {
        let lines: Vec<&str> = if text.contains('\n') {
            text.lines().collect()
        } else {
            if !text.is_ascii() {
                return Err(BeamError::header_parse(1, "header contains non-ASCII characters"));
            }
            text.as_bytes()
                .chunks(CARD_LENGTH)
                .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
                .collect()
        };

        let mut cards = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            if line.trim_end() == END_KEYWORD {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            cards.push(Card::parse(line, idx + 1)?);
        }
        log::debug!("Parsed FITS header with {} cards", cards.len());
        Ok(Self { cards })
    }

    /// Read the primary header from a FITS stream, one 2880-byte block at a time.
    pub fn read_primary<R: Read>(mut reader: R) -> BeamResult<Self> {
        let mut cards = Vec::new();
        let mut block = [0u8; BLOCK_LENGTH];
        let mut card_index = 0;

        loop {
            reader.read_exact(&mut block).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    BeamError::header_parse(card_index + 1, "end of file before END card")
                } else {
                    BeamError::io("<stream>", e)
                }
            })?;

            for chunk in block.chunks(CARD_LENGTH) {
                card_index += 1;
                let image = std::str::from_utf8(chunk).map_err(|_| {
                    BeamError::header_parse(card_index, "card contains non-ASCII characters")
                })?;
                if image.trim_end() == END_KEYWORD {
                    log::debug!("Read FITS primary header with {} cards", cards.len());
                    return Ok(Self { cards });
                }
                if image.trim().is_empty() {
                    continue;
                }
                cards.push(Card::parse(image, card_index)?);
            }
        }
    }

    /// Read the primary header of a FITS file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BeamResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BeamError::io(path, e))?;
        Self::read_primary(BufReader::new(file)).map_err(|e| match e {
            BeamError::Io { source, .. } => BeamError::io(path, source),
            other => other,
        })
    }

    /// First value stored under `keyword`.
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        let keyword = keyword.trim().to_uppercase();
        self.cards
            .iter()
            .filter_map(|card| match card {
                Card::Keyword { keyword: k, value, .. } if *k == keyword => Some(value),
                _ => None,
            })
            .next()
    }

    /// Numeric value stored under `keyword`.
    ///
    /// Returns `Ok(None)` when the keyword is absent and an error when it holds
    /// a non-numeric value.
    pub fn get_f64(&self, keyword: &str) -> BeamResult<Option<f64>> {
        match self.get(keyword) {
            None => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| BeamError::InvalidKeyword {
                keyword: keyword.to_uppercase(),
                message: format!("expected a number, found '{}'", value),
            }),
        }
    }

    /// Numeric value stored under `keyword`, failing if absent.
    pub fn require_f64(&self, keyword: &str) -> BeamResult<f64> {
        self.get_f64(keyword)?
            .ok_or_else(|| BeamError::missing_keyword(keyword.to_uppercase()))
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Set `keyword` to `value`, replacing an existing value in place (its
    /// comment is kept) or appending a new card.
    pub fn set(&mut self, keyword: &str, value: impl Into<HeaderValue>) {
        let keyword = keyword.trim().to_uppercase();
        let value = value.into();
        for card in &mut self.cards {
            if let Card::Keyword { keyword: k, value: v, .. } = card {
                if *k == keyword {
                    *v = value;
                    return;
                }
            }
        }
        self.cards.push(Card::Keyword {
            keyword,
            value,
            comment: None,
        });
    }

    /// Like [`FitsHeader::set`] but also replaces the card comment.
    pub fn set_with_comment(
        &mut self,
        keyword: &str,
        value: impl Into<HeaderValue>,
        comment: impl Into<String>,
    ) {
        self.set(keyword, value);
        let keyword = keyword.trim().to_uppercase();
        let comment = comment.into();
        for card in &mut self.cards {
            if let Card::Keyword { keyword: k, comment: c, .. } = card {
                if *k == keyword {
                    *c = Some(comment);
                    return;
                }
            }
        }
    }

    /// Set every `(keyword, value)` pair in order.
    pub fn update<K, V, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        V: Into<HeaderValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (keyword, value) in entries {
            self.set(keyword.as_ref(), value);
        }
    }

    /// Remove the first card stored under `keyword`.
    pub fn remove(&mut self, keyword: &str) -> Option<HeaderValue> {
        let keyword = keyword.trim().to_uppercase();
        let pos = self.cards.iter().position(|card| {
            matches!(card, Card::Keyword { keyword: k, .. } if *k == keyword)
        })?;
        match self.cards.remove(pos) {
            Card::Keyword { value, .. } => Some(value),
            Card::Commentary { .. } => None,
        }
    }

    /// Text of every `HISTORY` card, in header order.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.commentary("HISTORY")
    }

    /// Text of every `COMMENT` card, in header order.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.commentary("COMMENT")
    }

    fn commentary<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> {
        self.cards.iter().filter_map(move |card| match card {
            Card::Commentary { keyword: k, text } if k == keyword => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn add_history(&mut self, text: impl Into<String>) {
        self.cards.push(Card::history(text));
    }

    pub fn add_comment(&mut self, text: impl Into<String>) {
        self.cards.push(Card::comment(text));
    }

    /// Append an already-built card.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    /// Serialise as FITS records: 80-column cards, `END`, space padded to a
    /// multiple of 2880 bytes.
    pub fn to_fits_string(&self) -> String {
        let mut out = String::with_capacity((self.cards.len() + 1) * CARD_LENGTH);
        for card in &self.cards {
            out.push_str(&card.to_image());
        }
        out.push_str(&format!("{:<80}", END_KEYWORD));
        let remainder = out.len() % BLOCK_LENGTH;
        if remainder != 0 {
            out.push_str(&" ".repeat(BLOCK_LENGTH - remainder));
        }
        out
    }

    /// Write the header records to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.to_fits_string().as_bytes())
    }
}

impl<'a> IntoIterator for &'a FitsHeader {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Card> for FitsHeader {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FitsHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            writeln!(f, "{}", card)?;
        }
        write!(f, "{}", END_KEYWORD)
    }
}
