//! Raw-text normalization and segment splitting.
//!
//! Responsibilities:
//! - strip a leading byte-order mark and normalize line endings
//! - discover the delimiter set from the MSH segment
//! - split each surviving line into a [`Segment`] of positional fields
//!
//! Field numbering follows HL7 convention: `fields[0]` is the segment code,
//! so `fields[n]` is `SEG-n` for every non-MSH segment. MSH is off by one
//! (the field separator itself is MSH-1), which matches how downstream
//! extraction indexes it.

use crate::{Hl7Error, Hl7Result};
use serde::Serialize;

/// The delimiter set declared by the MSH segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    /// The standard `|^~\&` set.
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Read the delimiter set off an MSH line.
    ///
    /// The field separator is the character immediately after `MSH`; the
    /// encoding characters follow in MSH-2 order (component, repetition,
    /// escape, sub-component). Encoding characters the message omits fall
    /// back to the standard set individually.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::MissingHeader`] if the line is too short to carry
    /// a field separator.
    pub fn from_msh(line: &str) -> Hl7Result<Self> {
        let mut chars = line.chars().skip(3);
        let field = chars.next().ok_or_else(|| {
            Hl7Error::MissingHeader("MSH segment too short to declare a field separator".into())
        })?;

        let defaults = Delimiters::default();
        let mut encoding = Vec::with_capacity(4);
        for c in chars {
            if c == field {
                break;
            }
            encoding.push(c);
        }

        Ok(Self {
            field,
            component: encoding.first().copied().unwrap_or(defaults.component),
            repetition: encoding.get(1).copied().unwrap_or(defaults.repetition),
            escape: encoding.get(2).copied().unwrap_or(defaults.escape),
            subcomponent: encoding.get(3).copied().unwrap_or(defaults.subcomponent),
        })
    }
}

/// One line of the message, split into positional fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// The raw segment code (`fields[0]` verbatim, however malformed).
    pub code: String,
    pub fields: Vec<String>,
}

impl Segment {
    /// Positional field access treating absent and empty fields identically.
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields
            .get(idx)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Whether the code looks like a segment name: two or three characters,
    /// leading uppercase letter, uppercase alphanumerics after.
    pub fn has_wellformed_code(&self) -> bool {
        let bytes = self.code.as_bytes();
        (2..=3).contains(&bytes.len())
            && bytes[0].is_ascii_uppercase()
            && bytes[1..]
                .iter()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }
}

/// The tokenized message: delimiters plus the ordered segment sequence.
///
/// Built once, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawMessage {
    pub delimiters: Delimiters,
    pub segments: Vec<Segment>,
}

/// Tokenize raw HL7 text into segments.
///
/// Normalization: strips a leading UTF-8 BOM, treats `\r\n`, `\r` and `\n`
/// as one logical segment break, and drops blank lines. The first line
/// starting with `MSH` supplies the delimiter set used to split every
/// segment; malformed non-MSH lines still become segments (the builder
/// decides what to skip).
///
/// # Errors
///
/// Returns [`Hl7Error::MissingHeader`] if no line starts with `MSH`, or the
/// MSH line cannot declare a field separator.
pub fn tokenize(text: &str) -> Hl7Result<RawMessage> {
    let lines = normalize_lines(text);

    let msh = lines
        .iter()
        .find(|line| line.starts_with("MSH"))
        .ok_or_else(|| Hl7Error::MissingHeader("message contains no MSH segment".into()))?;
    let delimiters = Delimiters::from_msh(msh)?;

    let segments = lines
        .iter()
        .map(|line| split_segment(line, &delimiters))
        .collect();

    Ok(RawMessage {
        delimiters,
        segments,
    })
}

fn normalize_lines(text: &str) -> Vec<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn split_segment(line: &str, delimiters: &Delimiters) -> Segment {
    let fields: Vec<String> = line.split(delimiters.field).map(str::to_owned).collect();
    let code = fields[0].clone();
    Segment { code, fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MSH: &str = "MSH|^~\\&|ClinicEMR|GeneralHospital|DownstreamSys|DestFacility|20250101120000||ADT^A01|12345|P|2.3.1";

    #[test]
    fn tokenizes_standard_message() {
        let text = format!("{MSH}\rPID|1||123456^^^HOSP^MR||Doe^Jane||19800101|F\r");
        let raw = tokenize(&text).expect("tokenize");

        assert_eq!(raw.delimiters, Delimiters::default());
        assert_eq!(raw.segments.len(), 2);
        assert_eq!(raw.segments[0].code, "MSH");
        assert_eq!(raw.segments[1].code, "PID");
        assert_eq!(raw.segments[1].field(5), Some("Doe^Jane"));
    }

    #[test]
    fn normalizes_mixed_line_endings_and_blank_lines() {
        let text = format!("\n{MSH}\r\n\r\nPID|1||1||A^B\nPV1|1|O|AMB\r");
        let raw = tokenize(&text).expect("tokenize");

        let codes: Vec<&str> = raw.segments.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["MSH", "PID", "PV1"]);
    }

    #[test]
    fn strips_leading_bom() {
        let text = format!("\u{feff}{MSH}");
        let raw = tokenize(&text).expect("tokenize");
        assert_eq!(raw.segments[0].code, "MSH");
    }

    #[test]
    fn missing_msh_is_a_hard_error() {
        let err = tokenize("PID|1||123||Doe^Jane").expect_err("should fail without MSH");
        assert!(matches!(err, Hl7Error::MissingHeader(msg) if msg.contains("no MSH")));
    }

    #[test]
    fn truncated_msh_is_a_hard_error() {
        let err = tokenize("MSH").expect_err("should fail on bare MSH");
        assert!(matches!(err, Hl7Error::MissingHeader(msg) if msg.contains("field separator")));
    }

    #[test]
    fn reads_nonstandard_delimiters() {
        let raw = tokenize("MSH#*~\\&#App#Fac###20250101000000##ADT*A01#1#P#2.3.1\rPID#1##9*x##Last*First")
            .expect("tokenize");

        assert_eq!(raw.delimiters.field, '#');
        assert_eq!(raw.delimiters.component, '*');
        assert_eq!(raw.segments[1].field(5), Some("Last*First"));
    }

    #[test]
    fn defaults_missing_encoding_characters() {
        let delims = Delimiters::from_msh("MSH|^|A|B").expect("delimiters");
        assert_eq!(delims.component, '^');
        assert_eq!(delims.repetition, '~');
        assert_eq!(delims.escape, '\\');
        assert_eq!(delims.subcomponent, '&');
    }

    #[test]
    fn empty_field_reads_as_absent() {
        let text = format!("{MSH}\rPID|1||123||");
        let raw = tokenize(&text).expect("tokenize");
        let pid = &raw.segments[1];

        assert_eq!(pid.field(3), Some("123"));
        assert_eq!(pid.field(2), None);
        assert_eq!(pid.field(5), None);
        assert_eq!(pid.field(40), None);
    }

    #[test]
    fn recognizes_wellformed_codes() {
        let seg = |code: &str| Segment {
            code: code.to_owned(),
            fields: vec![code.to_owned()],
        };

        assert!(seg("PID").has_wellformed_code());
        assert!(seg("ZZ1").has_wellformed_code());
        assert!(!seg("p1d").has_wellformed_code());
        assert!(!seg("garbage line").has_wellformed_code());
        assert!(!seg("").has_wellformed_code());
    }
}
