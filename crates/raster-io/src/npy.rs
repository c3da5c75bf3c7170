//! NumPy `.npy` codec.
//!
//! Covers the layouts chips come in: C-order arrays of a single numeric
//! dtype, and the structured layout the remote service returns for NPY
//! requests (shape `(height, width)` with one named field per band). A
//! structured array with homogeneous fields decodes to
//! `[height, width, bands]` and keeps the field names as band names.
//!
//! Format reference: <https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html>

use std::fs;
use std::path::Path;

use crate::array::{ChipArray, SampleBuffer, SampleType};
use crate::error::{RasterError, RasterResult};

/// `\x93NUMPY`
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Headers are padded so the data starts on this boundary.
const HEADER_ALIGN: usize = 64;

/// Parsed `.npy` header.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    pub version: (u8, u8),
    pub sample_type: SampleType,
    pub little_endian: bool,
    pub shape: Vec<usize>,
    /// Field names for structured dtypes, empty otherwise.
    pub fields: Vec<String>,
    /// Offset of the first data byte.
    pub data_offset: usize,
}

impl NpyHeader {
    /// Number of samples the body holds.
    pub fn sample_count(&self) -> RasterResult<usize> {
        self.shape
            .iter()
            .try_fold(self.fields.len().max(1), |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| RasterError::npy(format!("shape {:?} overflows", self.shape)))
    }

    /// Number of data bytes the body must hold.
    pub fn body_len(&self) -> RasterResult<usize> {
        self.sample_count()?
            .checked_mul(self.sample_type.size())
            .ok_or_else(|| RasterError::npy(format!("shape {:?} overflows", self.shape)))
    }

    /// Check that `bytes` (the whole stream) carries exactly the body the
    /// header announces.
    pub fn check_body(&self, bytes: &[u8]) -> RasterResult<()> {
        let expected = self.body_len()?;
        let found = bytes.len().saturating_sub(self.data_offset);
        if found != expected {
            return Err(RasterError::npy(format!(
                "expected {} data bytes for shape {:?}, found {}",
                expected, self.shape, found
            )));
        }
        Ok(())
    }

    /// Array shape after expanding structured fields into a trailing axis.
    pub fn array_shape(&self) -> Vec<usize> {
        let mut shape = self.shape.clone();
        if !self.fields.is_empty() {
            shape.push(self.fields.len());
        }
        shape
    }
}

/// Serialize an array as NPY v1.0.
///
/// A 3-D array whose band names cover its last axis is written in the
/// structured layout, so decoding gives back the same names.
pub fn encode_npy(array: &ChipArray) -> RasterResult<Vec<u8>> {
    let sample_type = array.sample_type();
    let structured = array.ndim() == 3
        && !array.band_names.is_empty()
        && array.band_names.len() == array.shape[2];

    let descr = if structured {
        let fields: Vec<String> = array
            .band_names
            .iter()
            .map(|name| format!("('{}', '{}')", escape(name), dtype_str(sample_type)))
            .collect();
        format!("[{}]", fields.join(", "))
    } else {
        format!("'{}'", dtype_str(sample_type))
    };

    let shape = if structured {
        &array.shape[..2]
    } else {
        &array.shape[..]
    };

    let mut header = format!(
        "{{'descr': {}, 'fortran_order': False, 'shape': {}, }}",
        descr,
        shape_tuple(shape)
    );

    // magic + version + u16 length + header + '\n'
    let unpadded = NPY_MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let header_len = u16::try_from(header.len())
        .map_err(|_| RasterError::npy(format!("header too long: {} bytes", header.len())))?;

    let body = array.data.to_le_bytes();
    let mut out = Vec::with_capacity(NPY_MAGIC.len() + 4 + header.len() + body.len());
    out.extend_from_slice(NPY_MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Read an NPY file into an array.
pub fn read_npy(path: &Path) -> RasterResult<ChipArray> {
    let bytes = fs::read(path)?;
    decode_npy(&bytes)
}

/// Decode NPY bytes into an array.
pub fn decode_npy(bytes: &[u8]) -> RasterResult<ChipArray> {
    let header = parse_header(bytes)?;
    header.check_body(bytes)?;
    let body = &bytes[header.data_offset..];

    let data = SampleBuffer::from_bytes(header.sample_type, body, header.little_endian)?;
    let array = ChipArray::new(header.array_shape(), data)?;
    Ok(array.with_band_names(header.fields))
}

/// Parse and validate the header of an NPY byte stream.
pub fn parse_header(bytes: &[u8]) -> RasterResult<NpyHeader> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err(RasterError::npy("missing NPY magic string"));
    }
    let version = (bytes[6], bytes[7]);
    let (header_len, prefix) = match version.0 {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(RasterError::npy("truncated NPY preamble"));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        major => {
            return Err(RasterError::npy(format!(
                "unsupported NPY version {}.{}",
                major, version.1
            )))
        }
    };

    let data_offset = prefix + header_len;
    if bytes.len() < data_offset {
        return Err(RasterError::npy("truncated NPY header"));
    }
    let text = std::str::from_utf8(&bytes[prefix..data_offset])
        .map_err(|e| RasterError::npy(format!("header is not text: {}", e)))?;

    let literal = Parser::new(text).parse()?;
    let entries = match literal {
        Literal::Dict(entries) => entries,
        _ => return Err(RasterError::npy("header is not a dict")),
    };

    let mut descr = None;
    let mut fortran_order = None;
    let mut shape = None;
    for (key, value) in entries {
        match key {
            Literal::Str(k) if k == "descr" => descr = Some(value),
            Literal::Str(k) if k == "fortran_order" => fortran_order = Some(value),
            Literal::Str(k) if k == "shape" => shape = Some(value),
            _ => {}
        }
    }

    match fortran_order {
        Some(Literal::Bool(false)) => {}
        Some(Literal::Bool(true)) => {
            return Err(RasterError::npy("Fortran-ordered arrays are not supported"))
        }
        _ => return Err(RasterError::npy("missing 'fortran_order'")),
    }

    let shape = match shape {
        Some(Literal::Tuple(items)) => items
            .into_iter()
            .map(|item| match item {
                Literal::Int(n) => Ok(n),
                other => Err(RasterError::npy(format!("bad shape entry {:?}", other))),
            })
            .collect::<RasterResult<Vec<usize>>>()?,
        _ => return Err(RasterError::npy("missing 'shape'")),
    };

    let (sample_type, little_endian, fields) = match descr {
        Some(Literal::Str(s)) => {
            let (t, le) = parse_dtype(&s)?;
            (t, le, Vec::new())
        }
        Some(Literal::List(items)) => parse_structured(items)?,
        _ => return Err(RasterError::npy("missing 'descr'")),
    };

    Ok(NpyHeader {
        version,
        sample_type,
        little_endian,
        shape,
        fields,
        data_offset,
    })
}

fn parse_structured(items: Vec<Literal>) -> RasterResult<(SampleType, bool, Vec<String>)> {
    let mut fields = Vec::with_capacity(items.len());
    let mut common: Option<(SampleType, bool)> = None;

    for item in items {
        let (name, dtype) = match item {
            Literal::Tuple(mut parts) if parts.len() == 2 => {
                let dtype = parts.pop();
                let name = parts.pop();
                match (name, dtype) {
                    (Some(Literal::Str(n)), Some(Literal::Str(d))) => (n, d),
                    _ => return Err(RasterError::npy("structured field must be (name, dtype)")),
                }
            }
            other => {
                return Err(RasterError::UnsupportedDtype(format!(
                    "structured field {:?}",
                    other
                )))
            }
        };

        let parsed = parse_dtype(&dtype)?;
        match common {
            None => common = Some(parsed),
            Some(existing) if existing == parsed => {}
            Some(_) => {
                return Err(RasterError::UnsupportedDtype(
                    "structured dtype with mixed field types".to_string(),
                ))
            }
        }
        fields.push(name);
    }

    let (sample_type, little_endian) =
        common.ok_or_else(|| RasterError::npy("structured dtype has no fields"))?;
    Ok((sample_type, little_endian, fields))
}

/// Parse a dtype string such as `<u2`, `|u1` or `>f8`.
fn parse_dtype(s: &str) -> RasterResult<(SampleType, bool)> {
    let (little_endian, rest) = match s.chars().next() {
        // `|` marks single-byte types where order does not apply
        Some('<') | Some('|') => (true, &s[1..]),
        Some('>') => (false, &s[1..]),
        Some('=') => (cfg!(target_endian = "little"), &s[1..]),
        Some(_) => (cfg!(target_endian = "little"), s),
        None => return Err(RasterError::npy("empty dtype")),
    };

    let mut rest_chars = rest.chars();
    let kind = rest_chars
        .next()
        .ok_or_else(|| RasterError::npy(format!("bad dtype '{}'", s)))?;
    let size: usize = rest_chars
        .as_str()
        .parse()
        .map_err(|_| RasterError::npy(format!("bad dtype '{}'", s)))?;

    SampleType::from_npy(kind, size)
        .map(|t| (t, little_endian))
        .ok_or_else(|| RasterError::UnsupportedDtype(s.to_string()))
}

fn dtype_str(sample_type: SampleType) -> String {
    let order = if sample_type.size() == 1 { '|' } else { '<' };
    format!("{}{}{}", order, sample_type.npy_kind(), sample_type.size())
}

fn shape_tuple(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => format!(
            "({})",
            dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// The subset of Python literals that appears in NPY headers.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Int(usize),
    Bool(bool),
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> RasterResult<Literal> {
        let value = self.value()?;
        self.skip_ws();
        if self.pos != self.src.len() {
            return Err(self.error("trailing characters"));
        }
        Ok(value)
    }

    fn error(&self, msg: &str) -> RasterError {
        RasterError::npy(format!("header parse error at byte {}: {}", self.pos, msg))
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> RasterResult<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c as char)))
        }
    }

    fn value(&mut self) -> RasterResult<Literal> {
        match self.peek() {
            Some(b'{') => self.dict(),
            Some(b'[') => self.sequence(b'[', b']').map(Literal::List),
            Some(b'(') => self.sequence(b'(', b')').map(Literal::Tuple),
            Some(q @ (b'\'' | b'"')) => self.string(q),
            Some(c) if c.is_ascii_digit() => self.int(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            _ => Err(self.error("unexpected token")),
        }
    }

    fn dict(&mut self) -> RasterResult<Literal> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        loop {
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.expect(b':')?;
            let value = self.value()?;
            entries.push((key, value));
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn sequence(&mut self, open: u8, close: u8) -> RasterResult<Vec<Literal>> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == close => {}
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
    }

    fn string(&mut self, quote: u8) -> RasterResult<Literal> {
        self.pos += 1;
        let mut out = Vec::new();
        while let Some(&c) = self.src.get(self.pos) {
            self.pos += 1;
            match c {
                b'\\' => {
                    if let Some(&escaped) = self.src.get(self.pos) {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                c if c == quote => {
                    let s = String::from_utf8(out).map_err(|_| self.error("invalid string"))?;
                    return Ok(Literal::Str(s));
                }
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn int(&mut self) -> RasterResult<Literal> {
        let start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        // Python 2 era headers may carry an `L` suffix
        let digits = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default();
        if self.src.get(self.pos) == Some(&b'L') {
            self.pos += 1;
        }
        digits
            .parse()
            .map(Literal::Int)
            .map_err(|_| self.error("bad integer"))
    }

    fn word(&mut self) -> RasterResult<Literal> {
        let start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_alphanumeric() {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            b"True" => Ok(Literal::Bool(true)),
            b"False" => Ok(Literal::Bool(false)),
            _ => Err(self.error("unknown identifier")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_aligned() {
        let array = ChipArray::new(vec![2, 3], SampleBuffer::U16(vec![1, 2, 3, 4, 5, 6])).unwrap();
        let bytes = encode_npy(&array).unwrap();
        let header = parse_header(&bytes).unwrap();

        assert_eq!(header.data_offset % HEADER_ALIGN, 0);
        assert_eq!(header.version, (1, 0));
        assert_eq!(header.shape, vec![2, 3]);
        assert_eq!(bytes.len(), header.data_offset + 12);
    }

    #[test]
    fn test_parse_literal_dict() {
        let lit = Parser::new("{'descr': '<f4', 'fortran_order': False, 'shape': (3,), }")
            .parse()
            .unwrap();
        match lit {
            Literal::Dict(entries) => {
                assert_eq!(entries.len(), 3);
                assert_eq!(entries[2].1, Literal::Tuple(vec![Literal::Int(3)]));
            }
            other => panic!("expected dict, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_dtype() {
        assert_eq!(parse_dtype("<u2").unwrap(), (SampleType::U16, true));
        assert_eq!(parse_dtype(">f8").unwrap(), (SampleType::F64, false));
        assert_eq!(parse_dtype("|u1").unwrap().0, SampleType::U8);
        assert!(matches!(parse_dtype("<c16"), Err(RasterError::UnsupportedDtype(_))));
        assert!(parse_dtype("<u").is_err());
    }

    #[test]
    fn test_shape_tuple() {
        assert_eq!(shape_tuple(&[]), "()");
        assert_eq!(shape_tuple(&[5]), "(5,)");
        assert_eq!(shape_tuple(&[256, 256, 3]), "(256, 256, 3)");
    }

    #[test]
    fn test_rejects_fortran_order() {
        let header = "{'descr': '<u2', 'fortran_order': True, 'shape': (1, 1), }";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(NPY_MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0, 0]);
        assert!(parse_header(&bytes).is_err());
    }

    #[test]
    fn test_sample_count_overflow() {
        let header = NpyHeader {
            version: (1, 0),
            sample_type: SampleType::U16,
            little_endian: true,
            shape: vec![usize::MAX / 2, 3],
            fields: Vec::new(),
            data_offset: 64,
        };
        assert!(matches!(header.sample_count(), Err(RasterError::Npy(_))));
        assert!(header.check_body(&[0u8; 128]).is_err());
    }

    #[test]
    fn test_rejects_missing_magic() {
        assert!(parse_header(b"not an npy file").is_err());
    }
}
