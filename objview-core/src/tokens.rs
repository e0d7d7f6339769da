/// Token grammars shared by the OBJ and MTL readers
use std::io::{self, BufRead};

use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{pair, preceded},
    IResult,
};

use crate::error::ParseErrorKind;

/// Lines of a reader, decoded lossily so stray non-UTF-8 bytes in comments
/// or names do not abort a load. Trailing `\n` and `\r\n` are stripped.
pub(crate) struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
}

pub(crate) fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        buf: Vec::new(),
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Split a line into its directive keyword and the trimmed remainder.
/// Returns `None` for blank lines.
pub(crate) fn split_directive(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => Some((keyword, rest.trim())),
        None => Some((line, "")),
    }
}

fn parse_float(token: &str) -> Result<f32, ParseErrorKind> {
    all_consuming(float::<_, nom::error::Error<&str>>)(token)
        .map(|(_, value)| value)
        .map_err(|_| ParseErrorKind::InvalidNumber(token.to_string()))
}

/// Parse every whitespace separated token of `value` as a float
pub(crate) fn parse_floats(value: &str) -> Result<Vec<f32>, ParseErrorKind> {
    value.split_whitespace().map(parse_float).collect()
}

/// At least `expected` floats; anything after them is ignored
pub(crate) fn parse_at_least<const N: usize>(value: &str) -> Result<[f32; N], ParseErrorKind> {
    let numbers = parse_floats(value)?;
    if numbers.len() < N {
        return Err(ParseErrorKind::MissingComponent {
            expected: N,
            found: numbers.len(),
        });
    }
    let mut out = [0.0; N];
    out.copy_from_slice(&numbers[..N]);
    Ok(out)
}

pub(crate) fn parse_vector3(value: &str) -> Result<[f32; 3], ParseErrorKind> {
    parse_at_least::<3>(value)
}

pub(crate) fn parse_scalar(value: &str) -> Result<f32, ParseErrorKind> {
    parse_at_least::<1>(value).map(|[v]| v)
}

pub(crate) fn parse_integer(value: &str) -> Result<i64, ParseErrorKind> {
    let token = value.split_whitespace().next().ok_or(ParseErrorKind::MissingComponent {
        expected: 1,
        found: 0,
    })?;
    all_consuming(integer::<_, nom::error::Error<&str>>)(token)
        .map(|(_, value)| value)
        .map_err(|_| ParseErrorKind::InvalidNumber(token.to_string()))
}

/// One `v`, `v/vt`, `v//vn` or `v/vt/vn` token, indices still 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FaceToken {
    pub vertex: i64,
    pub tex_coord: Option<i64>,
    pub normal: Option<i64>,
    pub slashed: bool,
}

type SlashGroup = Option<(Option<i64>, Option<Option<i64>>)>;

fn face_token(input: &str) -> IResult<&str, (i64, SlashGroup)> {
    let (input, vertex) = integer(input)?;
    let (input, group) = opt(preceded(
        char('/'),
        pair(opt(integer), opt(preceded(char('/'), opt(integer)))),
    ))(input)?;
    Ok((input, (vertex, group)))
}

pub(crate) fn parse_face_token(token: &str) -> Result<FaceToken, ParseErrorKind> {
    let (_, (vertex, group)) = all_consuming(face_token)(token)
        .map_err(|_| ParseErrorKind::MalformedFaceToken(token.to_string()))?;

    Ok(FaceToken {
        vertex,
        tex_coord: group.and_then(|(tex_coord, _)| tex_coord),
        normal: group.and_then(|(_, normal)| normal.flatten()),
        slashed: group.is_some(),
    })
}
