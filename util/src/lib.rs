use std::{fs, num::ParseIntError, path::Path};

use anyhow::{Context, Result};
use miette::{Diagnostic, GraphicalReportHandler};
use nom::{
    character::complete::{digit1, one_of, space0},
    combinator::{map_res, opt, recognize},
    error::{FromExternalError, ParseError},
    sequence::{delimited, tuple},
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
pub struct BadInput {
    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

impl BadInput {
    /// Byte offset into the offending line where parsing stopped.
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Signed base-10 literal, e.g. `42`, `-7`, `+3`, optionally padded with spaces or tabs.
pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseIntError>,
{
    map_res(
        delimited(
            space0,
            recognize(tuple((opt(one_of("+-")), digit1))),
            space0,
        ),
        |i: Span<'a>| i.fragment().parse::<i64>(),
    )(i)
}

fn locate(e: &ErrorTree<Span>) -> (usize, String) {
    match e {
        GenericErrorTree::Base { location, kind } => (location.location_offset(), kind.to_string()),
        GenericErrorTree::Stack { base, .. } => locate(base),
        // furthest alternative is the most useful one to point at
        GenericErrorTree::Alt(alts) => alts
            .iter()
            .map(locate)
            .max_by_key(|(offset, _)| *offset)
            .unwrap_or_else(|| (0, "no alternative matched".to_string())),
    }
}

/// Runs `parse_fun` over the whole of `l`, failing unless every byte is consumed.
pub fn parse_final<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);

    line.map_err(|e| {
        let (offset, kind) = locate(&e);
        BadInput {
            src: l.to_string(),
            bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
            kind,
        }
    })
}

pub fn parse_integer_line(l: &str) -> Result<i64, BadInput> {
    parse_final(l, parse_number::<ErrorTree<Span>>)
}

pub fn render_report(diagnostic: &dyn Diagnostic) -> Result<String> {
    let mut s = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut s, diagnostic)
        .map_err(anyhow::Error::msg)?;

    Ok(s)
}

pub fn read_input_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    fs::read_to_string(path).with_context(|| format!("unable to read input file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("1000", 1000)]
    #[case("-17", -17)]
    #[case("+5", 5)]
    #[case("9223372036854775807", i64::MAX)]
    #[case(" 10", 10)]
    #[case("10 ", 10)]
    #[case("\t7", 7)]
    #[case(" -3\t", -3)]
    fn parse_integer_line_ok(#[case] input: &str, #[case] expected: i64) {
        let res = parse_integer_line(input);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), expected);
    }

    #[rstest]
    #[case("abc", 0)]
    #[case("", 0)]
    #[case("12a", 2)]
    #[case("1 2", 2)]
    #[case("- 1", 1)]
    #[case("-", 1)]
    fn parse_integer_line_bad(#[case] input: &str, #[case] offset: usize) {
        let res = parse_integer_line(input);
        assert!(res.is_err());
        assert_eq!(res.unwrap_err().offset(), offset);
    }

    #[test]
    fn parse_integer_line_out_of_range() {
        let res = parse_integer_line("9223372036854775808");
        assert!(res.is_err());
    }

    #[test]
    fn render_report_mentions_input() {
        let err = parse_integer_line("12a").unwrap_err();
        let report = render_report(&err).unwrap();
        assert!(report.contains("bad input"));
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn read_input_file_missing() {
        let res = read_input_file("definitely/not/here/input.txt");
        assert!(res.is_err());
        assert!(format!("{:#}", res.unwrap_err()).contains("input.txt"));
    }
}
