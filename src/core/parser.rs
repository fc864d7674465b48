//! Parser for lens profile files.
//!
//! Profiles use the pbrt parameter list syntax, one typed parameter after another:
//!
//! ```text
//! # 35mm sensor, scene in centimeters
//! "string lens_model" "thin_lens_50mm"
//! "float sensor_width" [ 36 ]
//! "integer vignetting_retries" 15
//! "bool enable_dof" "true"
//! ```

use super::lentil::Float;
use super::paramset::ParamSet;
use std::fs;
use std::io;
use std::path::Path;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, digit1, multispace0, not_line_ending},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{context, convert_error, VerboseError},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, terminated},
    Err, IResult,
};

pub type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Integer(String, Vec<i32>),
    Float(String, Vec<Float>),
    Bool(String, Vec<bool>),
    Str(String, Vec<String>),
}

pub fn parse_comment(i: &str) -> ParseResult<&str> {
    preceded(char('#'), not_line_ending)(i)
}

pub fn ws_and_comment(i: &str) -> ParseResult<Vec<&str>> {
    preceded(
        multispace0,
        many0(terminated(
            parse_comment,
            multispace0
        ))
    )(i)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

pub fn parse_float(i: &str) -> ParseResult<Float> {
    map_res(recognize_float, |s: &str| s.parse::<Float>())(i)
}

pub fn parse_int(i: &str) -> ParseResult<i32> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| s.parse::<i32>())(i)
}

pub fn parse_quoted_string(i: &str) -> ParseResult<String> {
    map(delimited(char('"'), take_until("\""), char('"')), String::from)(i)
}

pub fn parse_bool(i: &str) -> ParseResult<bool> {
    alt((
        map(tag("\"true\""), |_| true),
        map(tag("\"false\""), |_| false),
        map(tag("true"), |_| true),
        map(tag("false"), |_| false),
    ))(i)
}

/// `"<type> <name>"`, returns the name.
pub fn parse_named_parameter<'a>(i: &'a str, type_str: &'static str) -> ParseResult<'a, String> {
    delimited(
        char('"'),
        preceded(
            terminated(tag(type_str), take_while1(|c| c == ' ' || c == '\t')),
            map(take_while1(is_ident_char), String::from)
        ),
        char('"')
    )(i)
}

/// A single value or a bracketed list of values.
fn parameter_values<'a, O, F>(item: F) -> impl Fn(&'a str) -> ParseResult<'a, Vec<O>>
where
F: Fn(&'a str) -> ParseResult<'a, O> + Copy
{
    move |i: &'a str| alt((
        delimited(
            terminated(char('['), ws_and_comment),
            many0(terminated(item, ws_and_comment)),
            context("closing bracket", char(']'))
        ),
        map(item, |v| vec![v])
    ))(i)
}

pub fn parse_integer_parameter(i: &str) -> ParseResult<Parameter> {
    map(
        pair(
            terminated(|i| parse_named_parameter(i, "integer"), ws_and_comment),
            context("integer values", parameter_values(parse_int))
        ),
        |(name, values)| Parameter::Integer(name, values)
    )(i)
}

pub fn parse_float_parameter(i: &str) -> ParseResult<Parameter> {
    map(
        pair(
            terminated(|i| parse_named_parameter(i, "float"), ws_and_comment),
            context("float values", parameter_values(parse_float))
        ),
        |(name, values)| Parameter::Float(name, values)
    )(i)
}

pub fn parse_bool_parameter(i: &str) -> ParseResult<Parameter> {
    map(
        pair(
            terminated(|i| parse_named_parameter(i, "bool"), ws_and_comment),
            context("bool values", parameter_values(parse_bool))
        ),
        |(name, values)| Parameter::Bool(name, values)
    )(i)
}

pub fn parse_string_parameter(i: &str) -> ParseResult<Parameter> {
    map(
        pair(
            terminated(|i| parse_named_parameter(i, "string"), ws_and_comment),
            context("string values", parameter_values(parse_quoted_string))
        ),
        |(name, values)| Parameter::Str(name, values)
    )(i)
}

pub fn parse_parameter(i: &str) -> ParseResult<Parameter> {
    context("parameter", alt((
        parse_integer_parameter,
        parse_float_parameter,
        parse_bool_parameter,
        parse_string_parameter,
    )))(i)
}

pub fn parse_parameter_list(i: &str) -> ParseResult<Vec<Parameter>> {
    all_consuming(preceded(
        ws_and_comment,
        many0(terminated(parse_parameter, ws_and_comment))
    ))(i)
}

/// Parse profile text into a `ParamSet`.
pub fn parse_params(input: &str) -> io::Result<ParamSet> {
    let parameters = match parse_parameter_list(input) {
        Ok((_, parameters)) => parameters,
        Err(Err::Error(e)) | Err(Err::Failure(e)) => {
            let message = convert_error(input, e);
            error!("Unable to parse lens profile:\n{}", message);
            return Err(io::Error::new(io::ErrorKind::InvalidData, message));
        }
        Err(Err::Incomplete(_)) => {
            error!("Unexpected end of lens profile");
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unexpected end of lens profile"));
        }
    };

    let mut params = ParamSet::new();
    for parameter in parameters {
        match parameter {
            Parameter::Integer(name, values) => params.add_int(&name, values),
            Parameter::Float(name, values) => params.add_float(&name, values),
            Parameter::Bool(name, values) => params.add_bool(&name, values),
            Parameter::Str(name, values) => params.add_string(&name, values),
        }
    }
    Ok(params)
}

/// Read and parse a lens profile file.
pub fn read_params_file<P: AsRef<Path>>(path: P) -> io::Result<ParamSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        error!("Unable to open lens profile \"{}\": {}", path.display(), e);
        e
    })?;
    parse_params(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_and_comment() {
        let (rest, comments) = ws_and_comment(" \t#test\n  ").unwrap();
        assert_eq!(rest, "");
        assert_eq!(comments, vec!["test"]);
        assert_eq!(ws_and_comment(" \t\n  ").unwrap().1.len(), 0);
        assert_eq!(ws_and_comment("#test\n#test\n").unwrap().1.len(), 2);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_float("36").unwrap().1, 36.0);
        assert_eq!(parse_float("-1.5e2").unwrap().1, -150.0);
        assert_eq!(parse_int("-15 ").unwrap(), (" ", -15));
    }

    #[test]
    fn test_single_and_array_values() {
        assert_eq!(
            parse_parameter("\"float sensor_width\" [ 36 ]").unwrap().1,
            Parameter::Float("sensor_width".to_owned(), vec![36.0]));
        assert_eq!(
            parse_parameter("\"integer vignetting_retries\" 15").unwrap().1,
            Parameter::Integer("vignetting_retries".to_owned(), vec![15]));
        assert_eq!(
            parse_parameter("\"string units\" \"cm\"").unwrap().1,
            Parameter::Str("units".to_owned(), vec!["cm".to_owned()]));
        assert_eq!(
            parse_parameter("\"bool enable_dof\" \"true\"").unwrap().1,
            Parameter::Bool("enable_dof".to_owned(), vec![true]));
        assert_eq!(
            parse_parameter("\"float pair\" [1 2.5]").unwrap().1,
            Parameter::Float("pair".to_owned(), vec![1.0, 2.5]));
    }

    #[test]
    fn test_parse_params() {
        let text = r#"
            # lens profile
            "string lens_model" "thin_lens_50mm"
            "float sensor_width" [ 24 ]   # APS-C-ish
            "integer vignetting_retries" [ 3 ]
            "bool enable_dof" "false"
        "#;
        let params = parse_params(text).unwrap();
        assert_eq!(params.find_one_string("lens_model", ""), "thin_lens_50mm");
        assert_eq!(params.find_one_float("sensor_width", 36.0), 24.0);
        assert_eq!(params.find_one_int("vignetting_retries", 15), 3);
        assert_eq!(params.find_one_bool("enable_dof", true), false);
    }

    #[test]
    fn test_malformed_profile() {
        let err = parse_params("\"float sensor_width\" [ 36").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let err = parse_params("\"vector up\" [ 0 1 0 ]").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_missing_file() {
        let err = read_params_file("/nonexistent/lens.profile").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
