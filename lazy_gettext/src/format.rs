//! printf-style substitution of [`Params`] into translated templates.
//!
//! Templates use `%` conversion specifiers in the form
//! `%[(key)][flags][width][.precision][length]conversion`. Named
//! specifiers draw from a [`Params::Mapping`]; positional ones consume a
//! [`Params::Scalar`] or [`Params::Sequence`] in order. A mapping may leave
//! keys unused, but every positional value must be consumed.
//!
//! Supported conversions are `s`, `r`, `a`, `c`, `d`, `i`, `u`, `x`, `X`,
//! `o`, `f`, `F`, `e` and `E`; `%%` yields a literal percent sign. Flags are
//! `-`, `+`, space, `0` and `#`. Length modifiers `h`, `l` and `L` are
//! accepted and ignored. Star widths and precisions are not supported, and
//! explicit ones may not exceed [`MAX_FIELD_SIZE`].

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::FormatError;
use crate::params::{Param, Params};

const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Largest width or precision a conversion specifier may request.
pub const MAX_FIELD_SIZE: u16 = u16::MAX;

#[derive(Debug, Clone, Copy)]
enum Conversion {
    Str,
    Repr,
    Ascii,
    Char,
    Decimal,
    Hex { upper: bool },
    Octal,
    Fixed { upper: bool },
    Exponent { upper: bool },
}

impl Conversion {
    const fn from_char(symbol: char) -> Option<Self> {
        Some(match symbol {
            's' => Self::Str,
            'r' => Self::Repr,
            'a' => Self::Ascii,
            'c' => Self::Char,
            'd' | 'i' | 'u' => Self::Decimal,
            'x' => Self::Hex { upper: false },
            'X' => Self::Hex { upper: true },
            'o' => Self::Octal,
            'f' => Self::Fixed { upper: false },
            'F' => Self::Fixed { upper: true },
            'e' => Self::Exponent { upper: false },
            'E' => Self::Exponent { upper: true },
            _ => return None,
        })
    }
}

#[expect(
    clippy::struct_excessive_bools,
    reason = "each field mirrors one independent conversion flag"
)]
#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
}

#[derive(Debug)]
struct Spec {
    key: Option<String>,
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    symbol: char,
    conversion: Option<Conversion>,
}

enum Arguments<'a> {
    Positional { values: Vec<&'a Param>, next: usize },
    Mapping(&'a BTreeMap<String, Param>),
}

impl<'a> Arguments<'a> {
    fn new(params: &'a Params) -> Self {
        match params {
            Params::Scalar(value) => Self::Positional {
                values: vec![value],
                next: 0,
            },
            Params::Sequence(values) => Self::Positional {
                values: values.iter().collect(),
                next: 0,
            },
            Params::Mapping(entries) => Self::Mapping(entries),
        }
    }

    fn take(&mut self, key: Option<&str>, position: usize) -> Result<&'a Param, FormatError> {
        match (self, key) {
            (Self::Mapping(entries), Some(name)) => {
                let mapping: &'a BTreeMap<String, Param> = *entries;
                mapping.get(name).ok_or_else(|| FormatError::MissingKey {
                    key: name.to_owned(),
                })
            }
            (Self::Mapping(_), None) => Err(FormatError::PositionalWithMapping { position }),
            (Self::Positional { .. }, Some(_)) => Err(FormatError::MappingRequired),
            (Self::Positional { values, next }, None) => {
                let value = values
                    .get(*next)
                    .copied()
                    .ok_or(FormatError::NotEnoughArguments)?;
                *next += 1;
                Ok(value)
            }
        }
    }

    fn finish(&self) -> Result<(), FormatError> {
        match self {
            Self::Positional { values, next } if *next < values.len() => {
                Err(FormatError::NotAllConverted)
            }
            _ => Ok(()),
        }
    }
}

/// Substitutes `params` into `template`.
///
/// # Errors
///
/// Returns a [`FormatError`] when the template is malformed or the params
/// do not fit its placeholders.
///
/// # Examples
/// ```rust
/// use lazy_gettext::format::percent_format;
/// use lazy_gettext::Params;
///
/// let params = Params::mapping([("user", "ada"), ("host", "example.org")]);
/// let text = percent_format("%(user)s@%(host)s", &params)?;
/// assert_eq!(text, "ada@example.org");
/// assert_eq!(percent_format("%5.1f%%", &Params::from(99.44))?, " 99.4%");
/// # Ok::<(), lazy_gettext::FormatError>(())
/// ```
pub fn percent_format(template: &str, params: &Params) -> Result<String, FormatError> {
    let mut arguments = Arguments::new(params);
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }
        let spec = parse_spec(&mut chars, position)?;
        let Some(conversion) = spec.conversion else {
            output.push('%');
            continue;
        };
        let value = arguments.take(spec.key.as_deref(), position)?;
        output.push_str(&render(&spec, conversion, value)?);
    }
    arguments.finish()?;
    Ok(output)
}

fn parse_spec(chars: &mut Peekable<CharIndices<'_>>, position: usize) -> Result<Spec, FormatError> {
    let key = parse_key(chars, position)?;
    let mut flags = Flags::default();
    while let Some((_, flag)) = chars.next_if(|&(_, c)| matches!(c, '-' | '+' | ' ' | '0' | '#')) {
        match flag {
            '-' => flags.left = true,
            '+' => flags.plus = true,
            ' ' => flags.space = true,
            '0' => flags.zero = true,
            _ => flags.alternate = true,
        }
    }
    let width = parse_number(chars, FormatError::WidthTooBig { position })?.unwrap_or_default();
    let precision = if chars.next_if(|&(_, c)| c == '.').is_some() {
        Some(parse_number(chars, FormatError::PrecisionTooBig { position })?.unwrap_or_default())
    } else {
        None
    };
    while chars.next_if(|&(_, c)| matches!(c, 'h' | 'l' | 'L')).is_some() {}
    let (offset, symbol) = chars.next().ok_or(FormatError::Incomplete { position })?;
    let conversion = if symbol == '%' {
        None
    } else {
        Some(
            Conversion::from_char(symbol).ok_or(FormatError::UnsupportedConversion {
                conversion: symbol,
                position: offset,
            })?,
        )
    };
    Ok(Spec {
        key,
        flags,
        width,
        precision,
        symbol,
        conversion,
    })
}

fn parse_key(
    chars: &mut Peekable<CharIndices<'_>>,
    position: usize,
) -> Result<Option<String>, FormatError> {
    if chars.next_if(|&(_, c)| c == '(').is_none() {
        return Ok(None);
    }
    let mut depth = 1_usize;
    let mut key = String::new();
    loop {
        let (_, ch) = chars.next().ok_or(FormatError::UnterminatedKey { position })?;
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(key));
                }
            }
            _ => {}
        }
        key.push(ch);
    }
}

fn parse_number(
    chars: &mut Peekable<CharIndices<'_>>,
    too_big: FormatError,
) -> Result<Option<usize>, FormatError> {
    if let Some((offset, _)) = chars.next_if(|&(_, c)| c == '*') {
        return Err(FormatError::UnsupportedConversion {
            conversion: '*',
            position: offset,
        });
    }
    let mut digits = String::new();
    while let Some((_, digit)) = chars.next_if(|&(_, c)| c.is_ascii_digit()) {
        digits.push(digit);
    }
    if digits.is_empty() {
        return Ok(None);
    }
    // Every character is a digit, so only values above `MAX_FIELD_SIZE` fail.
    digits
        .parse::<u16>()
        .map(|size| Some(usize::from(size)))
        .map_err(|_| too_big)
}

fn render(spec: &Spec, conversion: Conversion, value: &Param) -> Result<String, FormatError> {
    match conversion {
        Conversion::Str => Ok(pad_text(spec, &str_value(value))),
        Conversion::Repr => Ok(pad_text(spec, &repr_value(value, false))),
        Conversion::Ascii => Ok(pad_text(spec, &repr_value(value, true))),
        Conversion::Char => char_value(value).map(|ch| pad_text(spec, &ch.to_string())),
        Conversion::Decimal => {
            let number = integer_value(spec.symbol, value, true)?;
            Ok(render_integer(spec, number, "", number.unsigned_abs().to_string()))
        }
        Conversion::Hex { upper } => {
            let number = integer_value(spec.symbol, value, false)?;
            let magnitude = number.unsigned_abs();
            let (prefix, digits) = if upper {
                ("0X", format!("{magnitude:X}"))
            } else {
                ("0x", format!("{magnitude:x}"))
            };
            let shown_prefix = if spec.flags.alternate { prefix } else { "" };
            Ok(render_integer(spec, number, shown_prefix, digits))
        }
        Conversion::Octal => {
            let number = integer_value(spec.symbol, value, false)?;
            let prefix = if spec.flags.alternate { "0o" } else { "" };
            Ok(render_integer(spec, number, prefix, format!("{:o}", number.unsigned_abs())))
        }
        Conversion::Fixed { upper } => {
            let number = float_value(spec.symbol, value)?;
            Ok(render_float(spec, number, upper, |magnitude, precision| {
                format!("{magnitude:.precision$}")
            }))
        }
        Conversion::Exponent { upper } => {
            let number = float_value(spec.symbol, value)?;
            Ok(render_float(spec, number, upper, |magnitude, precision| {
                python_exponent(&format!("{magnitude:.precision$e}"), upper)
            }))
        }
    }
}

fn str_value(value: &Param) -> String {
    match value {
        Param::Float(number) => python_float(*number),
        other => other.to_string(),
    }
}

fn repr_value(value: &Param, ascii_only: bool) -> String {
    match value {
        Param::Str(text) => quote(text, ascii_only),
        Param::Message(message) => quote(message.default_text(), ascii_only),
        Param::Float(number) => python_float(*number),
        Param::Int(number) => number.to_string(),
    }
}

fn char_value(value: &Param) -> Result<char, FormatError> {
    let text = match value {
        Param::Int(code) => {
            return u32::try_from(*code)
                .ok()
                .and_then(char::from_u32)
                .ok_or(FormatError::CharacterRequired);
        }
        Param::Float(_) => return Err(FormatError::CharacterRequired),
        Param::Str(text) => text.as_str(),
        Param::Message(message) => message.default_text(),
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(FormatError::CharacterRequired),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "%d truncates floats toward zero; out-of-range values saturate"
)]
fn integer_value(symbol: char, value: &Param, accept_float: bool) -> Result<i64, FormatError> {
    match value {
        Param::Int(number) => Ok(*number),
        Param::Float(number) if accept_float && number.is_finite() => Ok(number.trunc() as i64),
        Param::Str(_) | Param::Message(_) if accept_float => Err(FormatError::NumberRequired {
            conversion: symbol,
            found: value.type_name(),
        }),
        _ => Err(FormatError::IntegerRequired {
            conversion: symbol,
            found: value.type_name(),
        }),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "float conversions of integers follow host float semantics"
)]
fn float_value(symbol: char, value: &Param) -> Result<f64, FormatError> {
    match value {
        Param::Float(number) => Ok(*number),
        Param::Int(number) => Ok(*number as f64),
        Param::Str(_) | Param::Message(_) => Err(FormatError::NumberRequired {
            conversion: symbol,
            found: value.type_name(),
        }),
    }
}

const fn sign(flags: Flags, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if flags.plus {
        "+"
    } else if flags.space {
        " "
    } else {
        ""
    }
}

fn render_integer(spec: &Spec, number: i64, prefix: &str, digits: String) -> String {
    let body = match spec.precision {
        Some(precision) if precision > digits.len() => format!("{digits:0>precision$}"),
        _ => digits,
    };
    pad_numeric(spec, sign(spec.flags, number < 0), prefix, &body)
}

fn render_float<F>(spec: &Spec, number: f64, upper: bool, finite: F) -> String
where
    F: FnOnce(f64, usize) -> String,
{
    let body = if number.is_nan() {
        String::from("nan")
    } else if number.is_infinite() {
        String::from("inf")
    } else {
        let precision = spec.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
        let mut text = finite(number.abs(), precision);
        if spec.flags.alternate && !text.contains('.') {
            let point = text.find(['e', 'E']).unwrap_or(text.len());
            text.insert(point, '.');
        }
        text
    };
    let cased = if upper { body.to_uppercase() } else { body };
    let negative = number.is_sign_negative() && !number.is_nan();
    if number.is_finite() {
        pad_numeric(spec, sign(spec.flags, negative), "", &cased)
    } else {
        let mut text = String::from(sign(spec.flags, negative));
        text.push_str(&cased);
        pad_text(spec, &text)
    }
}

fn python_exponent(formatted: &str, upper: bool) -> String {
    let Some((mantissa, exponent)) = formatted.split_once(['e', 'E']) else {
        return formatted.to_owned();
    };
    let (exponent_sign, digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |magnitude| ('-', magnitude));
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{exponent_sign}{digits:0>2}")
}

/// Shortest round-trip text for a float, keeping a fractional part on
/// integral values (`2.0`) and a signed two-digit exponent (`1e+16`).
fn python_float(number: f64) -> String {
    if number.is_nan() {
        return String::from("nan");
    }
    if number.is_infinite() {
        return String::from(if number.is_sign_negative() { "-inf" } else { "inf" });
    }
    python_exponent(&format!("{number:?}"), false)
}

fn quote(text: &str, ascii_only: bool) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() || (ascii_only && !c.is_ascii()) => {
                quoted.push_str(&escape_code_point(c));
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

fn escape_code_point(ch: char) -> String {
    let code = u32::from(ch);
    if code <= 0xff {
        format!("\\x{code:02x}")
    } else if code <= 0xffff {
        format!("\\u{code:04x}")
    } else {
        format!("\\U{code:08x}")
    }
}

fn pad_text(spec: &Spec, text: &str) -> String {
    let textual = matches!(
        spec.conversion,
        Some(Conversion::Str | Conversion::Repr | Conversion::Ascii)
    );
    let truncated: String = match spec.precision {
        Some(precision) if textual => text.chars().take(precision).collect(),
        _ => text.to_owned(),
    };
    let fill = spec.width.saturating_sub(truncated.chars().count());
    if fill == 0 {
        return truncated;
    }
    let padding = " ".repeat(fill);
    if spec.flags.left {
        truncated + &padding
    } else {
        padding + &truncated
    }
}

fn pad_numeric(spec: &Spec, sign: &str, prefix: &str, body: &str) -> String {
    let used = sign.len() + prefix.len() + body.chars().count();
    let fill = spec.width.saturating_sub(used);
    let mut text = String::with_capacity(used + fill);
    if spec.flags.left {
        text.push_str(sign);
        text.push_str(prefix);
        text.push_str(body);
        text.push_str(&" ".repeat(fill));
    } else if spec.flags.zero {
        text.push_str(sign);
        text.push_str(prefix);
        text.push_str(&"0".repeat(fill));
        text.push_str(body);
    } else {
        text.push_str(&" ".repeat(fill));
        text.push_str(sign);
        text.push_str(prefix);
        text.push_str(body);
    }
    text
}
