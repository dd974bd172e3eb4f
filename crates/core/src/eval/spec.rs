//! Format spec parsing and application for the standard evaluator.
//!
//! Grammar: `[[fill]align][sign][#][0][width][grouping][.precision][type]`.

use super::EvalError;
use crate::value::{Value, float_repr};

/// Largest width accepted, in characters.
pub const MAX_WIDTH: usize = 1 << 20;
/// Largest precision accepted. General notation may print a few more
/// digits than this; the total must stay within `u16::MAX`.
pub const MAX_PRECISION: usize = 1 << 15;

/// Alignment within the field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `<`
    Left,
    /// `>`
    Right,
    /// `^`
    Center,
    /// `=`: padding goes between the sign or prefix and the digits.
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

/// Sign policy for numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sign {
    /// `-` (default): sign only negatives.
    #[default]
    Negative,
    /// `+`: sign everything.
    Always,
    /// ` `: leading space for non-negatives.
    Space,
}

/// A parsed format spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// Padding character.
    pub fill: Option<char>,
    /// Explicit alignment.
    pub align: Option<Align>,
    /// Sign policy; `None` when no sign flag was written.
    pub sign: Option<Sign>,
    /// `#` alternate form.
    pub alternate: bool,
    /// `0` zero padding flag.
    pub zero: bool,
    /// Minimum width in characters.
    pub width: Option<usize>,
    /// Thousands separator, `,` or `_`.
    pub grouping: Option<char>,
    /// Precision after `.`.
    pub precision: Option<usize>,
    /// Presentation type character.
    pub ty: Option<char>,
}

impl FormatSpec {
    /// Parse spec text.
    pub fn parse(spec: &str) -> Result<Self, EvalError> {
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        let mut out = FormatSpec {
            fill: None,
            align: None,
            sign: None,
            alternate: false,
            zero: false,
            width: None,
            grouping: None,
            precision: None,
            ty: None,
        };

        if let Some(a) = chars.get(1).copied().and_then(Align::from_char) {
            out.fill = Some(chars[0]);
            out.align = Some(a);
            i = 2;
        } else if let Some(a) = chars.first().copied().and_then(Align::from_char) {
            out.align = Some(a);
            i = 1;
        }

        out.sign = match chars.get(i) {
            Some('+') => Some(Sign::Always),
            Some('-') => Some(Sign::Negative),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if out.sign.is_some() {
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            out.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }

        let (width, next) = read_number(&chars, i)?;
        if width.is_some_and(|w| w > MAX_WIDTH) {
            return Err(EvalError::InvalidSpec("width too big".into()));
        }
        out.width = width;
        i = next;

        if let Some(&g @ (',' | '_')) = chars.get(i) {
            out.grouping = Some(g);
            i += 1;
        }

        if chars.get(i) == Some(&'.') {
            let (precision, next) = read_number(&chars, i + 1)?;
            if precision.is_none() {
                return Err(EvalError::InvalidSpec(
                    "Format specifier missing precision".into(),
                ));
            }
            if precision.is_some_and(|p| p > MAX_PRECISION) {
                return Err(EvalError::InvalidSpec("precision too big".into()));
            }
            out.precision = precision;
            i = next;
        }

        if let Some(&ty) = chars.get(i) {
            out.ty = Some(ty);
            i += 1;
        }
        if i < chars.len() {
            return Err(EvalError::InvalidSpec(format!(
                "Invalid format specifier '{spec}'"
            )));
        }
        Ok(out)
    }
}

fn read_number(chars: &[char], start: usize) -> Result<(Option<usize>, usize), EvalError> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Ok((None, start));
    }
    let text: String = chars[start..end].iter().collect();
    let n = text
        .parse()
        .map_err(|_| EvalError::InvalidSpec("Too many decimal digits in format string".into()))?;
    Ok((Some(n), end))
}

/// Format `value` according to `spec` text.
pub fn apply_spec(value: &Value, spec: &str) -> Result<String, EvalError> {
    if spec.is_empty() {
        return Ok(value.to_plain());
    }
    let fs = FormatSpec::parse(spec)?;
    match value {
        Value::Str(s) => format_str(s, &fs),
        Value::Bool(b) => format_int(i64::from(*b), &fs, value),
        Value::Int(i) => format_int(*i, &fs, value),
        Value::Float(f) => format_float(*f, &fs, value),
        other => Err(EvalError::InvalidSpec(format!(
            "unsupported format string passed to {}",
            other.type_name()
        ))),
    }
}

fn format_str(s: &str, fs: &FormatSpec) -> Result<String, EvalError> {
    if let Some(ty) = fs.ty.filter(|t| *t != 's') {
        return Err(unknown_code(ty, "str"));
    }
    if fs.sign.is_some() {
        return Err(EvalError::InvalidSpec(
            "Sign not allowed in string format specifier".into(),
        ));
    }
    if fs.alternate {
        return Err(EvalError::InvalidSpec(
            "Alternate form (#) not allowed in string format specifier".into(),
        ));
    }
    if fs.align == Some(Align::AfterSign) {
        return Err(EvalError::InvalidSpec(
            "'=' alignment not allowed in string format specifier".into(),
        ));
    }
    if let Some(g) = fs.grouping {
        return Err(EvalError::InvalidSpec(format!("Cannot specify '{g}' with 's'.")));
    }
    let body: String = match fs.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    let fill = fs.fill.unwrap_or(if fs.zero { '0' } else { ' ' });
    Ok(pad("", &body, fill, fs.align.unwrap_or(Align::Left), fs.width))
}

fn format_int(n: i64, fs: &FormatSpec, value: &Value) -> Result<String, EvalError> {
    let ty = fs.ty.unwrap_or('d');
    if matches!(ty, 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') {
        return format_float(n as f64, fs, value);
    }
    if fs.precision.is_some() {
        return Err(EvalError::InvalidSpec(
            "Precision not allowed in integer format specifier".into(),
        ));
    }
    let mag = n.unsigned_abs();
    let (prefix, digits) = match ty {
        'd' | 'n' => ("", mag.to_string()),
        'b' => ("0b", format!("{mag:b}")),
        'o' => ("0o", format!("{mag:o}")),
        'x' => ("0x", format!("{mag:x}")),
        'X' => ("0X", format!("{mag:X}")),
        'c' => {
            let c = u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| EvalError::InvalidSpec("%c arg not in range(0x110000)".into()))?;
            let fill = fs.fill.unwrap_or(' ');
            return Ok(pad("", &c.to_string(), fill, fs.align.unwrap_or(Align::Right), fs.width));
        }
        other => return Err(unknown_code(other, value.type_name())),
    };

    let digits = match fs.grouping {
        Some(',') if ty != 'd' => {
            return Err(EvalError::InvalidSpec(format!("Cannot specify ',' with '{ty}'.")));
        }
        Some(g) => group(&digits, g, if ty == 'd' || ty == 'n' { 3 } else { 4 }),
        None => digits,
    };
    let mut lead = sign_text(n < 0, fs.sign).to_string();
    if fs.alternate {
        lead.push_str(prefix);
    }
    Ok(pad_number(&lead, &digits, fs))
}

fn format_float(x: f64, fs: &FormatSpec, value: &Value) -> Result<String, EvalError> {
    let mag = x.abs();
    let body = match fs.ty {
        None => match fs.precision {
            None => float_repr(mag),
            Some(p) => {
                let g = general(mag, p, fs.alternate, false);
                if mag.is_finite() && !g.contains(['.', 'e']) {
                    g + ".0"
                } else {
                    g
                }
            }
        },
        Some('f') => fixed(mag, fs.precision.unwrap_or(6), false),
        Some('F') => fixed(mag, fs.precision.unwrap_or(6), true),
        Some('e') => scientific(mag, fs.precision.unwrap_or(6), false),
        Some('E') => scientific(mag, fs.precision.unwrap_or(6), true),
        Some('g' | 'n') => general(mag, fs.precision.unwrap_or(6), fs.alternate, false),
        Some('G') => general(mag, fs.precision.unwrap_or(6), fs.alternate, true),
        Some('%') => fixed(mag * 100.0, fs.precision.unwrap_or(6), false) + "%",
        Some(other) => return Err(unknown_code(other, value.type_name())),
    };
    let body = match fs.grouping {
        Some(g) => group_float(&body, g),
        None => body,
    };
    let negative = x.is_sign_negative() && !x.is_nan() && x != 0.0;
    Ok(pad_number(sign_text(negative, fs.sign), &body, fs))
}

fn fixed(x: f64, precision: usize, upper: bool) -> String {
    if !x.is_finite() {
        return non_finite(x, upper);
    }
    format!("{x:.precision$}")
}

fn scientific(x: f64, precision: usize, upper: bool) -> String {
    if !x.is_finite() {
        return non_finite(x, upper);
    }
    let raw = format!("{x:.precision$e}");
    let (mantissa, exp) = split_exp(&raw);
    let e = if upper { 'E' } else { 'e' };
    format!("{mantissa}{e}{}{:02}", if exp < 0 { '-' } else { '+' }, exp.abs())
}

fn general(x: f64, precision: usize, alternate: bool, upper: bool) -> String {
    if !x.is_finite() {
        return non_finite(x, upper);
    }
    let p = precision.max(1);
    let exp = if x == 0.0 {
        0
    } else {
        split_exp(&format!("{x:.prec$e}", prec = p - 1)).1
    };
    let p_signed = i64::try_from(p).unwrap_or(i64::MAX);
    let text = if (-4..p_signed).contains(&exp) {
        let decimals = usize::try_from(p_signed - 1 - exp).unwrap_or(0);
        format!("{x:.decimals$}")
    } else {
        scientific(x, p - 1, upper)
    };
    if alternate {
        text
    } else {
        strip_zeros(&text)
    }
}

fn split_exp(s: &str) -> (&str, i64) {
    match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn strip_zeros(text: &str) -> String {
    let (mantissa, rest) = match text.find(['e', 'E']) {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{rest}")
}

fn non_finite(x: f64, upper: bool) -> String {
    let s = if x.is_nan() { "nan" } else { "inf" };
    if upper { s.to_uppercase() } else { s.to_string() }
}

fn sign_text(negative: bool, sign: Option<Sign>) -> &'static str {
    match (negative, sign.unwrap_or_default()) {
        (true, _) => "-",
        (false, Sign::Always) => "+",
        (false, Sign::Space) => " ",
        (false, Sign::Negative) => "",
    }
}

fn group(digits: &str, sep: char, every: usize) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / every);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % every == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn group_float(body: &str, sep: char) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (int_part, rest) = body.split_at(split);
    format!("{}{rest}", group(int_part, sep, 3))
}

fn pad_number(lead: &str, body: &str, fs: &FormatSpec) -> String {
    let (fill, align) = match (fs.fill, fs.align) {
        (None, None) if fs.zero => ('0', Align::AfterSign),
        (fill, align) => (fill.unwrap_or(' '), align.unwrap_or(Align::Right)),
    };
    pad(lead, body, fill, align, fs.width)
}

fn pad(lead: &str, body: &str, fill: char, align: Align, width: Option<usize>) -> String {
    let len = lead.chars().count() + body.chars().count();
    let Some(missing) = width.and_then(|w| w.checked_sub(len)).filter(|m| *m > 0) else {
        return format!("{lead}{body}");
    };
    let fills = |n: usize| std::iter::repeat_n(fill, n).collect::<String>();
    match align {
        Align::Left => format!("{lead}{body}{}", fills(missing)),
        Align::Right => format!("{}{lead}{body}", fills(missing)),
        Align::Center => {
            let left = missing / 2;
            format!("{}{lead}{body}{}", fills(left), fills(missing - left))
        }
        Align::AfterSign => format!("{lead}{}{body}", fills(missing)),
    }
}

fn unknown_code(code: char, type_name: &'static str) -> EvalError {
    EvalError::UnsupportedType { code, type_name }
}
