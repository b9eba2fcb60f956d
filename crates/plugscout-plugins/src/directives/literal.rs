//! Decoding of Go string and rune literals.

/// Decode a quoted Go literal (`"..."`, `` `...` `` or `'.'`) into its value.
///
/// Returns a short reason on failure; the caller attaches the literal text.
pub(crate) fn unquote(literal: &str) -> Result<String, String> {
    let mut chars = literal.chars();
    let (Some(quote), Some(closing)) = (chars.next(), chars.next_back()) else {
        return Err("invalid syntax".to_string());
    };
    if quote != closing || !matches!(quote, '"' | '\'' | '`') {
        return Err("invalid syntax".to_string());
    }
    let body = chars.as_str();

    if quote == '`' {
        if body.contains('`') {
            return Err("invalid syntax".to_string());
        }
        return Ok(body.replace('\r', ""));
    }
    if body.contains('\n') {
        return Err("newline in literal".to_string());
    }

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut units = 0usize;
    let mut rest = body.chars();
    while let Some(c) = rest.next() {
        units = units.saturating_add(1);
        if c == quote {
            return Err("unescaped quote".to_string());
        }
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let escape = rest.next().ok_or_else(|| "unterminated escape".to_string())?;
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '\'' | '"' if escape == quote => push_char(&mut out, escape),
            'x' => {
                let value = take_digits(&mut rest, 2, 16)?;
                push_byte(&mut out, value, quote)?;
            },
            '0'..='7' => {
                let tail = take_digits(&mut rest, 2, 8)?;
                let high = escape.to_digit(8).unwrap_or_default();
                let value = high
                    .checked_mul(64)
                    .and_then(|v| v.checked_add(tail))
                    .filter(|v| *v <= 0xff)
                    .ok_or_else(|| "octal escape value > 255".to_string())?;
                push_byte(&mut out, value, quote)?;
            },
            'u' | 'U' => {
                let width = if escape == 'u' { 4 } else { 8 };
                let value = take_digits(&mut rest, width, 16)?;
                let decoded = char::from_u32(value)
                    .ok_or_else(|| format!("escape sequence is invalid Unicode code point {value:#x}"))?;
                push_char(&mut out, decoded);
            },
            other => return Err(format!("unknown escape sequence \\{other}")),
        }
    }

    if quote == '\'' && units != 1 {
        return Err("rune literal must contain exactly one character".to_string());
    }
    String::from_utf8(out).map_err(|_| "literal is not valid UTF-8".to_string())
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Byte escapes are raw bytes in strings and code points in rune literals.
fn push_byte(out: &mut Vec<u8>, value: u32, quote: char) -> Result<(), String> {
    if quote == '\'' {
        let c = char::from_u32(value).ok_or_else(|| "invalid code point".to_string())?;
        push_char(out, c);
        return Ok(());
    }
    let byte = u8::try_from(value).map_err(|_| "byte escape out of range".to_string())?;
    out.push(byte);
    Ok(())
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| "invalid escape sequence".to_string())?;
        value = value
            .checked_mul(radix)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| "escape sequence overflows".to_string())?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_interpreted_string() {
        assert_eq!(unquote(r#""realip""#).unwrap(), "realip");
    }

    #[test]
    fn interpreted_escapes() {
        assert_eq!(unquote(r#""a\tb\n""#).unwrap(), "a\tb\n");
        assert_eq!(unquote(r#""\x41\101é""#).unwrap(), "AAé");
        assert_eq!(unquote(r#""say \"hi\"""#).unwrap(), "say \"hi\"");
    }

    #[test]
    fn raw_string_strips_carriage_returns() {
        assert_eq!(unquote("`a\\n\r\nb`").unwrap(), "a\\n\nb");
    }

    #[test]
    fn rune_literal() {
        assert_eq!(unquote("'x'").unwrap(), "x");
        assert!(unquote("'xy'").is_err());
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(unquote("realip").is_err());
        assert!(unquote(r#""unterminated"#).is_err());
        assert!(unquote(r#""bad \q escape""#).is_err());
        assert!(unquote(r#""\'""#).is_err());
        assert!(unquote(r#""\400""#).is_err());
        assert!(unquote(r#""\ud800""#).is_err());
        assert!(unquote("42").is_err());
    }

    #[test]
    fn invalid_utf8_bytes_are_rejected() {
        assert!(unquote(r#""\xff""#).is_err());
    }
}
