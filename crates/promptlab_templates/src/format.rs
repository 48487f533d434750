//! Output formatting for printed values.
//!
//! Values reaching `{{ … }}` are stringified the way JavaScript template
//! engines do it, so a prompt renders to the same text it would in the
//! browser playground:
//!
//! | Value | Output |
//! |-------|--------|
//! | none / undefined | empty |
//! | `true` | `true` |
//! | `1.0`, `1e3` | `1`, `1000` |
//! | `["a", "b"]` | `a,b` |
//! | `{"k": 1}` | `[object Object]` |
//!
//! With autoescaping on, only `& " ' < > \` are escaped.

use std::fmt::Write;

use minijinja::value::{Value, ValueKind};
use minijinja::{AutoEscape, Error, Output, State};

/// Formatter installed on every rendering environment.
pub(crate) fn format_value(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
    let text = display_string(value);
    if value.is_safe() || matches!(state.auto_escape(), AutoEscape::None) {
        out.write_str(&text)?;
    } else {
        out.write_str(&escape_html(&text))?;
    }
    Ok(())
}

/// String form of a value as a JavaScript engine would print it.
pub fn display_string(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => String::new(),
        ValueKind::Bool => value.is_true().to_string(),
        ValueKind::Number => number_string(value),
        ValueKind::String => value.as_str().unwrap_or_default().to_string(),
        ValueKind::Seq | ValueKind::Iterable => join_elements(value),
        ValueKind::Map => "[object Object]".to_string(),
        _ => value.to_string(),
    }
}

/// Array-to-string: elements joined by commas, none and undefined as empty.
fn join_elements(value: &Value) -> String {
    match value.try_iter() {
        Ok(items) => items
            .map(|item| display_string(&item))
            .collect::<Vec<_>>()
            .join(","),
        Err(_) => value.to_string(),
    }
}

fn number_string(value: &Value) -> String {
    if value.is_integer() {
        return value.to_string();
    }
    match f64::try_from(value.clone()) {
        Ok(number) => js_number(number),
        Err(_) => value.to_string(),
    }
}

/// JavaScript `Number#toString` for finite and non-finite floats.
fn js_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if number == 0.0 {
        return "0".to_string();
    }

    let magnitude = number.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return number.to_string();
    }

    // Exponent notation always carries a sign: 1e+21, 1e-7
    let formatted = format!("{:e}", number);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// HTML-escape `& " ' < > \`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\\' => escaped.push_str("&#92;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
