//! Process-wide snapshot of common builtin functions
//!
//! The snapshot is computed on first use and shared read-only by every
//! environment that asks for builtins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use minijinja::value::Rest;
use minijinja::{Error, ErrorKind, Value};

static BUILTINS: LazyLock<BTreeMap<&'static str, Value>> = LazyLock::new(|| {
    let mut items = BTreeMap::new();
    items.insert("len", Value::from_function(len));
    items.insert("str", Value::from_function(to_str));
    items.insert("int", Value::from_function(to_int));
    items.insert("float", Value::from_function(to_float));
    items.insert("bool", Value::from_function(to_bool));
    items.insert("abs", Value::from_function(abs));
    items.insert("min", Value::from_function(min));
    items.insert("max", Value::from_function(max));
    items.insert("sum", Value::from_function(sum));
    items.insert("sorted", Value::from_function(sorted));
    items.insert("reversed", Value::from_function(reversed));
    items.insert("enumerate", Value::from_function(enumerate));
    items.insert("zip", Value::from_function(zip));
    items.insert("list", Value::from_function(list));
    items.insert("round", Value::from_function(round));
    items.insert("chr", Value::from_function(chr));
    items.insert("ord", Value::from_function(ord));
    items.insert("any", Value::from_function(any));
    items.insert("all", Value::from_function(all));
    items
});

/// The builtin names and values
pub fn builtins() -> &'static BTreeMap<&'static str, Value> {
    &BUILTINS
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message)
}

fn overflow() -> Error {
    invalid("integer overflow")
}

fn items(value: &Value) -> Result<Vec<Value>, Error> {
    Ok(value.try_iter()?.collect())
}

fn len(value: Value) -> Result<Value, Error> {
    value
        .len()
        .map(Value::from)
        .ok_or_else(|| invalid(format!("object of type {} has no len()", value.kind())))
}

fn to_str(value: Value) -> String {
    value.to_string()
}

fn to_int(value: Value) -> Result<i64, Error> {
    if let Some(s) = value.as_str() {
        return s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid literal for int(): '{}'", s)));
    }
    if let Ok(i) = i64::try_from(value.clone()) {
        return Ok(i);
    }
    let f = f64::try_from(value)?;
    Ok(f.trunc() as i64)
}

fn to_float(value: Value) -> Result<f64, Error> {
    if let Some(s) = value.as_str() {
        return s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("could not convert string to float: '{}'", s)));
    }
    f64::try_from(value)
}

fn to_bool(value: Value) -> bool {
    value.is_true()
}

fn abs(value: Value) -> Result<Value, Error> {
    if let Ok(i) = i64::try_from(value.clone()) {
        return i.checked_abs().map(Value::from).ok_or_else(overflow);
    }
    Ok(Value::from(f64::try_from(value)?.abs()))
}

/// Arguments of `min`/`max`: either several values or a single iterable
fn candidates(args: Rest<Value>) -> Result<Vec<Value>, Error> {
    match args.len() {
        0 => Err(invalid("expected at least 1 argument")),
        1 => items(&args[0]),
        _ => Ok(args.0),
    }
}

fn pick(args: Rest<Value>, keep: std::cmp::Ordering) -> Result<Value, Error> {
    let mut best: Option<Value> = None;
    for value in candidates(args)? {
        best = match best {
            Some(current) if value.partial_cmp(&current) != Some(keep) => Some(current),
            _ => Some(value),
        };
    }
    best.ok_or_else(|| invalid("arg is an empty sequence"))
}

fn min(args: Rest<Value>) -> Result<Value, Error> {
    pick(args, std::cmp::Ordering::Less)
}

fn max(args: Rest<Value>) -> Result<Value, Error> {
    pick(args, std::cmp::Ordering::Greater)
}

fn sum(iterable: Value, start: Option<Value>) -> Result<Value, Error> {
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    let mut is_float = false;

    let start = start.into_iter();
    for value in start.chain(items(&iterable)?) {
        match i64::try_from(value.clone()) {
            Ok(i) if !is_float => int_total = int_total.checked_add(i).ok_or_else(overflow)?,
            _ => {
                if !is_float {
                    float_total = int_total as f64;
                    is_float = true;
                }
                float_total += f64::try_from(value)?;
            }
        }
    }

    Ok(if is_float {
        Value::from(float_total)
    } else {
        Value::from(int_total)
    })
}

fn sorted(iterable: Value) -> Result<Vec<Value>, Error> {
    let mut values = items(&iterable)?;
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(values)
}

fn reversed(iterable: Value) -> Result<Vec<Value>, Error> {
    let mut values = items(&iterable)?;
    values.reverse();
    Ok(values)
}

fn enumerate(iterable: Value, start: Option<i64>) -> Result<Vec<Value>, Error> {
    let start = start.unwrap_or(0);
    items(&iterable)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let index = i64::try_from(i)
                .ok()
                .and_then(|i| start.checked_add(i))
                .ok_or_else(overflow)?;
            Ok(Value::from(vec![Value::from(index), v]))
        })
        .collect()
}

fn zip(args: Rest<Value>) -> Result<Vec<Value>, Error> {
    let columns = args
        .iter()
        .map(items)
        .collect::<Result<Vec<_>, _>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    Ok((0..rows)
        .map(|row| Value::from(columns.iter().map(|c| c[row].clone()).collect::<Vec<_>>()))
        .collect())
}

fn list(iterable: Option<Value>) -> Result<Vec<Value>, Error> {
    match iterable {
        Some(value) => items(&value),
        None => Ok(Vec::new()),
    }
}

fn round(value: f64, ndigits: Option<i32>) -> Value {
    match ndigits {
        None => Value::from(value.round() as i64),
        Some(digits) => {
            let factor = 10f64.powi(digits);
            Value::from((value * factor).round() / factor)
        }
    }
}

fn chr(code: u32) -> Result<String, Error> {
    char::from_u32(code)
        .map(String::from)
        .ok_or_else(|| invalid(format!("chr() arg not in range: {}", code)))
}

fn ord(s: &str) -> Result<u32, Error> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(invalid(format!(
            "ord() expected a character, but string of length {} found",
            s.chars().count()
        ))),
    }
}

fn any(iterable: Value) -> Result<bool, Error> {
    Ok(items(&iterable)?.iter().any(Value::is_true))
}

fn all(iterable: Value) -> Result<bool, Error> {
    Ok(items(&iterable)?.iter().all(Value::is_true))
}
