//! `std/string` built-ins.
//!
//! Every function here follows the same type/range/negative-index rules as
//! the core indexing/slicing operators in `eval::expr` — deliberately
//! duplicated rather than shared, since the two call sites bind arguments
//! differently (positional-only here vs. full named/default matching for
//! user calls).

use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::imports::STD_STRING_FUNCS;
use crate::value::Value;

pub fn is_string_fn(name: &str) -> bool {
    STD_STRING_FUNCS.contains(&name)
}

pub fn call_string_fn(name: &str, args: &[Value], loc: SourceLoc) -> CResult<Value> {
    match name {
        "len" => {
            let s = one_str(args, loc, "len")?;
            Ok(Value::Int(s.as_bytes().len() as i64))
        }
        "trim" => {
            let s = one_str(args, loc, "trim")?;
            Ok(Value::Str(s.trim().to_owned()))
        }
        "contains" => {
            let (s, sub) = two_str(args, loc, "contains")?;
            Ok(Value::Bool(s.contains(sub.as_str())))
        }
        "replace" => {
            let (s, old, new) = three_str(args, loc, "replace")?;
            if old.is_empty() {
                Ok(Value::Str(s))
            } else {
                Ok(Value::Str(s.replace(old.as_str(), &new)))
            }
        }
        "to_upper" => {
            let s = one_str(args, loc, "to_upper")?;
            Ok(Value::Str(s.to_uppercase()))
        }
        "to_lower" => {
            let s = one_str(args, loc, "to_lower")?;
            Ok(Value::Str(s.to_lowercase()))
        }
        "starts_with" => {
            let (s, p) = two_str(args, loc, "starts_with")?;
            Ok(Value::Bool(s.starts_with(p.as_str())))
        }
        "ends_with" => {
            let (s, p) = two_str(args, loc, "ends_with")?;
            Ok(Value::Bool(s.ends_with(p.as_str())))
        }
        "index_of" => {
            let (s, sub) = two_str(args, loc, "index_of")?;
            Ok(Value::Int(s.find(sub.as_str()).map_or(-1, |b| b as i64)))
        }
        "char_at" => {
            let (s, i) = one_str_one_int(args, loc, "char_at")?;
            let bytes = s.as_bytes();
            let len = bytes.len() as i64;
            let resolved = if i < 0 { i + len } else { i };
            if resolved < 0 || resolved >= len {
                return Err(Diagnostic::error(loc, format!("char_at index {i} out of range for length {len}")));
            }
            Ok(Value::Str(String::from_utf8_lossy(&[bytes[resolved as usize]]).into_owned()))
        }
        "substr" => {
            let (s, a, b) = one_str_two_int(args, loc, "substr")?;
            let bytes = s.as_bytes();
            let len = bytes.len() as i64;
            let resolve = |v: i64| if v < 0 { v + len } else { v };
            let a = resolve(a).clamp(0, len);
            let b = resolve(b).clamp(0, len);
            if a >= b {
                Ok(Value::Str(String::new()))
            } else {
                Ok(Value::Str(String::from_utf8_lossy(&bytes[a as usize..b as usize]).into_owned()))
            }
        }
        other => Err(Diagnostic::error(loc, format!("unknown std/string function '{other}'"))),
    }
}

fn one_str(args: &[Value], loc: SourceLoc, name: &str) -> CResult<String> {
    match args {
        [Value::Str(s)] => Ok(s.clone()),
        [v] => Err(Diagnostic::error(loc, format!("{name} requires a string, found {}", v.type_name()))),
        _ => Err(Diagnostic::error(loc, format!("{name} takes exactly one argument"))),
    }
}

fn two_str(args: &[Value], loc: SourceLoc, name: &str) -> CResult<(String, String)> {
    match args {
        [Value::Str(a), Value::Str(b)] => Ok((a.clone(), b.clone())),
        [_, _] => Err(Diagnostic::error(loc, format!("{name} requires two strings"))),
        _ => Err(Diagnostic::error(loc, format!("{name} takes exactly two arguments"))),
    }
}

fn three_str(args: &[Value], loc: SourceLoc, name: &str) -> CResult<(String, String, String)> {
    match args {
        [Value::Str(a), Value::Str(b), Value::Str(c)] => Ok((a.clone(), b.clone(), c.clone())),
        [_, _, _] => Err(Diagnostic::error(loc, format!("{name} requires three strings"))),
        _ => Err(Diagnostic::error(loc, format!("{name} takes exactly three arguments"))),
    }
}

fn one_str_one_int(args: &[Value], loc: SourceLoc, name: &str) -> CResult<(String, i64)> {
    match args {
        [Value::Str(s), Value::Int(i)] => Ok((s.clone(), *i)),
        [_, _] => Err(Diagnostic::error(loc, format!("{name} requires a string and an int"))),
        _ => Err(Diagnostic::error(loc, format!("{name} takes exactly two arguments"))),
    }
}

fn one_str_two_int(args: &[Value], loc: SourceLoc, name: &str) -> CResult<(String, i64, i64)> {
    match args {
        [Value::Str(s), Value::Int(a), Value::Int(b)] => Ok((s.clone(), *a, *b)),
        [_, _, _] => Err(Diagnostic::error(loc, format!("{name} requires a string and two ints"))),
        _ => Err(Diagnostic::error(loc, format!("{name} takes exactly three arguments"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_with_empty_old_is_identity() {
        let args = [Value::Str("abc".into()), Value::Str(String::new()), Value::Str("x".into())];
        let result = call_string_fn("replace", &args, SourceLoc::default()).unwrap();
        assert!(matches!(result, Value::Str(s) if s == "abc"));
    }

    #[test]
    fn index_of_returns_negative_one_when_absent() {
        let args = [Value::Str("abc".into()), Value::Str("z".into())];
        let result = call_string_fn("index_of", &args, SourceLoc::default()).unwrap();
        assert!(matches!(result, Value::Int(-1)));
    }

    #[test]
    fn char_at_negative_index_wraps_from_end() {
        let args = [Value::Str("abc".into()), Value::Int(-1)];
        let result = call_string_fn("char_at", &args, SourceLoc::default()).unwrap();
        assert!(matches!(result, Value::Str(s) if s == "c"));
    }
}
