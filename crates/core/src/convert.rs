//! Literal conversion helpers.
//!
//! These are total functions: a conversion that cannot parse its input
//! returns `0`/`0.0` rather than an error, matching `System.toint` and
//! `System.tofloat`.

/// Parse `s` as a signed integer; `0` on anything that doesn't parse.
pub fn convert_to_int(s: &str) -> i64 {
    s.trim().parse::<i64>().unwrap_or(0)
}

/// Parse `s` as an IEEE-754 double; `0.0` on anything that doesn't parse.
pub fn convert_to_float(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

pub fn convert_from_int(n: i64) -> String {
    n.to_string()
}

pub fn convert_from_float(f: f64) -> String {
    f.to_string()
}

pub fn convert_from_char(c: char) -> String {
    c.to_string()
}
