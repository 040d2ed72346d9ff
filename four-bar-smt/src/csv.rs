//! Functions for reading/writing target points in CSV format.
//!
//! One `x,y` pair per row, no header, `#` starts a comment line.
//!
//! ```
//! use four_bar_smt::csv::{dump_targets, parse_targets};
//!
//! let targets = parse_targets("# unit circle\n0,1\n1,0\n0,-1\n-1,0\n").unwrap();
//! assert_eq!(targets, [[0., 1.], [1., 0.], [0., -1.], [-1., 0.]]);
//! assert_eq!(parse_targets(&dump_targets(&targets).unwrap()).unwrap(), targets);
//! ```
pub use csv::Error;
use csv::{ReaderBuilder, Writer};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Cursor;

/// Parse CSV rows from string.
pub fn parse_csv<D>(s: &str) -> Result<Vec<D>, Error>
where
    D: DeserializeOwned,
{
    ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(s))
        .deserialize()
        .collect()
}

/// Dump CSV rows to string.
pub fn dump_csv<S>(rows: &[S]) -> Result<String, Box<dyn std::error::Error>>
where
    S: Serialize,
{
    let mut w = Writer::from_writer(Vec::new());
    rows.iter().try_for_each(|row| w.serialize(row))?;
    Ok(String::from_utf8(w.into_inner()?)?)
}

/// Parse target points.
pub fn parse_targets(s: &str) -> Result<Vec<[f64; 2]>, Error> {
    parse_csv(s)
}

/// Dump target points.
pub fn dump_targets(targets: &[[f64; 2]]) -> Result<String, Box<dyn std::error::Error>> {
    dump_csv(targets)
}
