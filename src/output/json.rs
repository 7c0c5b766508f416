use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::core::error::Result;

/// Pretty-prints `value` with tab indentation and a trailing newline.
///
/// Every map handed in is ordered (BTree-based), so key order in the output
/// is the canonical ascending order and stable across runs.
pub fn to_writer_pretty<T, W>(value: &T, mut writer: W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    to_writer_pretty(value, &mut buffer)?;
    // The serializer only emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes `value` to a file, creating or truncating it.
pub fn write_file<T: Serialize + ?Sized>(value: &T, output: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output)?);
    to_writer_pretty(value, &mut writer)?;
    writer.flush()?;
    Ok(())
}
