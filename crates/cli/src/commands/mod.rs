//! Command implementations. Human-readable output goes to stdout; `--json`
//! switches to pretty-printed JSON.

pub mod cart;
pub mod catalog;
pub mod seed;

use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
