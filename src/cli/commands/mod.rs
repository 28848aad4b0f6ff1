pub mod db;
pub mod export;
pub mod form;
pub mod fund;
pub mod preview;
pub mod round;
pub mod section;
pub mod template;

use anyhow::{Context, Result};
use uuid::Uuid;

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("'{}' is not a valid {} id", raw, what))
}
