//! Configuration access port trait.

use crate::domain::error::SigtraderError;

/// Typed access to `[section] key` values.
///
/// Numeric getters return `default` when the key is absent or blank, and
/// `ConfigInvalid` when a value is present but does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SigtraderError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, SigtraderError>;
}
