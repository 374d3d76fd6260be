//! War grammar: any non-empty address is an opaque key.

use crate::error::{Expected, InvalidLocation};

/// A war location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WarLocation {
    pub key: String,
}

impl WarLocation {
    pub(crate) fn parse(address: &str) -> Result<Self, InvalidLocation> {
        let key = address.trim();
        if key.is_empty() {
            return Err(InvalidLocation::new(
                address,
                "War locations cannot be empty.",
                Expected::Description("any non-empty name".to_string()),
            ));
        }
        Ok(Self {
            key: key.to_string(),
        })
    }
}
