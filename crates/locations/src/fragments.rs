//! Splitting addresses into alternating alphabetic and numeric fragments.

use crate::catalog::Catalog;
use crate::error::{Expected, InvalidLocation};

/// One run of letters or digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Alpha(String),
    Number(u32),
}

/// Split an address into fragments. Any character that is neither an ASCII
/// letter nor a digit is rejected.
pub(crate) fn split(address: &str) -> Result<Vec<Fragment>, InvalidLocation> {
    let mut fragments = Vec::new();
    let mut chars = address.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_ascii_alphabetic() {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_alphabetic() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            fragments.push(Fragment::Alpha(address[start..end].to_lowercase()));
        } else if c.is_ascii_digit() {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let digits = &address[start..end];
            if digits.len() > 1 && digits.starts_with('0') {
                return Err(InvalidLocation::new(
                    address,
                    format!("`{}` has a leading zero.", digits),
                    Expected::Description("numbers written without leading zeros".to_string()),
                ));
            }
            let value = digits.parse::<u32>().map_err(|_| {
                InvalidLocation::new(
                    address,
                    format!("`{}` is too large to be a location number.", digits),
                    Expected::Description("a small base-10 number".to_string()),
                )
            })?;
            fragments.push(Fragment::Number(value));
        } else {
            return Err(InvalidLocation::new(
                address,
                format!("`{}` is not allowed in a location.", c),
                Expected::Description("only letters and digits".to_string()),
            ));
        }
    }

    Ok(fragments)
}

/// Left-to-right reader over an address's fragments.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    address: &'a str,
    fragments: Vec<Fragment>,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(address: &'a str) -> Result<Self, InvalidLocation> {
        Ok(Self {
            address,
            fragments: split(address)?,
            position: 0,
        })
    }

    pub(crate) fn address(&self) -> &'a str {
        self.address
    }

    pub(crate) fn is_done(&self) -> bool {
        self.position >= self.fragments.len()
    }

    /// Take the next fragment if it is alphabetic.
    pub(crate) fn alpha(&mut self) -> Option<String> {
        match self.fragments.get(self.position) {
            Some(Fragment::Alpha(text)) => {
                self.position += 1;
                Some(text.clone())
            }
            _ => None,
        }
    }

    /// Take the next fragment if it is numeric.
    pub(crate) fn number(&mut self) -> Option<u32> {
        match self.fragments.get(self.position) {
            Some(Fragment::Number(value)) => {
                self.position += 1;
                Some(*value)
            }
            _ => None,
        }
    }

    /// Render the unconsumed remainder for error messages.
    pub(crate) fn rest(&self) -> String {
        self.fragments[self.position.min(self.fragments.len())..]
            .iter()
            .map(|f| match f {
                Fragment::Alpha(text) => text.clone(),
                Fragment::Number(value) => value.to_string(),
            })
            .collect()
    }

    pub(crate) fn error(&self, message: impl Into<String>, expected: Expected) -> InvalidLocation {
        InvalidLocation::new(self.address, message, expected)
    }

    /// Take a number that must be labelled as `<prefix><n>` in the catalog.
    pub(crate) fn labelled_number(
        &mut self,
        catalog: &Catalog,
        prefix: &str,
        what: &str,
    ) -> Result<u32, InvalidLocation> {
        let Some(number) = self.number() else {
            return Err(self.error(
                format!("`{}` must be followed by a number identifying the {}.", prefix, what),
                expected_numbers(catalog, prefix),
            ));
        };
        if catalog.contains(&format!("{}{}", prefix, number)) {
            Ok(number)
        } else {
            Err(self.error(
                format!("There is no {} {} under `{}`.", what, number, prefix),
                expected_numbers(catalog, prefix),
            ))
        }
    }

    /// Fail if anything is left after a complete location.
    pub(crate) fn finish(&self, what: &str) -> Result<(), InvalidLocation> {
        if self.is_done() {
            Ok(())
        } else {
            Err(self.error(
                format!("Nothing may follow {}, found `{}`.", what, self.rest()),
                Expected::Description(format!("the address to end after {}", what)),
            ))
        }
    }
}

/// The valid numbers after `prefix`, as an expectation.
pub(crate) fn expected_numbers(catalog: &Catalog, prefix: &str) -> Expected {
    match catalog.range(prefix) {
        Some((min, max)) => Expected::Range { min, max },
        None => Expected::Description(format!("no numbered locations exist under `{}`", prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_alternating_runs() {
        assert_eq!(
            split("s12nB3").unwrap(),
            vec![
                Fragment::Alpha("s".into()),
                Fragment::Number(12),
                Fragment::Alpha("nb".into()),
                Fragment::Number(3),
            ]
        );
        assert!(split("").unwrap().is_empty());
    }

    #[test]
    fn test_split_rejects_other_characters() {
        let err = split("s1-b").unwrap_err();
        assert!(err.message.contains('-'));
        assert!(split("ds1é").is_err());
    }

    #[test]
    fn test_split_rejects_leading_zero() {
        let err = split("g01").unwrap_err();
        assert!(err.message.contains("`01`"));
        assert!(split("s3n007").is_err());
        assert_eq!(
            split("s10").unwrap(),
            vec![Fragment::Alpha("s".into()), Fragment::Number(10)]
        );
    }

    #[test]
    fn test_split_rejects_overflow() {
        assert!(split("s99999999999").is_err());
    }

    #[test]
    fn test_cursor_consumes_in_order() {
        let mut cursor = Cursor::new("ds2cm4").unwrap();
        assert_eq!(cursor.number(), None);
        assert_eq!(cursor.alpha().as_deref(), Some("ds"));
        assert_eq!(cursor.number(), Some(2));
        assert_eq!(cursor.rest(), "cm4");
        assert_eq!(cursor.alpha().as_deref(), Some("cm"));
        assert_eq!(cursor.number(), Some(4));
        assert!(cursor.finish("the mission").is_ok());
    }
}
