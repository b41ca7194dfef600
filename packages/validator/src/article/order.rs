//! The 5-digit order key of an article within its issue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{validate_order, DEFAULT_ORDER, ORDER_WIDTH};
use crate::error::{Result, ValidatorError};

/// Position of a document within its issue, always five ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Order(String);

impl Order {
    /// Derive the order from the publisher sequence id, else from the first page.
    ///
    /// Candidates that are not made of digits are passed over. The value is
    /// left-padded with zeros and the last five digits are kept.
    ///
    /// # Examples
    /// ```
    /// use sps_validator::article::Order;
    ///
    /// assert_eq!(Order::derive(Some("12"), Some("301")).as_str(), "00012");
    /// assert_eq!(Order::derive(None, Some("301")).as_str(), "00301");
    /// assert_eq!(Order::derive(None, Some("e123")).as_str(), "00000");
    /// ```
    pub fn derive(article_id_other: Option<&str>, fpage: Option<&str>) -> Self {
        let digits = [article_id_other, fpage]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()));

        match digits {
            Some(digits) => {
                let padded = format!("{DEFAULT_ORDER}{digits}");
                Self(padded[padded.len() - ORDER_WIDTH..].to_string())
            }
            None => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Order {
    fn default() -> Self {
        Self(DEFAULT_ORDER.to_string())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Order {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self> {
        validate_order(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Order {
    type Error = ValidatorError;

    fn try_from(value: String) -> Result<Self> {
        validate_order(&value)?;
        Ok(Self(value))
    }
}

impl From<Order> for String {
    fn from(order: Order) -> Self {
        order.0
    }
}
