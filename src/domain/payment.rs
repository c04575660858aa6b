use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Outcome of a payment as reported by the payment authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failed,
    /// Any other status string, e.g. a payment that was created but never executed.
    Other(String),
}

impl PaymentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&str> for PaymentStatus {
    fn from(status: &str) -> Self {
        match status {
            "Success" => Self::Success,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Failed => f.write_str("Failed"),
            Self::Other(status) => f.write_str(status),
        }
    }
}
