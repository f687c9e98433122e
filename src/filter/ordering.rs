use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Dsc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Dsc,
            SortDirection::Dsc => SortDirection::Asc,
        }
    }
}

/// Sort column and direction of a list view.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct SortOrder {
    pub name: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn dsc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Dsc,
        }
    }

    pub fn toggled(self) -> Self {
        Self {
            direction: self.direction.flipped(),
            ..self
        }
    }

    /// Query parameter form: `-name` when descending, `name` when ascending.
    pub fn to_param(&self) -> String {
        self.to_string()
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            SortDirection::Asc => f.write_str(&self.name),
            SortDirection::Dsc => write!(f, "-{}", self.name),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("ordering parameter `{0}` has no field name")]
pub struct OrderingParseError(pub String);

impl FromStr for SortOrder {
    type Err = OrderingParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, direction) = match input.strip_prefix('-') {
            Some(name) => (name, SortDirection::Dsc),
            None => (input, SortDirection::Asc),
        };
        if name.is_empty() {
            return Err(OrderingParseError(input.to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            direction,
        })
    }
}
