use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Category of substitute value to generate for a field.
///
/// Parsing never fails: an unrecognized tag becomes [`TypeTag::Other`] and
/// is served by the generator's fallback rule (a generic word).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `name`: a first name.
    Name,
    /// `company`: a company name.
    Company,
    /// `email`: an e-mail address.
    Email,
    /// `address`: a street address.
    Address,
    /// `date`: an extended-JSON date (`{"$date": ...}`).
    Date,
    /// `datestr`: a `YYYY-MM-DD` string.
    DateStr,
    /// `zipcode`: a zip code.
    ZipCode,
    /// `statecode`: a two-letter state abbreviation.
    StateCode,
    /// `lastname`: a last name.
    LastName,
    /// `lastnamefirstname`: `Last,First`.
    LastNameFirstName,
    /// `city`: a city name.
    City,
    /// `id`: a numeric string.
    Id,
    /// Any other tag.
    Other(String),
}

impl TypeTag {
    /// The tag as written in a field map.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Email => "email",
            Self::Address => "address",
            Self::Date => "date",
            Self::DateStr => "datestr",
            Self::ZipCode => "zipcode",
            Self::StateCode => "statecode",
            Self::LastName => "lastname",
            Self::LastNameFirstName => "lastnamefirstname",
            Self::City => "city",
            Self::Id => "id",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the tag is one of the known categories.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        match tag {
            "name" => Self::Name,
            "company" => Self::Company,
            "email" => Self::Email,
            "address" => Self::Address,
            "date" => Self::Date,
            "datestr" => Self::DateStr,
            "zipcode" => Self::ZipCode,
            "statecode" => Self::StateCode,
            "lastname" => Self::LastName,
            "lastnamefirstname" => Self::LastNameFirstName,
            "city" => Self::City,
            "id" => Self::Id,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for TypeTag {
    type Err = Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(tag))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}
