use serde::{Serialize, Serializer};

/// A supported city, in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Berlin,
    Munich,
    Hamburg,
    Frankfurt,
    Cologne,
    Stuttgart,
    Dresden,
    Leipzig,
}

/// Raised when a name is not one of [`City::all`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid city. Choose from: {}", City::choices())]
pub struct CityError {
    pub input: String,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Berlin => "Berlin",
            City::Munich => "Munich",
            City::Hamburg => "Hamburg",
            City::Frankfurt => "Frankfurt",
            City::Cologne => "Cologne",
            City::Stuttgart => "Stuttgart",
            City::Dresden => "Dresden",
            City::Leipzig => "Leipzig",
        }
    }

    pub const fn all() -> &'static [City] {
        &[
            City::Berlin,
            City::Munich,
            City::Hamburg,
            City::Frankfurt,
            City::Cologne,
            City::Stuttgart,
            City::Dresden,
            City::Leipzig,
        ]
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn normalize(input: &str) -> Option<City> {
        let needle = input.trim();
        City::all().iter().copied().find(|c| c.as_str().eq_ignore_ascii_case(needle))
    }

    /// Comma-separated canonical names, for error messages.
    pub fn choices() -> String {
        City::all().iter().map(City::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for City {
    type Error = CityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        City::normalize(value).ok_or_else(|| CityError { input: value.to_string() })
    }
}

impl Serialize for City {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
