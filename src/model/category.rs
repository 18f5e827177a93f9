use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The category of an expense.
///
/// The built-in set is closed, but the configuration may add names to it. Names that match none
/// of the built-in categories are carried as `Custom` so that values read from a ledger file are
/// written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Food,
    Transport,
    BillsCard,
    Shopping,
    BillsElectricity,
    Other,
    Custom(String),
}

impl Category {
    /// The built-in categories in the order they are offered to the user.
    pub const BUILT_IN: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::BillsCard,
        Category::Shopping,
        Category::BillsElectricity,
        Category::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => FOOD_STR,
            Category::Transport => TRANSPORT_STR,
            Category::BillsCard => BILLS_CARD_STR,
            Category::Shopping => SHOPPING_STR,
            Category::BillsElectricity => BILLS_ELECTRICITY_STR,
            Category::Other => OTHER_STR,
            Category::Custom(s) => s.as_str(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }

    /// Matches `s` against the built-in names, ignoring case and surrounding whitespace. Also
    /// recognizes the spellings used by older ledger files.
    fn built_in(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::BUILT_IN
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .or_else(|| {
                if s.eq_ignore_ascii_case(LEGACY_BILLS_CARD_STR) {
                    Some(Category::BillsCard)
                } else if s.eq_ignore_ascii_case(LEGACY_BILLS_ELECTRICITY_STR) {
                    Some(Category::BillsElectricity)
                } else {
                    None
                }
            })
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::built_in(s).unwrap_or_else(|| Category::Custom(s.to_string())))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Category::Other))
    }
}

/// The set of categories a user may choose from: the built-ins plus any configured extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    extra: Vec<String>,
}

impl Default for Categories {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Categories {
    pub fn new<S, I>(extra: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let extra = extra
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty() && Category::built_in(s).is_none())
            .collect();
        Self { extra }
    }

    /// Resolves user input to an allowed category, or `None` if the input names no category in
    /// this set.
    pub fn resolve(&self, input: &str) -> Option<Category> {
        if let Some(c) = Category::built_in(input) {
            return Some(c);
        }
        let input = input.trim();
        self.extra
            .iter()
            .find(|name| name.eq_ignore_ascii_case(input))
            .map(|name| Category::Custom(name.clone()))
    }

    /// All allowed categories, built-ins first.
    pub fn all(&self) -> Vec<Category> {
        Category::BUILT_IN
            .into_iter()
            .chain(self.extra.iter().cloned().map(Category::Custom))
            .collect()
    }
}

pub(super) const FOOD_STR: &str = "Food";
pub(super) const TRANSPORT_STR: &str = "Transport";
pub(super) const BILLS_CARD_STR: &str = "Bills-Card";
pub(super) const SHOPPING_STR: &str = "Shopping";
pub(super) const BILLS_ELECTRICITY_STR: &str = "Bills-Electricity";
pub(super) const OTHER_STR: &str = "Other";

const LEGACY_BILLS_CARD_STR: &str = "card-Bills";
const LEGACY_BILLS_ELECTRICITY_STR: &str = "electricity-bills";
