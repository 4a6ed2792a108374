use crate::error::ModelError;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Sort direction of a single property.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Direction::Ascending)
    }

    /// Value used in a MongoDB sort document.
    pub fn as_i32(&self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }

    /// Strict comparison operator selecting values after a position in this direction.
    pub fn seek_operator(&self) -> &'static str {
        match self {
            Direction::Ascending => "$gt",
            Direction::Descending => "$lt",
        }
    }

    /// Reads a direction back from a sort document value. Only the numeric
    /// forms `1` and `-1` are accepted, as on the server.
    pub fn from_sort_value(value: &Bson) -> Option<Self> {
        let numeric = match value {
            Bson::Int32(v) => Some(*v as i64),
            Bson::Int64(v) => Some(*v),
            Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }?;

        match numeric {
            1 => Some(Direction::Ascending),
            -1 => Some(Direction::Descending),
            _ => None,
        }
    }
}

impl FromStr for Direction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(Direction::Ascending),
            "desc" | "descending" | "-1" => Ok(Direction::Descending),
            other => Err(ModelError::InvalidSort(format!("unknown direction '{other}'"))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => write!(f, "ASC"),
            Direction::Descending => write!(f, "DESC"),
        }
    }
}

/// A property paired with the direction it is ordered by.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    property: String,
    direction: Direction,
}

impl Order {
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Order {
            property: property.into(),
            direction,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Ascending)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Descending)
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_ascending(&self) -> bool {
        self.direction.is_ascending()
    }
}

/// Parses `field`, `field:asc`, `field:desc` and `-field` (descending).
impl FromStr for Order {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(property) = s.strip_prefix('-') {
            return non_empty(property).map(Order::desc);
        }

        match s.split_once(':') {
            Some((property, direction)) => {
                let property = non_empty(property)?;
                Ok(Order::new(property, direction.parse()?))
            }
            None => non_empty(s).map(Order::asc),
        }
    }
}

fn non_empty(property: &str) -> Result<&str, ModelError> {
    let property = property.trim();
    if property.is_empty() {
        Err(ModelError::InvalidSort("empty property name".to_string()))
    } else {
        Ok(property)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.direction)
    }
}

/// Ordered sequence of [`Order`]s. A property appears at most once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// Builds a sort from the given orders. Later duplicates of a property are ignored.
    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Sort::unsorted().and(&Sort {
            orders: orders.into_iter().collect(),
        })
    }

    /// Ascending sort over the given properties.
    pub fn by_properties<S: AsRef<str>>(properties: &[S]) -> Self {
        Sort::by(properties.iter().map(|p| Order::asc(p.as_ref())))
    }

    pub fn unsorted() -> Self {
        Sort { orders: Vec::new() }
    }

    /// Returns a new sort with the orders of `other` appended, skipping properties already present.
    pub fn and(&self, other: &Sort) -> Sort {
        let mut orders = self.orders.clone();
        for order in &other.orders {
            if !orders.iter().any(|o| o.property == order.property) {
                orders.push(order.clone());
            }
        }
        Sort { orders }
    }

    pub fn get(&self, property: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.property == property)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.orders.iter().map(|o| o.property.as_str())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    /// MongoDB sort document, e.g. `{ "firstName": 1, "age": -1 }`.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for order in &self.orders {
            doc.insert(order.property.clone(), order.direction.as_i32());
        }
        doc
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

/// Parses a comma separated list of [`Order`] expressions, e.g. `lastName,age:desc`.
impl FromStr for Sort {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Sort::unsorted());
        }

        let orders = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Order>, _>>()?;
        Ok(Sort::by(orders))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orders.is_empty() {
            return write!(f, "UNSORTED");
        }

        let parts: Vec<String> = self.orders.iter().map(|o| o.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}
