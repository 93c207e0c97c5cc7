use std::fmt;

use industria_proto::SimConfig;

use crate::point::Point;

/// A named production rate in units per second.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub name: String,
    pub rate: f64,
}

impl Production {
    /// `amount` units per `duration` seconds; a zero duration yields rate 0.
    pub fn new(name: impl Into<String>, amount: f64, duration: f64) -> Self {
        let rate = if duration == 0.0 {
            0.0
        } else {
            amount / duration
        };
        Self {
            name: name.into(),
            rate,
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.name, self.rate)
    }
}

/// An ordered vector of productions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Products(Vec<Production>);

impl Products {
    pub fn new(members: Vec<Production>) -> Self {
        Self(members)
    }

    /// Sorted, comma-joined member names. Used as a group identifier when
    /// ranking producers for the cull.
    pub fn key(&self) -> String {
        let mut names = self
            .0
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names.join(",")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|p| p.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Production> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Products {
    type Item = &'a Production;
    type IntoIter = std::slice::Iter<'a, Production>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Cost of carrying one order between two points. Both endpoints pay it:
/// the buyer on the inbound leg, the seller on the outbound leg.
pub fn transport_cost(origin: Point, destination: Point, config: &SimConfig) -> f64 {
    config.transport_base_cost + origin.distance(destination) / config.transport_distance_divisor
}
