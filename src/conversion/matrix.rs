// src/conversion/matrix.rs

//! Bidirectional conversion factor lookup

use super::material::Conversion;
use crate::units::Unit;
use std::collections::HashMap;

/// `factor(a, b)` converts one `a` into `b`s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionMatrix {
    factors: HashMap<Unit, HashMap<Unit, f64>>,
}

impl ConversionMatrix {
    /// Build the matrix from stored conversions
    ///
    /// Conversions without a usable factor are left out so that no
    /// reciprocal is ever taken of zero.
    pub fn from_conversions(conversions: &[Conversion]) -> Self {
        let mut matrix = Self::default();

        for conversion in conversions {
            let Some(factor) = conversion.usable_factor() else {
                continue;
            };

            matrix.insert(&conversion.in_unit, &conversion.out_unit, factor);
            matrix.insert(&conversion.out_unit, &conversion.in_unit, 1.0 / factor);
        }

        matrix
    }

    fn insert(&mut self, from: &Unit, to: &Unit, factor: f64) {
        self.factors
            .entry(from.clone())
            .or_default()
            .insert(to.clone(), factor);
    }

    /// Factor from `from` to `to`; identity lookups yield 1
    pub fn factor(&self, from: &Unit, to: &Unit) -> Option<f64> {
        if let Some(factor) = self.factors.get(from).and_then(|row| row.get(to)) {
            return Some(*factor);
        }

        (from == to).then_some(1.0)
    }

    /// Convert a quantity between two units
    pub fn convert(&self, value: f64, from: &Unit, to: &Unit) -> Option<f64> {
        self.factor(from, to).map(|f| value * f)
    }

    /// Units reachable from `from` in one step
    pub fn targets(&self, from: &Unit) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self
            .factors
            .get(from)
            .map(|row| row.keys().collect())
            .unwrap_or_default();
        units.sort();
        units
    }

    /// All directed entries, sorted by source then target unit
    pub fn entries(&self) -> Vec<(&Unit, &Unit, f64)> {
        let mut entries: Vec<(&Unit, &Unit, f64)> = self
            .factors
            .iter()
            .flat_map(|(from, row)| row.iter().map(move |(to, f)| (from, to, *f)))
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }

    /// Number of stored directed entries
    pub fn len(&self) -> usize {
        self.factors.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reciprocity() {
        let density = Conversion::new(1, Unit::m3(), Unit::kg(), 2400.0);
        let matrix = ConversionMatrix::from_conversions(&[density]);

        assert_eq!(matrix.factor(&Unit::m3(), &Unit::kg()), Some(2400.0));
        assert_eq!(matrix.factor(&Unit::kg(), &Unit::m3()), Some(1.0 / 2400.0));
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn test_zero_and_missing_factors_are_skipped() {
        let matrix = ConversionMatrix::from_conversions(&[
            Conversion::new(1, Unit::m3(), Unit::kg(), 0.0),
            Conversion::placeholder(1, Unit::m2(), Unit::kg()),
        ]);

        assert!(matrix.is_empty());
        assert_eq!(matrix.factor(&Unit::kg(), &Unit::m3()), None);
    }

    #[test]
    fn test_identity_and_convert() {
        let matrix =
            ConversionMatrix::from_conversions(&[Conversion::new(1, Unit::m2(), Unit::kg(), 12.5)]);

        assert_eq!(matrix.factor(&Unit::m(), &Unit::m()), Some(1.0));
        assert_eq!(matrix.convert(4.0, &Unit::m2(), &Unit::kg()), Some(50.0));
        assert_eq!(matrix.convert(4.0, &Unit::m2(), &Unit::m3()), None);
        assert_eq!(matrix.targets(&Unit::kg()), vec![&Unit::m2()]);
    }
}
