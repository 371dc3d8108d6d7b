//! Ordered screen selection held by the map page and fed into the inquiry form

use serde::Serialize;
use std::collections::BTreeMap;

/// Screen names in the order they were picked, with each screen's city
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    names: Vec<String>,
    cities: BTreeMap<String, String>,
}

impl Selection {
    /// Add the screen if absent, remove it if present. Returns whether the
    /// screen is selected afterwards.
    pub fn toggle(&mut self, name: &str, city: &str) -> bool {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
            self.cities.remove(name);
            false
        } else {
            self.names.push(name.to_string());
            self.cities.insert(name.to_string(), city.to_string());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// name -> city for every selected screen
    pub fn cities(&self) -> &BTreeMap<String, String> {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Selection {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut selection = Selection::default();
        for (name, city) in iter {
            if !selection.contains(name) {
                selection.toggle(name, city);
            }
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::default();
        assert!(selection.toggle("Gedimino pr.", "Vilnius"));
        assert!(selection.contains("Gedimino pr."));
        assert_eq!(selection.cities().get("Gedimino pr.").map(String::as_str), Some("Vilnius"));

        assert!(!selection.toggle("Gedimino pr.", "Vilnius"));
        assert!(selection.is_empty());
        assert!(selection.cities().is_empty());
    }

    #[test]
    fn double_toggle_restores_membership() {
        let mut selection: Selection = [
            ("Gedimino pr.", "Vilnius"),
            ("Laisvės al.", "Kaunas"),
            ("Taikos pr.", "Klaipėda"),
        ]
        .into_iter()
        .collect();
        let before: BTreeSet<String> = selection.names().iter().cloned().collect();
        let cities_before = selection.cities().clone();

        selection.toggle("Laisvės al.", "Kaunas");
        selection.toggle("Laisvės al.", "Kaunas");

        let after: BTreeSet<String> = selection.names().iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(&cities_before, selection.cities());
        assert_eq!(selection.len(), 3);
        // Re-added screen goes to the end
        assert_eq!(selection.names().last().map(String::as_str), Some("Laisvės al."));
    }

    #[test]
    fn toggle_is_per_name() {
        let mut selection = Selection::default();
        selection.toggle("A", "Vilnius");
        selection.toggle("B", "Vilnius");
        selection.toggle("A", "Vilnius");
        assert_eq!(selection.names(), ["B".to_string()]);
    }
}
