//! Internal hero id → display name table.

use std::collections::HashMap;

/// Built-in aliases. Several internal ids map to the same hero.
const BUILTIN_HEROES: &[(&str, &str)] = &[
    ("hero_abrams", "Abrams"),
    ("hero_bebop", "Bebop"),
    ("hero_dynamo", "Dynamo"),
    ("hero_grey_talon", "Grey Talon"),
    ("hero_haze", "Haze"),
    ("hero_infernus", "Infernus"),
    ("hero_ivy", "Ivy"),
    ("hero_kelvin", "Kelvin"),
    ("hero_lady_geist", "Lady Geist"),
    ("hero_lash", "Lash"),
    ("hero_mcginnis", "McGinnis"),
    ("hero_mirage", "Mirage"),
    ("hero_mo_krill", "Mo & Krill"),
    ("hero_paradox", "Paradox"),
    ("hero_pocket", "Pocket"),
    ("hero_seven", "Seven"),
    ("hero_shiv", "Shiv"),
    ("hero_synth", "Vindicta"),
    ("hero_viscous", "Viscous"),
    ("hero_warden", "Warden"),
    ("hero_wraith", "Wraith"),
    ("hero_yamato", "Yamato"),
    ("hero_gigawatt", "Seven"),
    ("hero_tengu", "Ivy"),
];

/// Immutable mapping from lowercase internal hero id to display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroTable {
    names: HashMap<String, String>,
}

impl Default for HeroTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HeroTable {
    /// Returns the table of heroes known at build time.
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_HEROES
                .iter()
                .map(|(id, name)| ((*id).to_string(), (*name).to_string()))
                .collect(),
        }
    }

    /// Returns the built-in table with `extra` entries added on top.
    ///
    /// Extra ids are lowercased; an extra entry replaces a built-in one.
    pub fn with_overrides<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::builtin();
        for (id, name) in extra {
            table.names.insert(id.as_ref().to_lowercase(), name.into());
        }
        table
    }

    /// Looks up the display name for a lowercase hero id.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Iterates over `(id, display name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
