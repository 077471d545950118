//! The sticker palette: named, predefined sticker sources.
//!
//! Three small images ship inline so the palette works offline. Extra
//! entries can be registered at startup; a later entry with the same name
//! replaces the earlier one.

use crate::loader::ImageSource;

const SUN_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAEAAAABACAYAAACqaXHeAAABfUlEQVR42u2bu5GDMBCGyajgAlJqIKUPFUIN1EBKSiGKrgpSUkWe0XAbrGduPDZeHhJo+YMv8WBgP/TWKnv8/mR3JoMACICAGNREQ/SEJUbCEZ5x/Jvlaxr+T9ICDDFwcPNGHN/DpCKgIFpi2hH0Jya+d3FFATm/nA8Q+Cuen5VfRYDh+jtHZjyiauwNvjsh8Fe6MwSU3GLPF8HyO0URUJ1U5CVVogotoArUwh/ZU1ShBJQX/fLvSkIZQoBNIPj/bcKhArqEgl/VO0j7+TlRzF4BeSL1fqk9yPcIaBMO/km7VUARaWwfY+5QbBGg4et/LQVLAiZFAqa1Aoyi4Bd7hE8CBoUChjUCnEIBTiqgVhj8k1oioFEsoJEI6BUL6CUCrGIBViJgVCxglAhwigU4iQCvWICHAFQBNILoBjEQwlAYkyFMh7EggiUxLIpiWRwbI9gaw+YotseRIIEUGSRJIU0OiZJIlUWyNNLlcWACR2ZwaArH5nBwEgIg4H78AY3ORvIxcjyIAAAAAElFTkSuQmCC";

const LEAF_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAEAAAABACAYAAACqaXHeAAAA+ElEQVR42u2byQ2AMAwEUwuF0QrVURcIiQcSN+Sw1/PwnxkJSOx16sY+Ra6EgLYPMKwVUsACPq01RBOwhW8qwQp8MwmW4JtIsAZfXYJF+KoSrMJXk2AZvooE6/DFJXiALyrBC3wxCZ7gi0jwBp9dgkf4rBK8wmeT4Bk+iwTv8L8lKMD/kqAC/1mCEvwnCWrwryUowr+SoAr/WIIy/CMJ6vC3EiLAX0qIAn8qIRL8oYRo8DsJCOAV4CPIb5CDEEdhLkNch2mI0BKjKUpbnMEIozGGo4zHCUgQkSEkRUyOoCRRWcLSxOVZmGBlhqUp1uZYnGR1luVp/ZoBLAVSUuDPrZAAAAAASUVORK5CYII=";

const HEART_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAEAAAABACAYAAACqaXHeAAAA4ElEQVR42u3bwQ2EMBBD0RRH/61QwmwLK+KJPfAPvkbyOyHirPu61pezAAAAAAAAAGAr9UcSz94GqIdxnSsDKFFOnSsFKHG6z5UC1LAAoASooQFAAVDDA8AOQL0kAAAAAAAAAAAAAADwKQwAAPwPAAAAfooCkHIxYi0PgPlu0F5+53b4FeUBMO0DYsorFiKjy5+cyESWV46kRpZXr8TGle+YyY0q37UTHFO+cyg5onz3UjS+/KmpbGTx01vhyPKOsXRMcedaPKa8ey5vLZ7yXsBangcTAAAAAAAAAADAp/MDRBtY1ZKXJ6QAAAAASUVORK5CYII=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: String,
    pub source: String,
}

impl PaletteEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: source.into() }
    }

    /// Parse a `name=source` pair as given on the command line.
    ///
    /// # Errors
    ///
    /// Returns a message when the `=` is missing or either side is empty.
    pub fn parse_pair(raw: &str) -> Result<Self, String> {
        match raw.split_once('=') {
            Some((name, source)) if !name.trim().is_empty() && !source.trim().is_empty() => {
                Ok(Self::new(name.trim(), source.trim()))
            }
            _ => Err(format!("expected NAME=SOURCE, got {raw:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Palette {
    /// The built-in sun, leaf, and heart stickers.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                PaletteEntry::new("sun", SUN_PNG),
                PaletteEntry::new("leaf", LEAF_PNG),
                PaletteEntry::new("heart", HEART_PNG),
            ],
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: PaletteEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => existing.source = entry.source,
            None => self.entries.push(entry),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// Resolve a palette name to its source; anything else is parsed as a raw source.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> ImageSource {
        match self.get(raw.trim()) {
            Some(entry) => ImageSource::parse(&entry.source),
            None => ImageSource::parse(raw),
        }
    }
}

#[cfg(test)]
#[path = "palette_test.rs"]
mod tests;
