use bevy::prelude::*;
use std::collections::HashMap;

const EN_US: &str = include_str!("../assets/lang/en_us.json");

/// Translation table for player-facing text. Values use `%s` placeholders that
/// are filled in order.
#[derive(Resource, Debug, Clone)]
pub struct Lang {
    entries: HashMap<String, String>,
}

impl Default for Lang {
    fn default() -> Self {
        Self::from_json(EN_US).unwrap_or_else(|e| {
            warn!("[SEASONS] Bundled translations are malformed: {}", e);
            Self {
                entries: HashMap::new(),
            }
        })
    }
}

impl Lang {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    /// Falls back to the key itself so missing entries stay visible.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn translate(&self, key: &str, args: &[String]) -> String {
        let template = self.get(key);
        let mut out = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut rest = template;
        while let Some(at) = rest.find("%s") {
            out.push_str(&rest[..at]);
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
            rest = &rest[at + 2..];
        }
        out.push_str(rest);
        out
    }
}
