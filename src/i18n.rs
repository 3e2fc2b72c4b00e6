// i18n.rs
//
// Runtime message catalogs:
// - Built-in catalogs are embedded from assets/i18n/<lang>.json.
// - A file at <exe_dir>/assets/i18n/<lang>.json or ./assets/i18n/<lang>.json
//   overrides individual keys without rebuilding.
// - Lookup: selected lang -> "en" -> the key itself.
// - tr_with("key", &[("name", ..)]) substitutes {name} placeholders.

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

/// Languages with a built-in catalog, as (code, native name).
pub const LANGUAGES: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];

fn embedded(lang: &str) -> Option<&'static str> {
    match lang {
        "en" => Some(include_str!("../assets/i18n/en.json")),
        "zh-Hans" => Some(include_str!("../assets/i18n/zh-Hans.json")),
        _ => None,
    }
}

fn parse_map(text: &str) -> Option<HashMap<String, String>> {
    serde_json::from_str(text).ok()
}

fn find_override_file(lang: &str) -> Option<PathBuf> {
    let file = format!("{}.json", lang);

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::new()))
        .map(|dir| dir.join("assets").join("i18n").join(&file))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let mut map = embedded(lang).and_then(parse_map).unwrap_or_default();

    if let Some(path) = find_override_file(lang) {
        match std::fs::read_to_string(&path).ok().as_deref().and_then(parse_map) {
            Some(extra) => map.extend(extra),
            None => log::warn!("ignoring unreadable catalog {}", path.display()),
        }
    }
    map
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lang: String,
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

impl Catalog {
    pub fn load(lang: impl Into<String>) -> Self {
        let lang = lang.into();
        let map = load_lang(&lang);
        let fallback_map = if lang == FALLBACK_LANG {
            map.clone()
        } else {
            load_lang(FALLBACK_LANG)
        };
        if map.is_empty() {
            log::warn!("no catalog for language {:?}, using {}", lang, FALLBACK_LANG);
        }
        Self {
            lang,
            map,
            fallback_map,
        }
    }

    pub fn from_maps(
        lang: impl Into<String>,
        map: HashMap<String, String>,
        fallback_map: HashMap<String, String>,
    ) -> Self {
        Self {
            lang: lang.into(),
            map,
            fallback_map,
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Localized text for `key`, or the key itself when missing everywhere.
    pub fn tr(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.fallback_map.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Like `tr`, then replaces `{name}` placeholders. Unknown ones stay.
    pub fn tr_with(&self, key: &str, args: &[(&str, String)]) -> String {
        let mut s = self.tr(key);
        for (k, v) in args {
            s = s.replace(&format!("{{{}}}", k), v);
        }
        s
    }
}

static I18N: OnceCell<RwLock<Catalog>> = OnceCell::new();

/// Installs the global catalog. Later calls replace it.
pub fn init(lang: impl Into<String>) {
    let catalog = Catalog::load(lang);

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = catalog;
        }
    } else {
        let _ = I18N.set(RwLock::new(catalog));
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok())
        .map(|c| c.lang().to_string())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(c) => c.tr(key),
        None => key.to_string(),
    }
}

pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(c) => c.tr_with(key, args),
        None => key.to_string(),
    }
}
