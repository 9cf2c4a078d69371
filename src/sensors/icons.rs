//! Icons for category sensors, picked from keywords in the category name

/// Icon when no keyword matches
pub const DEFAULT_CATEGORY_ICON: &str = "mdi:currency-usd";

const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("grocer", "mdi:cart"),
    ("rent", "mdi:home"),
    ("mortgage", "mdi:home"),
    ("electric", "mdi:flash"),
    ("water", "mdi:water"),
    ("internet", "mdi:wifi"),
    ("phone", "mdi:cellphone"),
    ("insurance", "mdi:shield-check"),
    ("fuel", "mdi:gas-station"),
    ("gas", "mdi:gas-station"),
    ("car", "mdi:car"),
    ("transport", "mdi:bus"),
    ("medical", "mdi:medical-bag"),
    ("health", "mdi:heart-pulse"),
    ("dining", "mdi:silverware-fork-knife"),
    ("restaurant", "mdi:silverware-fork-knife"),
    ("entertainment", "mdi:movie-open"),
    ("subscription", "mdi:repeat"),
    ("gift", "mdi:gift"),
    ("vacation", "mdi:airplane"),
    ("travel", "mdi:airplane"),
    ("emergency", "mdi:lifebuoy"),
    ("saving", "mdi:piggy-bank"),
    ("pet", "mdi:paw"),
    ("child", "mdi:baby-face-outline"),
    ("clothing", "mdi:tshirt-crew"),
    ("education", "mdi:school"),
];

/// Icon for a category: the first keyword that starts a word of its name
pub fn category_icon(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    CATEGORY_ICONS
        .iter()
        .find(|(keyword, _)| words.iter().any(|w| w.starts_with(*keyword)))
        .map_or(DEFAULT_CATEGORY_ICON, |(_, icon)| *icon)
}
