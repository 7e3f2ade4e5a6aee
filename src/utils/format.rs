use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Deserialize `null` as the type's default (the store sends `null` for empty arrays)
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize empty string as None
pub fn deserialize_option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

pub fn format_tags_comma(tags: &[String]) -> String {
    tags.join(", ")
}

pub fn format_tags_hash(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
        )
    }
}

/// Truncate to `max_len` characters, appending "..." when cut
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let single_line = s.replace('\n', " ");
    if single_line.chars().count() <= max_len {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Parse `#rrggbb` into an rgb triple
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    Some(((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}
