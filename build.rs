use std::fs;

/// Built-in themes embedded with `include_str!`.
const THEMES: [&str; 1] = ["themes/clean.toml"];

fn main() {
    for theme_path in THEMES {
        println!("cargo:rerun-if-changed={}", theme_path);

        let content = fs::read_to_string(theme_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", theme_path, e));

        let table = match content.parse::<toml::Table>() {
            Ok(table) => table,
            Err(e) => panic!("Invalid {}: {}", theme_path, e),
        };

        // Config::preset falls back to defaults on a bad colour, so reject it here
        if let Some(colors) = table.get("colors").and_then(toml::Value::as_table) {
            for (name, value) in colors {
                let hex = value.as_str().and_then(|v| v.strip_prefix('#')).unwrap_or("");
                if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    panic!("Invalid colour `{}` in {}: expected #RRGGBB", name, theme_path);
                }
            }
        }
    }
}
