//! Theme stylesheets and active-theme fan-out.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;

use crate::component::ThemeContent;

/// Serialize theme variables into a `:root` stylesheet.
///
/// Keys without a leading `--` get one, so `background-color` and
/// `--background-color` produce the same declaration.
pub fn theme_stylesheet(variables: &IndexMap<String, String>) -> String {
    let mut css = String::from(":root {\n");
    for (name, value) in variables {
        let name = name.trim();
        if name.starts_with("--") {
            css.push_str(&format!("  {name}: {value};\n"));
        } else {
            css.push_str(&format!("  --{name}: {value};\n"));
        }
    }
    css.push_str("}\n");
    css
}

/// Inline `data:` URL for a built-in theme.
pub fn theme_data_url(theme: &ThemeContent) -> String {
    let css = theme_stylesheet(&theme.variables);
    format!("data:text/css;base64,{}", STANDARD.encode(css))
}

/// Something rendering a component that needs to know the active theme,
/// typically a web view bridge.
pub trait ThemeObserver: Send + Sync {
    /// Identifier of the component this observer renders.
    fn component_id(&self) -> &str;

    /// Replace the stylesheets applied to the component.
    fn post_active_themes(&self, urls: &[String]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables() -> IndexMap<String, String> {
        let mut variables = IndexMap::new();
        variables.insert("--background-color".to_string(), "#0f0f0f".to_string());
        variables.insert("foreground-color".to_string(), "#fafafa".to_string());
        variables
    }

    #[test]
    fn test_stylesheet_keeps_order_and_prefixes() {
        assert_eq!(
            theme_stylesheet(&variables()),
            ":root {\n  --background-color: #0f0f0f;\n  --foreground-color: #fafafa;\n}\n"
        );
    }

    #[test]
    fn test_data_url_decodes_to_stylesheet() {
        let theme = ThemeContent {
            is_system_theme: true,
            variables: variables(),
        };
        let url = theme_data_url(&theme);
        let encoded = url
            .strip_prefix("data:text/css;base64,")
            .expect("data URL prefix");
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, theme_stylesheet(&theme.variables));
    }

    #[test]
    fn test_empty_theme_is_still_valid_css() {
        assert_eq!(theme_stylesheet(&IndexMap::new()), ":root {\n}\n");
    }
}
