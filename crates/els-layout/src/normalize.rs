//! Conversions between the spellings a name can take in templates and scripts.

/// `fooBar` → `foo-bar`, `FooBar` → `foo-bar`, `foo_bar` → `foo-bar`.
pub fn dasherize(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for ch in input.chars() {
        if ch == '_' || ch == ' ' {
            out.push('-');
        } else if ch.is_ascii_uppercase() {
            if prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

/// `foo-bar` → `FooBar`.
fn classify(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `foo-bar/baz-qux` → `FooBar::BazQux`.
pub fn normalize_to_angle_bracket(name: &str) -> String {
    name.split('/')
        .map(classify)
        .collect::<Vec<_>>()
        .join("::")
}

/// `FooBar::BazQux` → `foo-bar/baz-qux`.
pub fn normalize_to_classic_component(name: &str) -> String {
    name.split("::")
        .map(dasherize)
        .collect::<Vec<_>>()
        .join("/")
}

/// Service injection names (`currentUser`, `auth.session`) → registry names
/// (`current-user`, `auth/session`).
pub fn normalize_service_name(name: &str) -> String {
    name.split('.').map(dasherize).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_bracket_round_trip() {
        assert_eq!(normalize_to_angle_bracket("foo-bar/baz-qux"), "FooBar::BazQux");
        assert_eq!(normalize_to_classic_component("FooBar::BazQux"), "foo-bar/baz-qux");
        assert_eq!(normalize_to_classic_component("Input"), "input");
        assert_eq!(normalize_to_angle_bracket("x-1"), "X1");
    }

    #[test]
    fn service_names() {
        assert_eq!(normalize_service_name("currentUser"), "current-user");
        assert_eq!(normalize_service_name("auth.sessionStore"), "auth/session-store");
        assert_eq!(normalize_service_name("store"), "store");
    }
}
