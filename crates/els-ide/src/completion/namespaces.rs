use els_core::{path_starts_with_root, EntityKind};
use els_layout::{normalize_to_angle_bracket, AddonMeta};
use els_registry::RegistryStore;
use indexmap::IndexMap;

/// Map each addon component's completion label to its `addon$component` spellings.
///
/// Scoped addon names keep only their last segment (`@scope/ui-kit` → `ui-kit`).
/// With `angle_bracket` both halves use the `UiKit$Button` spelling.
pub fn generate_namespaced_components_map(
    addons: &[AddonMeta],
    store: &RegistryStore,
    angle_bracket: bool,
) -> IndexMap<String, Vec<String>> {
    let mut result: IndexMap<String, Vec<String>> = IndexMap::new();

    for addon in addons {
        let addon_name = addon.name.rsplit('/').next().unwrap_or_default();
        let registry = store.registry_for_root(&addon.root);

        for (component, paths) in registry.kind(EntityKind::Component) {
            let item_label = if angle_bracket {
                normalize_to_angle_bracket(component)
            } else {
                component.clone()
            };
            let labels = result.entry(item_label).or_default();

            if !paths
                .iter()
                .any(|path| path_starts_with_root(&addon.root, path))
            {
                continue;
            }
            let label = if angle_bracket {
                format!(
                    "{}${}",
                    normalize_to_angle_bracket(addon_name),
                    normalize_to_angle_bracket(component)
                )
            } else {
                format!("{addon_name}${component}")
            };
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn store_with_addon_component() -> (RegistryStore, Vec<AddonMeta>) {
        let mut store = RegistryStore::new();
        store.add_to_registry(
            "date-picker",
            EntityKind::Component,
            ["/ws/node_modules/@acme/ui-kit/addon/components/date-picker.js"],
        );
        store.add_to_registry(
            "date-picker",
            EntityKind::Component,
            ["/ws/app/components/date-picker.js"],
        );
        let addons = vec![AddonMeta {
            name: "@acme/ui-kit".into(),
            root: PathBuf::from("/ws/node_modules/@acme/ui-kit"),
        }];
        (store, addons)
    }

    #[test]
    fn classic_labels_use_addon_dollar_component() {
        let (store, addons) = store_with_addon_component();
        let map = generate_namespaced_components_map(&addons, &store, false);
        assert_eq!(map["date-picker"], vec!["ui-kit$date-picker".to_owned()]);
    }

    #[test]
    fn angle_bracket_labels_are_classified() {
        let (store, addons) = store_with_addon_component();
        let map = generate_namespaced_components_map(&addons, &store, true);
        assert_eq!(map["DatePicker"], vec!["UiKit$DatePicker".to_owned()]);
        assert!(!map.contains_key("date-picker"));
    }
}
