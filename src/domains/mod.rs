//! Built-in features, each contributing a feature descriptor to the boot
//! module: resources, roles, commands and providers.

pub mod content;
pub mod library;
pub mod manga;
pub mod novel;
pub mod rbac;
pub mod restful;
pub mod user;

use crate::config::Configure;
use crate::module::{FeatureRegistry, Registration};

/// Registry holding every built-in feature builder.
pub fn registry() -> FeatureRegistry {
    let mut registry = FeatureRegistry::new();
    registry
        .register(rbac::FEATURE, rbac::build)
        .register(restful::FEATURE, restful::build)
        .register(user::FEATURE, user::build)
        .register(content::FEATURE, content::build)
        .register(manga::FEATURE, manga::build)
        .register(novel::FEATURE, novel::build);
    registry
}

/// Features the default binary boots with. `rbac` is always present; the
/// restful surface follows `api.enabled`.
pub fn default_registrations(configure: &Configure) -> Vec<Registration> {
    let mut registrations = vec![Registration::from(rbac::FEATURE)];
    if configure.get("api.enabled", true) {
        registrations.push(Registration::from(restful::FEATURE));
    }
    registrations.extend([
        Registration::from(user::FEATURE),
        Registration::from(content::FEATURE),
        Registration::from(manga::FEATURE),
        Registration::from(novel::FEATURE),
    ]);
    registrations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registrations_follow_api_enabled() {
        let on = Configure::with_overrides([("jwt.secret", "s")]).unwrap();
        let names: Vec<_> = default_registrations(&on)
            .into_iter()
            .map(|r| r.feature.to_string())
            .collect();
        assert_eq!(names, vec!["rbac", "restful", "user", "content", "manga", "novel"]);

        let off = Configure::with_overrides([("jwt.secret", "s"), ("api.enabled", "false")]).unwrap();
        assert!(default_registrations(&off)
            .iter()
            .all(|r| r.feature.as_str() != restful::FEATURE));
    }

    #[test]
    fn test_registry_knows_every_default_feature() {
        let configure = Configure::with_overrides([("jwt.secret", "s")]).unwrap();
        let registry = registry();
        for registration in default_registrations(&configure) {
            assert!(registry.contains(&registration.feature));
        }
    }
}
