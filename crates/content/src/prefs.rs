//! Preference cookie that asks the host not to auto-translate.

use crate::HostPage;

pub const PREF_COOKIE: &str = "PREF";
pub const COOKIE_DOMAIN: &str = ".youtube.com";
pub const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

const NO_TRANSLATE_KEY: &str = "f6";
const NO_TRANSLATE_VALUE: &str = "400";

/// Language and region overrides are dropped: they are what makes the host
/// localize in the first place.
const DROPPED_KEYS: [&str; 2] = ["hl", "gl"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefOutcome {
    AlreadySet,
    Written,
    Failed,
}

/// Merge the no-translate sub-field into an existing `&`-joined
/// `key=value` cookie value, keeping every unrelated sub-field in order.
pub fn merge_pref_value(existing: Option<&str>) -> String {
    let mut fields: Vec<&str> = existing
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            key != NO_TRANSLATE_KEY && !DROPPED_KEYS.contains(&key)
        })
        .collect();
    let no_translate = format!("{NO_TRANSLATE_KEY}={NO_TRANSLATE_VALUE}");
    fields.push(&no_translate);
    fields.join("&")
}

pub fn pref_cookie_string(value: &str) -> String {
    format!("{PREF_COOKIE}={value}; domain={COOKIE_DOMAIN}; path=/; max-age={COOKIE_MAX_AGE_SECS}")
}

/// Advisory only: a rejected write is logged and otherwise ignored.
pub fn ensure_preference<H: HostPage>(host: &mut H) -> PrefOutcome {
    let existing = host.cookie(PREF_COOKIE);
    let merged = merge_pref_value(existing.as_deref());
    if existing.as_deref() == Some(merged.as_str()) {
        return PrefOutcome::AlreadySet;
    }
    match host.set_cookie(&pref_cookie_string(&merged)) {
        Ok(()) => {
            log::info!(target: "undub::prefs", "preference cookie set to {merged}");
            PrefOutcome::Written
        }
        Err(err) => {
            log::warn!(target: "undub::prefs", "could not write preference cookie: {err}");
            PrefOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::FakeHost;

    #[test]
    fn merge_keeps_unrelated_fields_and_drops_locale() {
        let merged = merge_pref_value(Some("hl=fr&gl=FR&vm=p"));
        assert!(merged.contains("f6=400"));
        assert!(merged.contains("vm=p"));
        assert!(!merged.contains("hl=fr"));
        assert!(!merged.contains("gl=FR"));
        assert_eq!(merged, "vm=p&f6=400");
    }

    #[test]
    fn merge_overrides_existing_flag_and_handles_absent_cookie() {
        assert_eq!(merge_pref_value(None), "f6=400");
        assert_eq!(merge_pref_value(Some("")), "f6=400");
        assert_eq!(merge_pref_value(Some("f6=8&tz=UTC")), "tz=UTC&f6=400");
    }

    #[test]
    fn merge_is_a_fixed_point() {
        let once = merge_pref_value(Some("al=de&hl=de&f5=30000"));
        assert_eq!(merge_pref_value(Some(&once)), once);
    }

    #[test]
    fn ensure_writes_once_with_domain_path_and_max_age() {
        let mut host = FakeHost::new();
        host.cookies.push(("PREF".into(), "hl=fr&gl=FR&vm=p".into()));

        assert_eq!(ensure_preference(&mut host), PrefOutcome::Written);
        assert_eq!(
            host.cookie_writes,
            vec!["PREF=vm=p&f6=400; domain=.youtube.com; path=/; max-age=31536000".to_string()]
        );
        assert_eq!(ensure_preference(&mut host), PrefOutcome::AlreadySet);
        assert_eq!(host.cookie_writes.len(), 1);
    }

    #[test]
    fn rejected_write_is_reported_not_raised() {
        let mut host = FakeHost::new();
        host.reject_cookies = true;
        assert_eq!(ensure_preference(&mut host), PrefOutcome::Failed);
        assert_eq!(host.cookie("PREF"), None);
    }
}
