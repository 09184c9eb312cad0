//! Rule kinds over text: presence, length, digit counts, passwords, email.

use crate::core::rule::{RuleSpec, ValuePredicate};
use crate::core::types::{DataKind, Value};
use crate::rules::registry::{Registry, RuleFactory, RuleKindDescriptor};
use std::sync::Arc;

/// Register text rule kinds.
pub fn register(registry: &mut Registry) {
    registry.register_rule_kind(not_empty());
    registry.register_rule_kind(length());
    registry.register_rule_kind(digits());
    registry.register_rule_kind(password());
    registry.register_rule_kind(email());
}

fn text_predicate<F>(check: F) -> ValuePredicate
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value: &Value| value.as_string().map_or(false, |text| check(text)))
}

/// Text must be present.
pub fn not_empty() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "not_empty",
        DataKind::String,
        "This field is required",
        RuleFactory::plain(|spec: &RuleSpec| {
            let trim = spec.get_bool("trim")?.unwrap_or(false);
            let empty_text = spec.get_string("empty_text")?.map(str::to_string);

            Ok(text_predicate(move |text| {
                let text = if trim { text.trim() } else { text };
                !text.is_empty() && empty_text.as_deref() != Some(text)
            }))
        }),
    )
    .with_description("Text is non-empty and differs from an optional placeholder")
}

/// Text length within bounds, counted in characters.
pub fn length() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "length",
        DataKind::String,
        "Invalid length",
        RuleFactory::plain(|spec: &RuleSpec| {
            let min = spec.get_integer("min")?.unwrap_or(i64::MIN);
            let max = spec.get_integer("max")?.unwrap_or(i64::MAX);
            let trim = spec.get_bool("trim")?.unwrap_or(false);
            if min > max {
                return Err(format!("min ({}) is greater than max ({})", min, max));
            }

            Ok(text_predicate(move |text| {
                let text = if trim { text.trim() } else { text };
                let len = text.chars().count() as i64;
                len >= min && len <= max
            }))
        }),
    )
    .with_description("Character count between 'min' and 'max'")
}

/// Decimal number with bounded integer and fraction digit counts.
pub fn digits() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "digits",
        DataKind::String,
        "Too many digits",
        RuleFactory::plain(|spec: &RuleSpec| {
            let integer = spec.require_integer("integer")?;
            let fraction = spec.get_integer("fraction")?.unwrap_or(0);
            if integer < 0 || fraction < 0 {
                return Err("digit counts must not be negative".to_string());
            }
            let (integer, fraction) = (integer as usize, fraction as usize);

            Ok(text_predicate(move |text| {
                digit_counts(text).map_or(false, |(i, f)| i <= integer && f <= fraction)
            }))
        }),
    )
    .with_description("At most 'integer' integer digits and 'fraction' fraction digits")
}

/// Count significant integer and fraction digits of a decimal literal.
fn digit_counts(text: &str) -> Option<(usize, usize)> {
    let text = text.trim();
    let unsigned = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };

    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let integer = int_part.trim_start_matches('0').len();
    let fraction = frac_part.trim_end_matches('0').len();
    Some((integer, fraction))
}

/// Password with a minimum length.
pub fn password() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "password",
        DataKind::String,
        "Invalid password",
        RuleFactory::plain(|spec: &RuleSpec| {
            let min = spec.get_integer("min")?.unwrap_or(6);
            Ok(text_predicate(move |text| text.chars().count() as i64 >= min))
        }),
    )
    .with_description("At least 'min' characters (default 6); source of confirm_password")
}

/// Marks an email field.
///
/// Format checking is out of scope; this only checks for an `@`.
pub fn email() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "email",
        DataKind::String,
        "Invalid email",
        RuleFactory::plain(|_: &RuleSpec| {
            Ok(text_predicate(|text| {
                let text = text.trim();
                !text.is_empty() && text.contains('@')
            }))
        }),
    )
    .with_description("Contains '@'; source of confirm_email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::RuleCheck;

    fn predicate(descriptor: RuleKindDescriptor, spec: RuleSpec) -> ValuePredicate {
        match descriptor.build_check(&spec).unwrap() {
            RuleCheck::Value(predicate) => predicate,
            other => panic!("unexpected check {:?}", other),
        }
    }

    #[test]
    fn test_not_empty() {
        let check = predicate(not_empty(), RuleSpec::new("not_empty"));
        assert!(check(&Value::from("a")));
        assert!(check(&Value::from(" ")));
        assert!(!check(&Value::from("")));

        let check = predicate(
            not_empty(),
            RuleSpec::new("not_empty")
                .with_param("trim", true)
                .with_param("empty_text", "Choose one"),
        );
        assert!(!check(&Value::from("  ")));
        assert!(!check(&Value::from(" Choose one ")));
        assert!(check(&Value::from("Rust")));
    }

    #[test]
    fn test_length() {
        let check = predicate(
            length(),
            RuleSpec::new("length").with_param("min", 2i64).with_param("max", 4i64),
        );
        assert!(!check(&Value::from("a")));
        assert!(check(&Value::from("ab")));
        assert!(check(&Value::from("ünï")));
        assert!(!check(&Value::from("abcde")));
    }

    #[test]
    fn test_length_min_above_max_is_malformed() {
        let spec = RuleSpec::new("length").with_param("min", 5i64).with_param("max", 1i64);
        assert!(length().build_check(&spec).is_err());
    }

    #[test]
    fn test_digits() {
        let check = predicate(
            digits(),
            RuleSpec::new("digits").with_param("integer", 3i64).with_param("fraction", 2i64),
        );
        assert!(check(&Value::from("123.45")));
        assert!(check(&Value::from("-0012.50")));
        assert!(!check(&Value::from("1234")));
        assert!(!check(&Value::from("1.234")));
        assert!(!check(&Value::from("1e3")));
        assert!(!check(&Value::from("")));

        assert!(digits().build_check(&RuleSpec::new("digits")).is_err());
    }

    #[test]
    fn test_password_and_email() {
        let check = predicate(password(), RuleSpec::new("password"));
        assert!(!check(&Value::from("12345")));
        assert!(check(&Value::from("123456")));

        let check = predicate(email(), RuleSpec::new("email"));
        assert!(check(&Value::from("ada@example.com")));
        assert!(!check(&Value::from("ada")));
    }

    #[test]
    fn test_wrong_param_type() {
        let spec = RuleSpec::new("length").with_param("min", "two");
        assert!(length().build_check(&spec).is_err());
    }
}
