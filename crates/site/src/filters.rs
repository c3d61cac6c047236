//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Makes JSON safe to embed in a `<script>` element.
///
/// Only `</` can end the element early, so it becomes `<\/`.
///
/// Usage in templates: `{{ nav_json|script_safe|safe }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn script_safe(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(escape_script(&value.to_string()))
}

pub(crate) fn escape_script(json: &str) -> String {
    json.replace("</", r"<\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_script() {
        assert_eq!(
            escape_script(r#"{"a":"</script><b>"}"#),
            r#"{"a":"<\/script><b>"}"#
        );
        assert_eq!(escape_script("{}"), "{}");
    }
}
