//! `{name}` placeholder substitution for requirement error templates.
//!
//! A violated requirement's template names its witness variables in
//! braces (`"{vm} has no network interface"`); the driver resolves each
//! witness's model value down to a human-readable element id and
//! substitutes it in. A witness the model left unevaluated (can happen
//! under `Unknown`, or if the solver's model simply omits a constant it
//! never needed to assign) keeps its placeholder literal and appends a
//! note, rather than failing the whole diagnostic.

/// Substitute every `{name}` found in `bindings` into `template`. Returns
/// the rendered text, plus `true` if every placeholder in the template
/// was actually bound (false triggers the "incomplete model" footnote).
pub fn render_template(template: &str, bindings: &[(String, String)]) -> (String, bool) {
    let mut rendered = template.to_string();
    let mut all_bound = true;
    for (name, value) in bindings {
        let placeholder = format!("{{{name}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }
    if rendered.contains('{') && rendered.contains('}') {
        all_bound = false;
    }
    (rendered, all_bound)
}

/// Append the standard note for a diagnostic whose model left some
/// placeholder unresolved.
pub fn with_incomplete_model_note(rendered: String) -> String {
    format!("{rendered} (note: the solver's model did not assign every witness; some placeholders are unresolved)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_bound_placeholder() {
        let (rendered, complete) =
            render_template("{vm} has no network interface", &[("vm".to_string(), "vm-7".to_string())]);
        assert_eq!(rendered, "vm-7 has no network interface");
        assert!(complete);
    }

    #[test]
    fn leaves_unbound_placeholder_literal_and_flags_incomplete() {
        let (rendered, complete) = render_template("{vm} and {other}", &[("vm".to_string(), "vm-7".to_string())]);
        assert_eq!(rendered, "vm-7 and {other}");
        assert!(!complete);
    }

    #[test]
    fn note_is_appended_to_rendered_text() {
        let noted = with_incomplete_model_note("vm-7 and {other}".to_string());
        assert!(noted.starts_with("vm-7 and {other}"));
        assert!(noted.contains("note:"));
    }
}
