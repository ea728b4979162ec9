//! Markup fragment rendering.
//!
//! Pure string builders: schema plus current values in, fragment out. The
//! host owns layout and styling; validation metadata rides along as data
//! attributes so the host's inline feedback elements can surface
//! [`FieldCheck`](super::validator::FieldCheck) messages.

use std::collections::BTreeMap;

use super::schema::{BusinessTypeId, FieldSet};

/// Escapes a value for interpolation into an attribute or text node.
pub fn html_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders a field set as floating-label input groups.
pub fn render_field_set(fields: &FieldSet, values: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for field in &fields.fields {
        let value = values.get(field.key).map(String::as_str).unwrap_or("");
        let value_attr = if value.is_empty() {
            String::new()
        } else {
            format!(" value=\"{}\"", html_escape(value))
        };
        let pattern_attr = field
            .pattern
            .map(|p| format!(" pattern=\"{}\"", html_escape(p)))
            .unwrap_or_default();
        let required_attr = if field.required { " required" } else { "" };
        let placeholder = field.placeholder.unwrap_or(" ");
        let validation_msg = field.validation_msg.unwrap_or("");

        out.push_str(&format!(
            concat!(
                "<div class=\"form-floating mb-3\">",
                "<input type=\"{kind}\" class=\"form-control\" id=\"{key}\" name=\"{key}\"",
                "{value} placeholder=\"{placeholder}\"{pattern}{required} ",
                "data-validation-msg=\"{msg}\">",
                "<label for=\"{key}\" class=\"form-label\">{label}</label>",
                "<div class=\"invalid-feedback d-none\"><span class=\"error-text\"></span></div>",
                "</div>"
            ),
            kind = field.kind.as_attr(),
            key = field.key,
            value = value_attr,
            placeholder = html_escape(placeholder),
            pattern = pattern_attr,
            required = required_attr,
            msg = html_escape(validation_msg),
            label = html_escape(field.label),
        ));
    }
    out
}

/// Renders the business-type radio group with the active selection marked.
pub fn render_type_selector(selected: Option<BusinessTypeId>) -> String {
    let mut out = String::new();
    for id in BusinessTypeId::ALL {
        let is_selected = selected == Some(id);
        out.push_str(&format!(
            concat!(
                "<label class=\"business-type-option{sel_class}\">",
                "<input type=\"radio\" name=\"businessType\" value=\"{value}\"{checked} required>",
                "<div>{name}</div>",
                "</label>"
            ),
            sel_class = if is_selected { " selected" } else { "" },
            value = id.as_str(),
            checked = if is_selected { " checked" } else { "" },
            name = id.display_name(),
        ));
    }
    out
}
