mod admin;
mod auth;
mod dashboard;
mod meals;
mod reports;

pub use admin::{admin_dashboard, admin_user_detail, admin_user_export};
pub use auth::{handle_login, handle_logout, handle_register, home, serve_login_page, serve_register_page};
pub use dashboard::serve_dashboard;
pub use meals::{handle_add_meal, handle_delete_meal, handle_edit_meal, serve_add_meal, serve_edit_meal};
pub use reports::{export_csv, serve_reports};

/// Escapes user-controlled text before it is substituted into a template.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the flash banner carried in redirect query parameters, or an
/// empty string when the request carried none. The level must be one of
/// the four known alert categories; anything else falls back to the
/// default for the parameter kind.
pub(crate) fn flash_html(
    error: Option<&str>,
    msg: Option<&str>,
    level: Option<&str>,
) -> String {
    let (text, default_level) = match (error, msg) {
        (Some(text), _) => (text, "danger"),
        (None, Some(text)) => (text, "success"),
        (None, None) => return String::new(),
    };
    let level = match level {
        Some(level @ ("success" | "info" | "warning" | "danger")) => level,
        _ => default_level,
    };
    format!(
        r#"<div class="alert alert-{}">{}</div>"#,
        level,
        escape_html(text)
    )
}
