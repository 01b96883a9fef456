use portfix_types::plan::MigrationPlan;

/// Render `application.properties`, one `key=value` line per entry in key order.
///
/// Keys and values are escaped so that `java.util.Properties` reads back the
/// same strings.
pub fn render_application_properties(plan: &MigrationPlan) -> String {
    let mut out = String::new();
    for (key, value) in &plan.application_properties {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
