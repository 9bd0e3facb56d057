//! CLI output formatting utilities.
//!
//! JSON is syntax highlighted when stdout is a terminal and printed plain
//! otherwise, so piping into `jq` keeps working.

use std::fmt::Write as _;
use std::io::IsTerminal;

use colored::Colorize;
use serde_json::Value;

use crate::layout::Rect;
use crate::layout::floating::Placement;

/// Prints `value` as pretty JSON, highlighted on a terminal.
pub fn print_json(value: &Value) {
    if std::io::stdout().is_terminal() {
        println!("{}", highlight_json(value));
    } else {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
    }
}

/// Renders `value` as indented JSON with ANSI colors.
///
/// Keys are cyan, strings green, numbers yellow, and literals magenta.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null | Value::Bool(_) => {
            let _ = write!(out, "{}", value.to_string().magenta());
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n.to_string().yellow());
        }
        Value::String(_) => {
            let _ = write!(out, "{}", value.to_string().green());
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                out.push_str(if i == 0 { "\n" } else { ",\n" });
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push(']');
        }
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Object(fields) => {
            out.push('{');
            for (i, (key, item)) in fields.iter().enumerate() {
                out.push_str(if i == 0 { "\n" } else { ",\n" });
                indent(out, depth + 1);
                let _ = write!(out, "{}: ", Value::from(key.as_str()).to_string().cyan());
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn format_rect(rect: &Rect) -> String {
    format!("{} {} {}x{}", rect.x, rect.y, rect.width, rect.height)
}

/// Describes where a clamped rectangle ended up.
#[must_use]
pub fn describe_placement(requested: &Rect, placement: &Placement) -> String {
    let display = format!("display {}", placement.display_id).bold();

    if placement.clamp.is_some() {
        format!(
            "{} {} {} on {display}",
            format_rect(requested).red(),
            "->".dimmed(),
            format_rect(&placement.bounds).green(),
        )
    } else {
        format!("{} fits on {display}", format_rect(&placement.bounds).green())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layout::ClampResult;

    /// Drops ANSI escape sequences so assertions hold with or without color.
    fn plain(text: String) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\u{1b}' {
                chars.by_ref().find(|c| *c == 'm');
            } else {
                out.push(ch);
            }
        }
        out
    }

    #[test]
    fn test_highlight_json_layout() {
        let rendered = plain(highlight_json(
            &json!({ "id": "history", "displayId": 2, "bounds": null, "tags": [] }),
        ));

        assert!(rendered.contains("\"id\": \"history\""));
        assert!(rendered.contains("\"displayId\": 2"));
        assert!(rendered.contains("\"bounds\": null"));
        assert!(rendered.contains("\"tags\": []"));
        assert!(rendered.starts_with("{\n  "));
        assert!(rendered.ends_with("\n}"));
    }

    #[test]
    fn test_highlight_json_matches_pretty_print() {
        let value = json!({
            "layout": { "direction": "row", "first": "a", "second": "b" },
            "list": [1, 2]
        });
        let rendered = plain(highlight_json(&value));
        assert_eq!(rendered, serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_describe_placement() {
        let requested = Rect::new(-100.0, 0.0, 480.0, 360.0);
        let after = Rect::new(0.0, 0.0, 480.0, 360.0);
        let placement = Placement {
            bounds: after,
            display_id: 1,
            clamp: ClampResult::between(requested, after, None, Some(1)),
        };

        let text = plain(describe_placement(&requested, &placement));
        assert_eq!(text, "-100 0 480x360 -> 0 0 480x360 on display 1");

        let fitted = Placement { clamp: None, ..placement };
        assert_eq!(plain(describe_placement(&after, &fitted)), "0 0 480x360 fits on display 1");
    }
}
