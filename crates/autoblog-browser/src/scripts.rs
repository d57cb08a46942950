//! Page scripts evaluated by [`ChromePage`]
//!
//! Selectors, labels and colours are embedded as JSON literals so quoting in
//! user-controlled strings cannot break out of the script.
//!
//! [`ChromePage`]: crate::browser::ChromePage

use serde_json::json;

const ENABLED_FN: &str = r#"function __enabled(el, colours) {
  if (el.disabled || el.getAttribute('aria-disabled') === 'true') return false;
  if (!colours || colours.length === 0) return true;
  const bg = getComputedStyle(el).backgroundColor || '';
  return colours.some(c => bg.includes(c));
}"#;

fn lit<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

pub fn exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", lit(selector))
}

/// Label scan over `scope`; clicks the first match when `click` is set
pub fn label_scan(scope: &str, labels: &[String], enabled_colours: Option<&[String]>, click: bool) -> String {
    let labels: Vec<String> = labels.iter().map(|l| l.trim().to_lowercase()).collect();
    let colours = match enabled_colours {
        Some(c) => json!(c),
        None => serde_json::Value::Null,
    };
    format!(
        r#"(() => {{
  {enabled_fn}
  const labels = {labels};
  const colours = {colours};
  const nodes = Array.from(document.querySelectorAll({scope}));
  const hit = nodes.find(el => {{
    const text = (el.innerText || el.textContent || '').trim().toLowerCase();
    if (!labels.includes(text)) return false;
    return colours === null || __enabled(el, colours);
  }});
  if (!hit) return false;
  if ({click}) hit.click();
  return true;
}})()"#,
        enabled_fn = ENABLED_FN,
        labels = lit(&labels),
        colours = colours,
        scope = lit(scope),
        click = click,
    )
}

pub fn synthetic_click(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  el.click();
  return true;
}})()"#,
        sel = lit(selector)
    )
}

pub fn clear(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  if (el.isContentEditable || el.getAttribute('role') === 'textbox') {{
    el.textContent = '';
    el.innerHTML = '';
  }} else if ('value' in el) {{
    el.value = '';
  }}
  el.focus();
  return true;
}})()"#,
        sel = lit(selector)
    )
}

pub fn dispatch_events(selector: &str, events: &[&str]) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  {events}.forEach(t => {{
    try {{ el.dispatchEvent(new Event(t, {{ bubbles: true }})); }} catch (e) {{}}
  }});
  return true;
}})()"#,
        sel = lit(selector),
        events = lit(events)
    )
}

pub fn is_enabled(selector: &str, enabled_colours: &[String]) -> String {
    format!(
        r#"(() => {{
  {enabled_fn}
  const el = document.querySelector({sel});
  return el !== null && __enabled(el, {colours});
}})()"#,
        enabled_fn = ENABLED_FN,
        sel = lit(selector),
        colours = lit(enabled_colours)
    )
}

pub fn text_content(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  return el === null ? null : (el.textContent || '');
}})()"#,
        sel = lit(selector)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_quotes_are_escaped() {
        let script = exists(r#"input[name="text"]"#);
        assert_eq!(script, r#"document.querySelector("input[name=\"text\"]") !== null"#);
    }

    #[test]
    fn test_label_scan_lowercases_labels() {
        let script = label_scan("button", &["Log In".to_string()], None, true);
        assert!(script.contains(r#"const labels = ["log in"];"#));
        assert!(script.contains("const colours = null;"));
        assert!(script.contains("if (true) hit.click();"));
    }

    #[test]
    fn test_label_scan_with_colours() {
        let colours = vec!["29, 155, 240".to_string()];
        let script = label_scan("button", &["post".to_string()], Some(&colours), false);
        assert!(script.contains(r#"const colours = ["29, 155, 240"];"#));
        assert!(script.contains("if (false) hit.click();"));
    }

    #[test]
    fn test_dispatch_lists_events() {
        let script = dispatch_events("#box", &["input", "change"]);
        assert!(script.contains(r#"["input","change"].forEach"#));
    }
}
