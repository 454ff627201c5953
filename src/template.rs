//! Template interpolation for YAML configs
//!
//! Handles `{{ env.NAME }}` and `{{ vars.path }}` placeholders so credentials
//! can stay out of configuration files.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ root.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template pattern is valid")
});

/// Values available to templates
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Fixed environment; `None` reads the process environment
    env: Option<HashMap<String, String>>,
    /// Extra variables, reachable as `vars.*`
    vars: Value,
}

impl TemplateContext {
    /// Context backed by the process environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a fixed environment instead of the process one
    pub fn with_env<I, K, V>(env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env: Some(env.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            vars: Value::Null,
        }
    }

    /// Set the `vars.*` values
    pub fn set_vars(&mut self, vars: Value) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Resolve `env.NAME` or `vars.a.b`
    pub fn get(&self, path: &str) -> Option<String> {
        let (root, rest) = path.split_once('.')?;
        match root {
            "env" => match &self.env {
                Some(env) => env.get(rest).cloned(),
                None => std::env::var(rest).ok(),
            },
            "vars" => {
                let mut current = &self.vars;
                for part in rest.split('.') {
                    current = current.as_object()?.get(part)?;
                }
                Some(value_to_string(current))
            }
            _ => None,
        }
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let path = &cap[1];
        ctx.get(path).unwrap_or_else(|| {
            missing.push(path.to_string());
            String::new()
        })
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render every string inside a JSON value
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::new();
            for (k, v) in map {
                rendered.insert(k.clone(), render_value(v, ctx)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> TemplateContext {
        let mut ctx = TemplateContext::with_env([("COUCH_PASSWORD", "s3cret"), ("COUCH_HOST", "db")]);
        ctx.set_vars(json!({"port": 5984, "tls": {"enabled": false}}));
        ctx
    }

    #[test]
    fn test_env_substitution() {
        let result = render("Bearer {{ env.COUCH_PASSWORD }}", &ctx()).unwrap();
        assert_eq!(result, "Bearer s3cret");
    }

    #[test]
    fn test_vars_substitution() {
        let result = render(
            "http://{{ env.COUCH_HOST }}:{{ vars.port }}/?tls={{vars.tls.enabled}}",
            &ctx(),
        )
        .unwrap();
        assert_eq!(result, "http://db:5984/?tls=false");
    }

    #[test]
    fn test_undefined_variables_are_reported_together() {
        let err = render("{{ env.NOPE }}-{{ vars.missing }}-{{ other.x }}", &ctx()).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
        let message = err.to_string();
        assert!(message.contains("env.NOPE"));
        assert!(message.contains("vars.missing"));
        assert!(message.contains("other.x"));
    }

    #[test]
    fn test_process_environment() {
        let ctx = TemplateContext::new();
        std::env::set_var("COUCHVIEW_TEMPLATE_TEST", "from-process");
        assert_eq!(
            render("{{ env.COUCHVIEW_TEMPLATE_TEST }}", &ctx).unwrap(),
            "from-process"
        );
    }

    #[test]
    fn test_whitespace_and_plain_strings() {
        assert_eq!(render("{{env.COUCH_HOST}}", &ctx()).unwrap(), "db");
        assert_eq!(render("{{   env.COUCH_HOST   }}", &ctx()).unwrap(), "db");
        assert_eq!(render("no templates", &ctx()).unwrap(), "no templates");
        assert!(!has_templates("{ env.COUCH_HOST }"));
    }

    #[test]
    fn test_render_value_nested() {
        let input = json!({
            "auth": {"type": "basic", "password": "{{ env.COUCH_PASSWORD }}"},
            "hosts": ["{{ env.COUCH_HOST }}"],
            "page_size": 10
        });

        let result = render_value(&input, &ctx()).unwrap();
        assert_eq!(
            result,
            json!({
                "auth": {"type": "basic", "password": "s3cret"},
                "hosts": ["db"],
                "page_size": 10
            })
        );
    }
}
