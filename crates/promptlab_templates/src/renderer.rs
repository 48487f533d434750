//! Template rendering.
//!
//! Templates use the Jinja family grammar: `{{ expr }}` for output, `{% if %}`,
//! `{% for %}` and `{% set %}` tags, filters, and `x or 'fallback'` defaults.
//! Every call builds its own environment, so nothing defined while rendering
//! one template is visible to the next.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TemplateResult;
use crate::format::format_value;
use crate::value::{decode_variables, VariableValue};

/// How references to undefined variables are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    /// Printing, iterating or filtering an undefined value fails the render.
    /// Truthiness checks (`{% if x %}`, `x or 'default'`) stay allowed.
    #[default]
    Strict,
    /// Undefined values render as empty.
    Lenient,
}

impl UndefinedPolicy {
    fn behavior(self) -> UndefinedBehavior {
        match self {
            Self::Strict => UndefinedBehavior::SemiStrict,
            Self::Lenient => UndefinedBehavior::Lenient,
        }
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default)]
    pub undefined: UndefinedPolicy,
    /// HTML-escape printed values
    #[serde(default)]
    pub autoescape: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undefined(mut self, policy: UndefinedPolicy) -> Self {
        self.undefined = policy;
        self
    }

    pub fn autoescape(mut self, enabled: bool) -> Self {
        self.autoescape = enabled;
        self
    }
}

/// Template renderer.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    options: RenderOptions,
}

impl TemplateRenderer {
    /// Create a renderer with the default (strict) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with explicit options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a template against raw string variables.
    ///
    /// Each value is decoded as JSON when possible before substitution.
    pub fn render(
        &self,
        template: &str,
        variables: &BTreeMap<String, String>,
    ) -> TemplateResult<String> {
        self.render_values(template, &decode_variables(variables))
    }

    /// Render a template against already-decoded values.
    pub fn render_values(
        &self,
        template: &str,
        values: &BTreeMap<String, VariableValue>,
    ) -> TemplateResult<String> {
        let result = self.check_strict(template, values).and_then(|()| {
            self.environment(true).render_str(template, values)
        });
        let rendered = result.map_err(|err| {
            debug!("Render failed: {:#}", err);
            err
        })?;
        Ok(rendered)
    }

    /// A custom formatter bypasses the engine's undefined check on output,
    /// so strict renders are first validated with the stock formatter.
    fn check_strict(
        &self,
        template: &str,
        values: &BTreeMap<String, VariableValue>,
    ) -> Result<(), minijinja::Error> {
        if self.options.undefined == UndefinedPolicy::Strict {
            self.environment(false).render_str(template, values)?;
        }
        Ok(())
    }

    fn environment(&self, js_output: bool) -> Environment<'static> {
        let mut env = Environment::new();
        if js_output {
            env.set_formatter(format_value);
        }
        env.set_undefined_behavior(self.options.undefined.behavior());
        env.set_keep_trailing_newline(true);

        let autoescape = self.options.autoescape;
        env.set_auto_escape_callback(move |_| {
            if autoescape {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render("Hello {{ name }}", &vars(&[("name", "World")]))
            .unwrap();
        assert_eq!(rendered, "Hello World");
    }

    #[test]
    fn test_boolean_conditionals() {
        let renderer = TemplateRenderer::new();
        let template = "{% if flag %}yes{% else %}no{% endif %}";
        assert_eq!(renderer.render(template, &vars(&[("flag", "true")])).unwrap(), "yes");
        assert_eq!(renderer.render(template, &vars(&[("flag", "false")])).unwrap(), "no");
    }

    #[test]
    fn test_loop_over_json_list() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render(
                "{% for item in items %}- {{ item }}\n{% endfor %}",
                &vars(&[("items", r#"["alpha", "beta"]"#)]),
            )
            .unwrap();
        assert_eq!(rendered, "- alpha\n- beta\n");
    }

    #[test]
    fn test_object_attribute_access() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render(
                "{{ user.name }} ({{ user.age }})",
                &vars(&[("user", r#"{"name": "Ada", "age": 36}"#)]),
            )
            .unwrap();
        assert_eq!(rendered, "Ada (36)");
    }

    #[test]
    fn test_strict_undefined_fails() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render("{{ missing }}", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Undefined(_)));
    }

    #[test]
    fn test_strict_filter_on_undefined_fails() {
        let renderer = TemplateRenderer::new();
        assert!(renderer
            .render("{{ missing | length }}", &BTreeMap::new())
            .is_err());
    }

    #[test]
    fn test_strict_allows_or_fallback() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render("{{ website or 'Not provided' }}", &BTreeMap::new())
            .unwrap();
        assert_eq!(rendered, "Not provided");

        let rendered = renderer
            .render("{% if extra %}{{ extra }}{% else %}none{% endif %}", &BTreeMap::new())
            .unwrap();
        assert_eq!(rendered, "none");
    }

    #[test]
    fn test_lenient_undefined_renders_empty() {
        let renderer =
            TemplateRenderer::with_options(RenderOptions::new().undefined(UndefinedPolicy::Lenient));
        let rendered = renderer.render("[{{ missing }}]", &BTreeMap::new()).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn test_syntax_error() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render("{% if flag %}unterminated", &vars(&[("flag", "true")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Syntax(_)));
    }

    #[test]
    fn test_unknown_filter_fails() {
        let renderer = TemplateRenderer::new();
        assert!(renderer
            .render("{{ x | nosuchfilter }}", &vars(&[("x", "1")]))
            .is_err());
    }

    #[test]
    fn test_no_state_leaks_between_renders() {
        let renderer = TemplateRenderer::new();
        renderer
            .render("{% set leaked = 'x' %}{{ leaked }}", &BTreeMap::new())
            .unwrap();
        assert!(renderer.render("{{ leaked }}", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_autoescape_toggle() {
        let raw = vars(&[("html", "a < b & c")]);

        let plain = TemplateRenderer::new();
        assert_eq!(plain.render("{{ html }}", &raw).unwrap(), "a < b & c");

        let escaped = TemplateRenderer::with_options(RenderOptions::new().autoescape(true));
        assert_eq!(escaped.render("{{ html }}", &raw).unwrap(), "a &lt; b &amp; c");
    }

    #[test]
    fn test_values_print_like_javascript() {
        let renderer = TemplateRenderer::new();
        let render = |raw: &str| renderer.render("[{{ x }}]", &vars(&[("x", raw)])).unwrap();

        assert_eq!(render("null"), "[]");
        assert_eq!(render(r#"["a", "b"]"#), "[a,b]");
        assert_eq!(render("[1, null, [2, 3]]"), "[1,,2,3]");
        assert_eq!(render(r#"{"k": "v"}"#), "[[object Object]]");
        assert_eq!(render("1.0"), "[1]");
        assert_eq!(render("1e3"), "[1000]");
        assert_eq!(render("2.5"), "[2.5]");
        assert_eq!(render("true"), "[true]");
        assert_eq!(render("not json"), "[not json]");
    }

    #[test]
    fn test_computed_values_print_like_javascript() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render("{{ x * 2 }} {{ flag }}", &vars(&[("x", "0.5"), ("flag", "false")]))
            .unwrap();
        assert_eq!(rendered, "1 false");
    }

    #[test]
    fn test_strict_still_checked_with_custom_output() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render("{{ present }} {{ absent }}", &vars(&[("present", "null")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Undefined(_)));

        // An `if` expression without `else` yields nothing rather than failing
        let rendered = renderer
            .render("[{{ 'x' if flag }}]", &vars(&[("flag", "false")]))
            .unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn test_autoescape_matches_html_entities() {
        let escaped = TemplateRenderer::with_options(RenderOptions::new().autoescape(true));
        let rendered = escaped
            .render("{{ v }}", &vars(&[("v", r#"a/b 'q' "d" <i>"#)]))
            .unwrap();
        assert_eq!(rendered, "a/b &#39;q&#39; &quot;d&quot; &lt;i&gt;");

        let safe = escaped
            .render("{{ v | safe }}", &vars(&[("v", "<b>")]))
            .unwrap();
        assert_eq!(safe, "<b>");
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render("Hi {{ n }}\n", &vars(&[("n", "2")])).unwrap();
        assert_eq!(rendered, "Hi 2\n");
    }
}
