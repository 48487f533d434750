//! Helper-function to template conversion.
//!
//! Builds the instruction sent to a completion service asking it to rewrite
//! string-building helper code as a template this crate can render.

use promptlab_runner::{CompletionService, RunnerError};
use tracing::{debug, info};

use crate::error::CoreResult;

const CONVERSION_INSTRUCTIONS: &str = r#"You convert JavaScript or TypeScript helper functions that build strings (for example prompts for language models) into Jinja-style templates. Keep all of the logic, wording and formatting.

Requirements for the template:
- Use {{ variable }} for values and {% if %}...{% endif %} for logic.
- It must render without errors when given only its input variables.
- It must be self-contained. Helper functions such as getBusinessDetailsString() do not exist at render time, so inline their logic.

Mistakes to avoid:
- No ternary expressions (condition ? a : b). Use {% if condition %}...{% else %}...{% endif %}.
- No calls to external functions.
- No inline conditional assignment inside {{ }}. Use {% set %} inside {% if %} blocks.
- Never apply join to a value that may be missing or not a list. Guard it:
  {% if items is defined and items is not none and items is iterable %}{{ items | join(', ') }}{% else %}Fallback{% endif %}

Conventions:
- Branch on enumerated inputs with comparisons such as {% if language == "HINDI" %}.
- Render repeated blocks with loops or a guarded join(', ').
- Give defaults with or, as in {{ website or 'Not provided' }}.

Input functions:
"#;

const OUTPUT_INSTRUCTIONS: &str = "Reply with the converted template only, as plain text. No explanation and no Markdown.";

/// Build the conversion request for a block of helper source code.
pub fn conversion_prompt(source: &str) -> String {
    format!(
        "{}{}\n\n{}\n",
        CONVERSION_INSTRUCTIONS,
        source.trim(),
        OUTPUT_INSTRUCTIONS
    )
}

/// Strip a Markdown code fence wrapped around a model reply.
///
/// Models sometimes fence the template despite being asked not to.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (```jinja, ```nunjucks, ...)
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// Ask a completion service to convert helper source into a template.
pub async fn convert_source(service: &dyn CompletionService, source: &str) -> CoreResult<String> {
    let prompt = conversion_prompt(source);
    debug!("Sending {} byte conversion request to {}", prompt.len(), service.name());

    let response = service.complete(&prompt).await?;
    let content = response
        .content
        .ok_or_else(|| RunnerError::InvalidResponse("response has no content".to_string()))?;

    let template = strip_code_fence(&content).to_string();
    info!("Converted helper source into a {} byte template", template.len());
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use promptlab_runner::{CompletionResponse, MockCompletionService, MockReply};
    use promptlab_templates::extract_variables;

    const HELPER: &str = r#"
const salesPrompt = (business, website) =>
  `Write copy for ${business}. Site: ${website ? website : 'none'}`;
"#;

    #[test]
    fn test_prompt_embeds_source() {
        let prompt = conversion_prompt(HELPER);
        assert!(prompt.contains("const salesPrompt = (business, website) =>"));
        assert!(prompt.contains("No ternary expressions"));
        assert!(prompt.ends_with("No explanation and no Markdown.\n"));
    }

    #[test]
    fn test_prompt_is_renderable_text() {
        // The instructions quote template syntax; extraction must still see the
        // guarded join example as ordinary variables.
        let vars = extract_variables(&conversion_prompt(""));
        assert!(vars.contains("items"));
        assert!(vars.contains("website"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("Hello {{ name }}"), "Hello {{ name }}");
        assert_eq!(strip_code_fence("```jinja\nHello {{ name }}\n```"), "Hello {{ name }}");
        assert_eq!(strip_code_fence("```\nA\nB\n```\n"), "A\nB");
        assert_eq!(strip_code_fence("```unterminated"), "```unterminated");
    }

    #[tokio::test]
    async fn test_convert_source() {
        let service = MockCompletionService::new().add_reply(MockReply::success(
            "```nunjucks\nWrite copy for {{ business }}. Site: {{ website or 'none' }}\n```",
        ));

        let template = convert_source(&service, HELPER).await.unwrap();
        assert_eq!(template, "Write copy for {{ business }}. Site: {{ website or 'none' }}");

        let prompts = service.get_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("salesPrompt"));
    }

    #[tokio::test]
    async fn test_convert_source_errors() {
        let failing = MockCompletionService::new().add_reply(MockReply::status(500));
        assert!(matches!(
            convert_source(&failing, HELPER).await,
            Err(CoreError::Runner(RunnerError::Status { status: 500, .. }))
        ));

        let empty = MockCompletionService::new().add_reply(MockReply {
            outcome: Ok(CompletionResponse {
                content: None,
                usage: None,
                timestamp: None,
            }),
            delay: None,
        });
        assert!(matches!(
            convert_source(&empty, HELPER).await,
            Err(CoreError::Runner(RunnerError::InvalidResponse(_)))
        ));
    }
}
