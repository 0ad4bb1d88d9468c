use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::agents::catalog_flag;
use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::agent::prompt::{DEFAULT_MAX_RECORDS, DEFAULT_MODEL};
use crate::ops;
use crate::PacklistPlugin;

pub struct Prompt;

impl PluginCommand for Prompt {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist prompt"
    }

    fn description(&self) -> &str {
        "Render the prompt an analyst agent would send for the input rows"
    }

    fn extra_description(&self) -> &str {
        "The first {{input}} in the template (or --custom prompt) is replaced by the first \
         --max-records rows as JSON. Nothing is sent; the record returned holds the model, \
         system instruction and prompt."
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::record()),
                (Type::String, Type::record()),
            ])
            .required("agent", SyntaxShape::String, "Agent index, name, or role")
            .named(
                "custom",
                SyntaxShape::String,
                "Prompt to use instead of the agent template",
                None,
            )
            .named(
                "model",
                SyntaxShape::String,
                "Model name (default: gemini-3-flash-preview)",
                Some('m'),
            )
            .named(
                "max-records",
                SyntaxShape::Int,
                "Rows included in the prompt (default: 50)",
                None,
            )
            .named(
                "catalog",
                SyntaxShape::Filepath,
                "Agent catalog JSON file (default: embedded catalog)",
                Some('c'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["llm", "analyst", "agent", "gemini", "ai"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open --raw packing_list.csv | packlist prompt "Anomaly Detector" | get prompt"#,
                description: "Prompt text for the anomaly detector",
                result: None,
            },
            Example {
                example: r#"open --raw packing_list.csv | packlist prompt 0 --custom "Summarize: {{input}}" --max-records 10"#,
                description: "Custom prompt over the first 10 rows",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &PacklistPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let agent: String = call.req(0)?;
        let custom = call.get_flag::<String>("custom")?;
        let model = call
            .get_flag::<String>("model")?
            .unwrap_or_else(|| DEFAULT_MODEL.into());
        let max_records: usize = call
            .get_flag::<i64>("max-records")?
            .map(|n| n.max(0) as usize)
            .unwrap_or(DEFAULT_MAX_RECORDS);
        let catalog = catalog_flag(call)?;
        let rows = filtered_rows(call, input)?;

        let result = ops::op_prompt(
            &rows,
            &catalog,
            &agent,
            custom.as_deref(),
            Some(&model),
            Some(max_records),
        )
        .map_err(|e| LabeledError::new("Cannot build prompt").with_label(e, head))?;
        Ok(json_output(&result, head))
    }
}
