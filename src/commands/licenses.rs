use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::algo::aggregate::TABLE_TOP_N;
use crate::ops;
use crate::PacklistPlugin;

pub struct Licenses;

impl PluginCommand for Licenses {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist licenses"
    }

    fn description(&self) -> &str {
        "Most used license IDs with an example device for each"
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
            ])
            .named(
                "top",
                SyntaxShape::Int,
                "Number of licenses (default: 5)",
                Some('n'),
            )
            .category(Category::Math)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["license", "permit", "regulatory", "compliance"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist licenses --top 3"#,
            description: "Three most used licenses",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &PacklistPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let top: usize = call
            .get_flag::<i64>("top")?
            .map(|n| n.max(0) as usize)
            .unwrap_or(TABLE_TOP_N);
        let rows = filtered_rows(call, input)?;
        Ok(json_output(&ops::op_licenses(&rows, Some(top)), call.head))
    }
}
