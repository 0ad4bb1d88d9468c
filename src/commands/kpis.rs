use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::ops;
use crate::PacklistPlugin;

pub struct Kpis;

impl PluginCommand for Kpis {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist kpis"
    }

    fn description(&self) -> &str {
        "Record count, distinct customers and devices, and total units"
    }

    fn extra_description(&self) -> &str {
        "Quantities are read as leading integers; anything unparsable counts as 0."
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::record()),
                (Type::String, Type::record()),
            ])
            .category(Category::Math)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["summary", "totals", "count", "units", "metrics"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open --raw packing_list.csv | packlist kpis"#,
                description: "Headline counters for a packing list",
                result: None,
            },
            Example {
                example: r#"open --raw packing_list.csv | packlist kpis --field customer --value C06034"#,
                description: "Counters for one customer",
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
        let rows = filtered_rows(call, input)?;
        Ok(json_output(&ops::op_kpis(&rows), call.head))
    }
}
