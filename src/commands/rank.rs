use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::algo::aggregate::CHART_TOP_N;
use crate::ops;
use crate::PacklistPlugin;

pub struct Rank;

impl PluginCommand for Rank {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist rank"
    }

    fn description(&self) -> &str {
        "Most frequent values of a column as name/value rows"
    }

    fn extra_description(&self) -> &str {
        "Sorted by count descending; equal counts keep first-seen order."
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
            ])
            .required("by", SyntaxShape::String, "Column to rank")
            .named(
                "top",
                SyntaxShape::Int,
                "Number of entries to keep (default: 10)",
                Some('n'),
            )
            .category(Category::Math)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["top", "frequency", "histogram", "most", "count"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open --raw packing_list.csv | packlist rank customer"#,
                description: "Top 10 customers by shipments",
                result: None,
            },
            Example {
                example: r#"open --raw packing_list.csv | packlist rank ModelNum --top 3"#,
                description: "Three most shipped models",
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
        let by: String = call.req(0)?;
        let top: usize = call
            .get_flag::<i64>("top")?
            .map(|n| n.max(0) as usize)
            .unwrap_or(CHART_TOP_N);
        let rows = filtered_rows(call, input)?;
        Ok(json_output(&ops::op_rank(&rows, &by, Some(top)), call.head))
    }
}
