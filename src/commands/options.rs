use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type, Value,
};

use super::util::input_rows;
use crate::ops;
use crate::PacklistPlugin;

pub struct Options;

impl PluginCommand for Options {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist options"
    }

    fn description(&self) -> &str {
        "List the distinct non-empty values of a column, sorted"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::List(Box::new(Type::String))),
                (Type::String, Type::List(Box::new(Type::String))),
            ])
            .required("field", SyntaxShape::String, "Column to list values of")
            .category(Category::Filters)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["distinct", "values", "unique", "filter", "choices"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist options customer"#,
            description: "Customers available as filter values",
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
        let head = call.head;
        let field: String = call.req(0)?;
        let rows = input_rows(input, head)?;
        let values: Vec<Value> = ops::op_options(&rows, &field)
            .as_array()
            .map(|vals| {
                vals.iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| Value::string(s, head))
                    .collect()
            })
            .unwrap_or_default();
        Ok(PipelineData::Value(Value::list(values, head), None))
    }
}
