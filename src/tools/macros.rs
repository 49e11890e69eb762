//! Tool Definition Macros
//!
//! Simplifies tool creation by reducing boilerplate

/// Define tool metadata using a declarative syntax
///
/// # Example
/// ```
/// let metadata = deskbot::tool_metadata! {
///     name: "faq_lookup",
///     description: "Answer a frequently asked question",
///     parameters: [
///         {
///             name: "question",
///             type: "string",
///             description: "The customer's question",
///             required: true
///         }
///     ]
/// };
/// assert_eq!(metadata.parameters.len(), 1);
/// ```
#[macro_export]
macro_rules! tool_metadata {
    (
        name: $name:expr,
        description: $description:expr,
        parameters: [
            $(
                {
                    name: $param_name:expr,
                    type: $param_type:expr,
                    description: $param_desc:expr,
                    required: $param_required:expr
                }
            ),* $(,)?
        ]
    ) => {
        $crate::tools::ToolMetadata {
            name: $name.to_string(),
            description: $description.to_string(),
            parameters: vec![
                $(
                    $crate::tools::ToolParameter {
                        name: $param_name.to_string(),
                        param_type: $param_type.to_string(),
                        description: $param_desc.to_string(),
                        required: $param_required,
                    }
                ),*
            ],
        }
    };
}
