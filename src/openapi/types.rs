//! Output types handed to the workflow/agent runtime

use serde::{Deserialize, Serialize};

/// One node of a tool's parameter tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNode {
    /// Parameter name (`query.id`, a property name, `items`, `option_1`, ...)
    pub name: String,
    /// Description, empty when the document gives none
    pub description: String,
    /// Coarse type tag
    pub r#type: String,
    /// Whether the caller must supply this parameter
    pub required: bool,
    /// Nested parameters of objects, arrays and composite schemas
    pub children: Vec<ParameterNode>,
}

impl ParameterNode {
    /// Create a leaf node
    pub fn leaf<N: Into<String>, D: Into<String>, T: Into<String>>(
        name: N,
        description: D,
        r#type: T,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            r#type: r#type.into(),
            required,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ParameterNode::size).sum::<usize>()
    }
}

/// Inputs and outputs of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIo {
    pub inputs: Vec<ParameterNode>,
    pub outputs: Vec<ParameterNode>,
}

/// Summary of one operation of a custom tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    /// Operation id
    pub name: String,
    /// Operation description
    pub desc: String,
    /// Upper-case HTTP method
    pub method: String,
    /// Path template
    pub path: String,
}

/// Workflow-facing detail of one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDetail {
    pub action_id: String,
    pub action_name: String,
    pub inputs: Vec<ParameterNode>,
    pub outputs: Vec<ParameterNode>,
}

impl ToolDetail {
    pub fn new(identifier: &str, io: OperationIo) -> Self {
        Self {
            action_id: identifier.to_string(),
            action_name: identifier.to_string(),
            inputs: io.inputs,
            outputs: io.outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_node_wire_shape() {
        let mut node = ParameterNode::leaf("tags", "labels", "array", true);
        node.children.push(ParameterNode::leaf("items", "labels", "string", false));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "tags",
                "description": "labels",
                "type": "array",
                "required": true,
                "children": [
                    {"name": "items", "description": "labels", "type": "string", "required": false, "children": []}
                ]
            })
        );
        assert_eq!(node.size(), 2);
    }

    #[test]
    fn test_tool_detail_wire_shape() {
        let detail = ToolDetail::new("getPet", OperationIo::default());
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["actionId"], "getPet");
        assert_eq!(value["actionName"], "getPet");
        assert_eq!(value["inputs"], json!([]));
        assert_eq!(value["outputs"], json!([]));
    }
}
