//! Earth Engine expression graphs.
//!
//! The REST API takes computations as a graph of named value nodes. Every
//! graph built here has a single root node, `"0"`, with its arguments
//! inlined:
//!
//! ```json
//! {"result": "0", "values": {"0": {"functionInvocationValue": {
//!     "functionName": "Image.load",
//!     "arguments": {"id": {"constantValue": "USGS/SRTMGL1_003"}}}}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const ROOT: &str = "0";

/// A serialized computation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Key of the node whose value is the result.
    pub result: String,
    pub values: BTreeMap<String, ValueNode>,
}

/// One node of an expression graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    FunctionInvocationValue(FunctionInvocation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, ValueNode>,
}

impl ValueNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::ConstantValue(value.into())
    }

    pub fn invoke<I, K>(function_name: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, ValueNode)>,
        K: Into<String>,
    {
        Self::FunctionInvocationValue(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Name of the invoked function, if this is an invocation.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::FunctionInvocationValue(call) => Some(&call.function_name),
            _ => None,
        }
    }
}

impl Expression {
    /// Wrap a node as the root of a new graph.
    pub fn from_root(node: ValueNode) -> Self {
        let mut values = BTreeMap::new();
        values.insert(ROOT.to_string(), node);
        Self {
            result: ROOT.to_string(),
            values,
        }
    }

    /// The node the graph evaluates to.
    pub fn root(&self) -> Option<&ValueNode> {
        self.values.get(&self.result)
    }

    /// `Image.load(id)`
    pub fn image_load(image_id: &str) -> Self {
        Self::from_root(image_load_node(image_id))
    }

    /// `Image.bandNames(Image.load(id))`
    pub fn band_names(image_id: &str) -> Self {
        Self::from_root(ValueNode::invoke(
            "Image.bandNames",
            [("image", image_load_node(image_id))],
        ))
    }

    /// `Projection.atScale(Projection(crs), meters)`
    pub fn projection_at_scale(crs: &str, meters: f64) -> Self {
        let projection = ValueNode::invoke("Projection", [("crs", ValueNode::constant(crs))]);
        Self::from_root(ValueNode::invoke(
            "Projection.atScale",
            [
                ("projection", projection),
                ("meters", ValueNode::constant(meters)),
            ],
        ))
    }
}

fn image_load_node(image_id: &str) -> ValueNode {
    ValueNode::invoke("Image.load", [("id", ValueNode::constant(image_id))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_load_wire_shape() {
        let expr = Expression::image_load("projects/p/assets/rgb");
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({
                "result": "0",
                "values": {"0": {"functionInvocationValue": {
                    "functionName": "Image.load",
                    "arguments": {"id": {"constantValue": "projects/p/assets/rgb"}}
                }}}
            })
        );
    }

    #[test]
    fn test_projection_at_scale_wire_shape() {
        let expr = Expression::projection_at_scale("EPSG:4326", 10.0);
        let value = serde_json::to_value(&expr).unwrap();
        let call = &value["values"]["0"]["functionInvocationValue"];

        assert_eq!(call["functionName"], "Projection.atScale");
        assert_eq!(call["arguments"]["meters"]["constantValue"], 10.0);
        assert_eq!(
            call["arguments"]["projection"]["functionInvocationValue"]["arguments"]["crs"]
                ["constantValue"],
            "EPSG:4326"
        );
    }

    #[test]
    fn test_band_names_nests_image_load() {
        let expr = Expression::band_names("img");
        let ValueNode::FunctionInvocationValue(call) = expr.root().unwrap() else {
            panic!("root is not an invocation");
        };
        assert_eq!(call.function_name, "Image.bandNames");
        assert_eq!(call.arguments["image"].function_name(), Some("Image.load"));
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let expr = Expression::projection_at_scale("EPSG:32617", 30.0);
        let json = serde_json::to_string(&expr).unwrap();
        let parsed: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, expr);
    }
}
