//! Visualization projection: maps an extracted neighborhood to a
//! presentation-ready node/edge payload with fixed styling and
//! incremental progress events.

mod projector;

pub use projector::project;

use serde::Serialize;

/// Derived, mutually exclusive classification of a projected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Default,
    Target,
    Neighbor,
}

impl NodeRole {
    /// Fixed rendering size per role.
    pub fn size(self) -> u32 {
        match self {
            NodeRole::Default => 25,
            NodeRole::Target => 35,
            NodeRole::Neighbor => 30,
        }
    }

    /// Fixed rendering color per role.
    pub fn color(self) -> &'static str {
        match self {
            NodeRole::Default => "#97c2fc",
            NodeRole::Target => "#ff4444",
            NodeRole::Neighbor => "#44ff44",
        }
    }
}

/// A node ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct VizNode {
    pub id: String,
    pub label: String,
    pub role: NodeRole,
    pub size: u32,
    pub color: &'static str,
    pub title: String,
}

/// An edge ready for display. Arrow direction and curvature are
/// presentation constants, not computed per edge.
#[derive(Debug, Clone, Serialize)]
pub struct VizEdge {
    pub from: String,
    pub to: String,
    pub arrows: &'static str,
    pub smooth: EdgeSmoothing,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeSmoothing {
    #[serde(rename = "type")]
    pub style: &'static str,
    pub roundness: f64,
}

impl Default for EdgeSmoothing {
    fn default() -> Self {
        Self {
            style: "curvedCW",
            roundness: 0.2,
        }
    }
}

/// The full projected payload handed to the client renderer.
#[derive(Debug, Clone, Serialize)]
pub struct VizPayload {
    pub nodes: Vec<VizNode>,
    pub edges: Vec<VizEdge>,
    pub options: serde_json::Value,
}

/// Fixed physics/interaction options for the client-side layout.
pub fn display_options() -> serde_json::Value {
    serde_json::json!({
        "physics": {
            "forceAtlas2Based": {
                "gravitationalConstant": -50,
                "centralGravity": 0.01,
                "springLength": 100,
                "springConstant": 0.08
            },
            "maxVelocity": 50,
            "minVelocity": 0.1,
            "solver": "forceAtlas2Based",
            "timestep": 0.35
        },
        "interaction": {
            "navigationButtons": true,
            "keyboard": true
        }
    })
}

/// Receiver of incremental progress events.
///
/// Emitted synchronously from the thread doing the projection; a sink
/// must not block for long. The percent sequence per request is
/// non-decreasing and ends with exactly one 100. Events carry no
/// semantic guarantee and exist only for host-side UI feedback.
pub trait ProgressSink {
    fn emit(&self, percent: u8, message: &str);
}

/// Sink that discards all events.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _percent: u8, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_styling_constants() {
        assert_eq!(NodeRole::Target.size(), 35);
        assert_eq!(NodeRole::Target.color(), "#ff4444");
        assert_eq!(NodeRole::Neighbor.size(), 30);
        assert_eq!(NodeRole::Neighbor.color(), "#44ff44");
        assert_eq!(NodeRole::Default.size(), 25);
        assert_eq!(NodeRole::Default.color(), "#97c2fc");
    }

    #[test]
    fn test_edge_serialization_shape() {
        let edge = VizEdge {
            from: "cat".to_string(),
            to: "feline".to_string(),
            arrows: "to",
            smooth: EdgeSmoothing::default(),
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["arrows"], "to");
        assert_eq!(json["smooth"]["type"], "curvedCW");
        assert_eq!(json["smooth"]["roundness"], 0.2);
    }

    #[test]
    fn test_display_options_solver() {
        let options = display_options();
        assert_eq!(options["physics"]["solver"], "forceAtlas2Based");
    }
}
