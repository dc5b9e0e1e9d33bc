use crate::{Node, NodeKind};

/// Receives the ports and cells of a validated netlist, e.g. to build a
/// placement database
pub trait NetlistConsumer {
    fn set_inputs(&mut self, names: &[String]);
    fn set_outputs(&mut self, names: &[String]);
    fn add_cell(&mut self, _node: &Node) {}
}

/// A cell as recorded by [`PortLists`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSummary {
    pub kind: NodeKind,
    pub model: Option<String>,
    pub output: String,
}

/// Records port names and a short summary of every cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortLists {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub cells: Vec<CellSummary>,
}

impl NetlistConsumer for PortLists {
    fn set_inputs(&mut self, names: &[String]) {
        self.inputs = names.to_vec();
    }

    fn set_outputs(&mut self, names: &[String]) {
        self.outputs = names.to_vec();
    }

    fn add_cell(&mut self, node: &Node) {
        self.cells.push(CellSummary {
            kind: node.kind,
            model: node.model().map(str::to_owned),
            output: node.output_contact.clone(),
        });
    }
}
