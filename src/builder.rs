use crate::{
    error::{BlifError, LineError},
    lines::LineBuf,
    parse::CellRecord,
    raw::{Directive, Keyword},
    sink::DiagnosticSink,
    Dialect, Netlist, Node, NodeId, NodeKind,
};

/// Port names from the first `.inputs` and first `.outputs` directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    /// Sorted, duplicates kept
    pub inputs: Vec<String>,
    /// Sorted, duplicates kept
    pub outputs: Vec<String>,
    /// 0 if there is no `.inputs`
    pub inputs_line: usize,
    /// 0 if there is no `.outputs`
    pub outputs_line: usize,
}

impl Declarations {
    pub fn scan(lines: &LineBuf) -> Result<Self, LineError> {
        let mut decls = Declarations::default();
        for (idx, text) in lines.iter() {
            let Some(d) = Directive::parse(idx, text) else {
                continue;
            };
            let names = || d.tokens.iter().map(|t| t.to_string()).collect();
            match d.keyword {
                Keyword::Inputs if decls.inputs_line == 0 => {
                    decls.inputs_line = idx;
                    decls.inputs = names();
                }
                Keyword::Outputs if decls.outputs_line == 0 => {
                    decls.outputs_line = idx;
                    decls.outputs = names();
                }
                _ => {}
            }
            if decls.inputs_line != 0 && decls.outputs_line != 0 {
                break;
            }
        }

        if decls.inputs_line == 0 && decls.outputs_line == 0 {
            return Err(BlifError::MissingDirective.into());
        }
        decls.inputs.sort();
        decls.outputs.sort();
        if decls.inputs.is_empty() && decls.outputs.is_empty() {
            let line = decls.inputs_line.max(decls.outputs_line);
            return Err(LineError::new(line, BlifError::EmptyDeclaration));
        }
        log::debug!(
            "declared {} inputs, {} outputs",
            decls.inputs.len(),
            decls.outputs.len()
        );
        Ok(decls)
    }

    pub fn duplicate_input(&self) -> Option<&str> {
        first_duplicate(&self.inputs)
    }

    pub fn duplicate_output(&self) -> Option<&str> {
        first_duplicate(&self.outputs)
    }

    /// First name, in sorted order, declared both as input and output
    pub fn overlap(&self) -> Option<&str> {
        let (mut i, mut o) = (0, 0);
        while i < self.inputs.len() && o < self.outputs.len() {
            match self.inputs[i].cmp(&self.outputs[o]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => o += 1,
                std::cmp::Ordering::Equal => return Some(&self.inputs[i]),
            }
        }
        None
    }
}

fn first_duplicate(sorted: &[String]) -> Option<&str> {
    sorted
        .windows(2)
        .find(|w| w[0] == w[1])
        .map(|w| w[0].as_str())
}

impl Netlist {
    /// Create nodes for every cell directive and declared port.
    ///
    /// Malformed cell lines do not fail the build; they are reported to `sink`
    /// and listed by [`Netlist::skipped`].
    pub fn build(
        lines: &LineBuf,
        decls: Declarations,
        dialect: Dialect,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self, LineError> {
        let mut netlist = Netlist {
            decls,
            ..Default::default()
        };
        let eblif = dialect == Dialect::Eblif;

        let mut last_cell = None;
        for (idx, text) in lines.iter() {
            let Some(d) = Directive::parse(idx, text) else {
                continue;
            };
            match d.keyword {
                Keyword::Model => {
                    if netlist.model.is_none() {
                        netlist.model = d.tokens.first().map(|t| t.to_string());
                    }
                }
                Keyword::End => {}
                Keyword::Inputs | Keyword::Outputs => {
                    let decls = &netlist.decls;
                    if decls.inputs_line != idx && decls.outputs_line != idx {
                        sink.report(idx, &format!("ignoring repeated {} directive", d.word));
                    }
                }
                Keyword::Names | Keyword::Subckt | Keyword::Gate => {
                    last_cell = netlist.add_cell(&d, sink);
                }
                Keyword::Conn if eblif => {
                    last_cell = netlist.add_cell(&d, sink);
                }
                Keyword::Cname | Keyword::Attr | Keyword::Param if eblif => {
                    netlist.annotate(last_cell, &d, sink);
                }
                _ => sink.report(idx, &format!("ignoring unsupported directive {}", d.word)),
            }
        }

        if netlist.fabric.is_empty() && netlist.constants.is_empty() {
            return Err(match netlist.skipped.first() {
                Some((line, err)) => LineError::new(*line, err.clone()),
                None => BlifError::IncompleteDesign.into(),
            });
        }

        let mut inputs = netlist.decls.inputs.clone();
        inputs.dedup();
        for name in inputs {
            let id = netlist.add_port(NodeKind::TopInput, netlist.decls.inputs_line, name);
            netlist.top_inputs.push(id);
        }
        let mut outputs = netlist.decls.outputs.clone();
        outputs.dedup();
        for name in outputs {
            let id = netlist.add_port(NodeKind::TopOutput, netlist.decls.outputs_line, name);
            netlist.top_outputs.push(id);
        }

        let nodes = &netlist.nodes;
        let by_contact = |a: &NodeId, b: &NodeId| {
            nodes[a.index()]
                .output_contact
                .cmp(&nodes[b.index()].output_contact)
        };
        netlist.fabric.sort_by(by_contact);
        netlist.top_inputs.sort_by(by_contact);
        netlist.top_outputs.sort_by(by_contact);

        let mut users: Vec<(String, NodeId)> = netlist
            .fabric_in_order()
            .flat_map(|n| n.input_contacts().map(move |c| (c.to_owned(), n.id)))
            .collect();
        users.sort();
        users.dedup();
        netlist.users = users;

        log::debug!(
            "built {} nodes: {} cells, {} constants, {} inputs, {} outputs, {} skipped lines",
            netlist.nodes.len(),
            netlist.fabric.len(),
            netlist.constants.len(),
            netlist.top_inputs.len(),
            netlist.top_outputs.len(),
            netlist.skipped.len()
        );
        Ok(netlist)
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        line: usize,
        tokens: Vec<String>,
        output: String,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            line,
            tokens,
            output_contact: output,
            parent: None,
            children: vec![],
            cname: None,
            attrs: vec![],
            params: vec![],
        });
        id
    }

    fn add_port(&mut self, kind: NodeKind, line: usize, name: String) -> NodeId {
        self.push_node(kind, line, vec![name.clone()], name)
    }

    fn add_cell(&mut self, d: &Directive, sink: &mut dyn DiagnosticSink) -> Option<NodeId> {
        match CellRecord::try_from(d) {
            Ok(CellRecord {
                kind,
                line,
                tokens,
                output_contact,
            }) => {
                let id = self.push_node(kind, line, tokens, output_contact);
                if self.node(id).is_constant() {
                    self.constants.push(id);
                } else {
                    self.fabric.push(id);
                }
                Some(id)
            }
            Err(err) => {
                sink.report(d.line, &err.to_string());
                self.skipped.push((d.line, err));
                None
            }
        }
    }

    fn annotate(&mut self, cell: Option<NodeId>, d: &Directive, sink: &mut dyn DiagnosticSink) {
        let Some(cell) = cell else {
            sink.report(d.line, &format!("{} does not follow a cell", d.word));
            return;
        };
        let node = &mut self.nodes[cell.index()];
        match (&d.keyword, d.tokens.as_slice()) {
            (Keyword::Cname, [name]) => node.cname = Some(name.to_string()),
            (Keyword::Attr, [key, value @ ..]) if !value.is_empty() => {
                node.attrs.push((key.to_string(), value.join(" ")))
            }
            (Keyword::Param, [key, value @ ..]) if !value.is_empty() => {
                node.params.push((key.to_string(), value.join(" ")))
            }
            _ => sink.report(d.line, &format!("malformed {} directive", d.word)),
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Cells, sorted by output contact
    pub fn fabric(&self) -> &[NodeId] {
        &self.fabric
    }

    /// Cells in source order
    pub fn fabric_in_order(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_fabric())
    }

    pub fn top_inputs(&self) -> &[NodeId] {
        &self.top_inputs
    }

    pub fn top_outputs(&self) -> &[NodeId] {
        &self.top_outputs
    }

    /// Single-net `.names` cells
    pub fn constants(&self) -> &[NodeId] {
        &self.constants
    }

    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    /// Name from the first `.model`
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Cell lines that could not be turned into nodes
    pub fn skipped(&self) -> &[(usize, BlifError)] {
        &self.skipped
    }

    fn search(&self, index: &[NodeId], contact: &str) -> Option<NodeId> {
        let pos = index.partition_point(|id| self.node(*id).output_contact.as_str() < contact);
        index
            .get(pos)
            .copied()
            .filter(|id| self.node(*id).output_contact == contact)
    }

    /// Cell driving `contact`
    pub fn find_fabric(&self, contact: &str) -> Option<NodeId> {
        self.search(&self.fabric, contact)
    }

    pub fn find_input_port(&self, name: &str) -> Option<NodeId> {
        self.search(&self.top_inputs, name)
    }

    pub fn find_output_port(&self, name: &str) -> Option<NodeId> {
        self.search(&self.top_outputs, name)
    }

    /// Cells with an input pin on `contact`, in source order
    pub fn users_of<'a>(&'a self, contact: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        let start = self.users.partition_point(|(c, _)| c.as_str() < contact);
        self.users[start..]
            .iter()
            .take_while(move |(c, _)| c == contact)
            .map(|(_, id)| *id)
    }

    /// First cell, in source order, with an input pin on `contact`
    pub fn find_fabric_parent(&self, contact: &str, exclude: Option<NodeId>) -> Option<NodeId> {
        self.users_of(contact).find(|id| Some(*id) != exclude)
    }

    /// Cell or input port driving `net`
    pub fn driver_of(&self, net: &str) -> Option<NodeId> {
        self.find_fabric(net).or_else(|| self.find_input_port(net))
    }

    /// Cells consuming `net`, then the output port named `net` if any
    pub fn consumers_of(&self, net: &str) -> Vec<NodeId> {
        let mut consumers: Vec<NodeId> = self.users_of(net).collect();
        consumers.extend(self.find_output_port(net));
        consumers
    }
}
