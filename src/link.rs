use crate::{
    error::{BlifError, LineError},
    Netlist, NodeId,
};

impl Netlist {
    /// Connect every node to the node consuming its output.
    ///
    /// Cells driving an output port hang under that port, every other cell
    /// hangs under the first cell using its output, and input ports hang under
    /// the first cell using them. Fails on the first structural error.
    pub fn link(&mut self) -> Result<(), LineError> {
        self.unlink();
        let cells: Vec<NodeId> = self.fabric_in_order().map(|n| n.id).collect();

        for &cell in &cells {
            if let Some(port) = self.find_output_port(&self.node(cell).output_contact) {
                self.attach(cell, port);
            }
        }

        for &port in &self.top_inputs {
            let name = &self.node(port).output_contact;
            if let Some(driver) = self.find_fabric(name) {
                return Err(LineError::new(
                    self.node(driver).line,
                    BlifError::InputContactsFabricDriver(name.clone()),
                ));
            }
        }

        // Reset pins are exempt. Netlists from some flows wire a top output
        // back into R= pins.
        for &port in &self.top_outputs {
            let name = &self.node(port).output_contact;
            let user = self
                .users_of(name)
                .map(|id| self.node(id))
                .find(|n| n.consumes_non_reset(name));
            if let Some(user) = user {
                return Err(LineError::new(
                    user.line,
                    BlifError::OutputContactsFabricInput(name.clone()),
                ));
            }
        }

        for &cell in &cells {
            if self.node(cell).parent.is_some() {
                continue;
            }
            let contact = &self.node(cell).output_contact;
            match self.find_fabric_parent(contact, Some(cell)) {
                Some(user) => self.attach(cell, user),
                None => {
                    return Err(LineError::new(
                        self.node(cell).line,
                        BlifError::DanglingCellOutput(contact.clone()),
                    ))
                }
            }
        }

        for port in self.top_inputs.clone() {
            let name = &self.node(port).output_contact;
            match self.find_fabric_parent(name, None) {
                Some(user) => self.attach(port, user),
                None => {
                    return Err(LineError::new(
                        self.decls.inputs_line,
                        BlifError::DanglingInputPort(name.clone()),
                    ))
                }
            }
        }

        log::debug!("linked {} cells", cells.len());
        Ok(())
    }

    /// Drop all edges
    pub fn unlink(&mut self) {
        for node in self.nodes.iter_mut() {
            node.parent = None;
            node.children.clear();
        }
    }

    fn attach(&mut self, child: NodeId, parent: NodeId) {
        log::trace!(
            "{} ({}) -> {} ({})",
            child,
            self.node(child).output_contact,
            parent,
            self.node(parent).output_contact
        );
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// First output port, in name order, no cell drives
    pub fn undriven_output(&self) -> Option<NodeId> {
        self.top_outputs
            .iter()
            .copied()
            .find(|id| self.node(*id).children.is_empty())
    }
}
