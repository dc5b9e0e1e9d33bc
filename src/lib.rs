//! Reading and validation of BLIF/EBLIF netlists.
//!
//! A netlist file is read into a [`LineBuf`], its directives are turned into
//! [`Node`]s owned by a single [`Netlist`], the nodes are linked into a graph
//! and the graph is checked for dangling and undriven signals. [`BlifFile`]
//! drives the whole sequence and reports the first problem found.

use std::fmt::Display;
use std::num::NonZeroU32;

mod builder;
mod check;
mod consumer;
mod error;
mod lines;
mod link;
mod parse;
pub mod raw;
mod sink;
pub mod token;

pub use builder::Declarations;
pub use check::BlifFile;
pub use consumer::{CellSummary, NetlistConsumer, PortLists};
pub use error::{BlifError, Diagnostic, LineError};
pub use lines::LineBuf;
pub use sink::{DiagnosticSink, LogSink, NullSink};

/// Index of a node in its [`Netlist`]. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        NodeId(NonZeroU32::MIN.saturating_add(index as u32))
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `.names` logic cell
    Names,
    /// `.subckt` instance
    Subckt,
    /// `.gate` instance
    Gate,
    /// Placeholder for a name in `.inputs`
    TopInput,
    /// Placeholder for a name in `.outputs`
    TopOutput,
}

/// One cell or top-level port of a netlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Logical line the node was declared on
    pub line: usize,
    /// Tokens after the directive keyword. For `.subckt` and `.gate` the first
    /// token is the model name and the output connection is last.
    pub tokens: Vec<String>,
    /// The net this node drives
    pub output_contact: String,
    /// Node consuming this node's output, set by [`Netlist::link`]
    pub parent: Option<NodeId>,
    /// Nodes linked beneath this one. For a top output these are its drivers.
    pub children: Vec<NodeId>,
    /// EBLIF `.cname`
    pub cname: Option<String>,
    /// EBLIF `.attr` pairs
    pub attrs: Vec<(String, String)>,
    /// EBLIF `.param` pairs
    pub params: Vec<(String, String)>,
}

impl Node {
    /// +1 for a top output, -1 for a top input, 0 for a cell
    pub fn is_top(&self) -> i8 {
        match self.kind {
            NodeKind::TopOutput => 1,
            NodeKind::TopInput => -1,
            NodeKind::Names | NodeKind::Subckt | NodeKind::Gate => 0,
        }
    }

    /// A `.names` with a single net: a constant generator that drives no real net
    pub fn is_constant(&self) -> bool {
        self.kind == NodeKind::Names && self.tokens.len() == 1
    }

    pub fn is_fabric(&self) -> bool {
        self.is_top() == 0 && !self.is_constant()
    }

    /// Cell model name of a `.subckt` or `.gate`
    pub fn model(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Subckt | NodeKind::Gate => self.tokens.first().map(String::as_str),
            _ => None,
        }
    }

    /// Tokens naming input pins: everything but the model name and the output
    pub fn input_tokens(&self) -> &[String] {
        let n = self.tokens.len();
        match self.kind {
            NodeKind::Names if n >= 2 => &self.tokens[..n - 1],
            NodeKind::Subckt | NodeKind::Gate if n >= 3 => &self.tokens[1..n - 1],
            _ => &[],
        }
    }

    fn has_pins(&self) -> bool {
        matches!(self.kind, NodeKind::Subckt | NodeKind::Gate)
    }

    /// `.names` tokens are nets as written, pin connections name the net after `=`
    fn token_contact<'t>(&self, tok: &'t str) -> &'t str {
        if self.has_pins() {
            token::contact(tok)
        } else {
            tok
        }
    }

    /// Nets connected to input pins
    pub fn input_contacts(&self) -> impl Iterator<Item = &str> {
        self.input_tokens().iter().map(move |t| self.token_contact(t))
    }

    /// Does any input pin connect to `net`
    pub fn consumes(&self, net: &str) -> bool {
        self.input_contacts().any(|c| c == net)
    }

    /// Like [`Node::consumes`], ignoring `R=` reset pins of `.subckt` and `.gate` cells
    pub fn consumes_non_reset(&self, net: &str) -> bool {
        let pins = self.has_pins();
        self.input_tokens()
            .iter()
            .filter(|t| !(pins && token::is_reset_pin(t)))
            .any(|t| self.token_contact(t) == net)
    }
}

/// A netlist: the owner of all nodes and the indexes over them.
///
/// Built by [`Netlist::build`] and linked by [`Netlist::link`]. Nodes refer to
/// each other by [`NodeId`] only.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    nodes: Vec<Node>,
    /// Cells, sorted by output contact
    fabric: Vec<NodeId>,
    top_inputs: Vec<NodeId>,
    top_outputs: Vec<NodeId>,
    constants: Vec<NodeId>,
    /// `(input contact, cell)` for every cell input, sorted by contact then id
    users: Vec<(String, NodeId)>,
    decls: Declarations,
    model: Option<String>,
    skipped: Vec<(usize, BlifError)>,
}

/// Netlist flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Blif,
    /// BLIF with `.conn`, `.cname`, `.attr` and `.param`
    Eblif,
}

/// How a file is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub skip_blank: bool,
    pub trim_trailing_ws: bool,
    /// `None` guesses from the file extension and the directives used
    pub dialect: Option<Dialect>,
    /// Skip cells whose output cannot be determined instead of failing
    pub allow_incomplete: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_blank: true,
            trim_trailing_ws: true,
            dialect: None,
            allow_incomplete: false,
        }
    }
}
