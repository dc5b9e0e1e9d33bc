use std::path::{Path, PathBuf};

use crate::{
    builder::Declarations,
    consumer::NetlistConsumer,
    error::{BlifError, Diagnostic, LineError},
    lines::LineBuf,
    raw::Directive,
    sink::DiagnosticSink,
    Dialect, Netlist, ReadOptions,
};

/// A BLIF or EBLIF file being read and validated.
///
/// [`BlifFile::read_blif`] loads the lines and the port declarations,
/// [`BlifFile::check_blif`] builds and links the netlist and runs every check.
/// Only the first failure is reported.
#[derive(Debug)]
pub struct BlifFile {
    path: PathBuf,
    opts: ReadOptions,
    /// In-memory contents, read instead of `path`
    source: Option<String>,
    lines: LineBuf,
    dialect: Dialect,
    decls: Option<Declarations>,
    netlist: Option<Netlist>,
    error: Option<Diagnostic>,
}

impl BlifFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, ReadOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, opts: ReadOptions) -> Self {
        Self {
            path: path.into(),
            opts,
            source: None,
            lines: LineBuf::default(),
            dialect: Dialect::default(),
            decls: None,
            netlist: None,
            error: None,
        }
    }

    /// A netlist held in memory; `name` is used for dialect detection and diagnostics
    pub fn from_source(name: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(name)
        }
    }

    pub fn options_mut(&mut self) -> &mut ReadOptions {
        &mut self.opts
    }

    /// Read the file and its `.inputs`/`.outputs` declarations, dropping any
    /// previously built netlist.
    pub fn read_blif(&mut self) -> Result<(), Diagnostic> {
        let res = self.read();
        self.finish(res)
    }

    fn read(&mut self) -> Result<(), LineError> {
        self.decls = None;
        self.netlist = None;
        self.error = None;

        self.lines = match &self.source {
            Some(source) if source.is_empty() => {
                return Err(BlifError::FileEmpty(self.path.clone()).into())
            }
            Some(source) => LineBuf::from_source(source.as_str()),
            None => LineBuf::read(&self.path)?,
        };
        if !self
            .lines
            .make_lines(self.opts.skip_blank, self.opts.trim_trailing_ws)
        {
            return Err(BlifError::FileEmpty(self.path.clone()).into());
        }
        self.lines.escape_nl();
        self.dialect = self.opts.dialect.unwrap_or_else(|| self.detect_dialect());
        log::debug!(
            "{}: {} lines, {:?}",
            self.path.display(),
            self.lines.len(),
            self.dialect
        );

        self.decls = Some(Declarations::scan(&self.lines)?);
        Ok(())
    }

    fn detect_dialect(&self) -> Dialect {
        let eblif_ext = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("eblif"));
        let eblif_directive = || {
            self.lines
                .iter()
                .filter_map(|(idx, text)| Directive::parse(idx, text))
                .any(|d| d.keyword.is_eblif())
        };
        if eblif_ext || eblif_directive() {
            Dialect::Eblif
        } else {
            Dialect::Blif
        }
    }

    /// Validate the netlist, reading the file first if needed.
    ///
    /// Checks run in a fixed order: duplicate and overlapping declarations,
    /// malformed cells, linking, undriven outputs. The first failure is
    /// reported to `sink`, kept in [`BlifFile::error`] and returned.
    pub fn check_blif(&mut self, sink: &mut dyn DiagnosticSink) -> Result<(), Diagnostic> {
        let res = self.check(sink);
        if let Err(err) = &res {
            sink.report(err.line, &err.error.to_string());
        }
        self.finish(res)
    }

    fn check(&mut self, sink: &mut dyn DiagnosticSink) -> Result<(), LineError> {
        if self.decls.is_none() {
            self.read()?;
        }
        let Some(decls) = self.decls.clone() else {
            return Err(BlifError::MissingDirective.into());
        };

        if let Some(name) = decls.duplicate_input() {
            return Err(LineError::new(
                decls.inputs_line,
                BlifError::DuplicateDeclaredName {
                    directive: ".inputs".to_owned(),
                    name: name.to_owned(),
                },
            ));
        }
        if let Some(name) = decls.duplicate_output() {
            return Err(LineError::new(
                decls.outputs_line,
                BlifError::DuplicateDeclaredName {
                    directive: ".outputs".to_owned(),
                    name: name.to_owned(),
                },
            ));
        }
        if let Some(name) = decls.overlap() {
            return Err(LineError::new(
                decls.outputs_line,
                BlifError::DeclarationOverlap(name.to_owned()),
            ));
        }

        let outputs_line = decls.outputs_line;
        let netlist = Netlist::build(&self.lines, decls, self.dialect, sink)?;
        let netlist = self.netlist.insert(netlist);
        if !self.opts.allow_incomplete {
            if let Some((line, err)) = netlist.skipped().first() {
                return Err(LineError::new(*line, err.clone()));
            }
        }

        netlist.link()?;

        if let Some(port) = netlist.undriven_output() {
            return Err(LineError::new(
                outputs_line,
                BlifError::UndrivenOutputPort(netlist.node(port).output_contact.clone()),
            ));
        }
        log::debug!("{}: netlist is valid", self.path.display());
        Ok(())
    }

    fn finish(&mut self, res: Result<(), LineError>) -> Result<(), Diagnostic> {
        res.map_err(|err| {
            let diag = err.in_file(&self.path);
            self.error = Some(diag.clone());
            diag
        })
    }

    /// Hand ports and cells to a consumer
    pub fn emit(&self, consumer: &mut dyn NetlistConsumer) {
        let Some(decls) = &self.decls else {
            return;
        };
        let mut inputs = decls.inputs.clone();
        inputs.dedup();
        let mut outputs = decls.outputs.clone();
        outputs.dedup();
        consumer.set_inputs(&inputs);
        consumer.set_outputs(&outputs);
        if let Some(netlist) = &self.netlist {
            for node in netlist.fabric_in_order() {
                consumer.add_cell(node);
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &LineBuf {
        &self.lines
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Sorted `.inputs` names, empty before a successful read
    pub fn inputs(&self) -> &[String] {
        self.decls
            .as_ref()
            .map(|d| d.inputs.as_slice())
            .unwrap_or_default()
    }

    /// Sorted `.outputs` names, empty before a successful read
    pub fn outputs(&self) -> &[String] {
        self.decls
            .as_ref()
            .map(|d| d.outputs.as_slice())
            .unwrap_or_default()
    }

    /// The netlist from the last [`BlifFile::check_blif`]. Partially linked if
    /// the check failed after building.
    pub fn netlist(&self) -> Option<&Netlist> {
        self.netlist.as_ref()
    }

    /// First failure of the last read or check
    pub fn error(&self) -> Option<&Diagnostic> {
        self.error.as_ref()
    }

    /// Logical line of the last failure, 0 if none
    pub fn err_line(&self) -> usize {
        self.error.as_ref().map_or(0, |e| e.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sink::NullSink, PortLists};

    #[test]
    fn dialect_from_extension_and_directives() {
        let mut f = BlifFile::from_source("t.eblif", ".inputs a\n.outputs z\n.names a z\n");
        f.read_blif().unwrap();
        assert_eq!(f.dialect(), Dialect::Eblif);

        let mut f = BlifFile::from_source("t.blif", ".inputs a\n.outputs z\n.names a z\n");
        f.read_blif().unwrap();
        assert_eq!(f.dialect(), Dialect::Blif);

        let mut f = BlifFile::from_source(
            "t.blif",
            ".inputs a\n.outputs z\n.names a z\n1 1\n.cname buf\n",
        );
        f.read_blif().unwrap();
        assert_eq!(f.dialect(), Dialect::Eblif);
    }

    #[test]
    fn reread_resets_state() {
        let mut f = BlifFile::from_source("t.blif", ".inputs a\n.outputs z\n.names a z\n");
        f.check_blif(&mut NullSink).unwrap();
        assert!(f.netlist().is_some());
        f.read_blif().unwrap();
        assert!(f.netlist().is_none());
        assert!(f.error().is_none());
    }

    #[test]
    fn empty_source() {
        let mut f = BlifFile::from_source("t.blif", "");
        let err = f.read_blif().unwrap_err();
        assert_eq!(err.error, BlifError::FileEmpty(PathBuf::from("t.blif")));
    }

    #[test]
    fn blank_source_is_empty() {
        let mut f = BlifFile::from_source("t.blif", "\n  \t\n\n");
        let err = f.read_blif().unwrap_err();
        assert_eq!(err.error, BlifError::FileEmpty(PathBuf::from("t.blif")));
    }

    #[test]
    fn emit_hands_over_ports_and_cells() {
        let mut f = BlifFile::from_source(
            "t.blif",
            ".inputs b a\n.outputs z\n.names a b t\n11 1\n.gate INV A=t Y=z\n",
        );
        f.check_blif(&mut NullSink).unwrap();
        let mut lists = PortLists::default();
        f.emit(&mut lists);
        assert_eq!(lists.inputs, vec!["a", "b"]);
        assert_eq!(lists.outputs, vec!["z"]);
        assert_eq!(lists.cells.len(), 2);
        assert_eq!(lists.cells[1].model.as_deref(), Some("INV"));
        assert_eq!(lists.cells[1].output, "z");
    }
}
