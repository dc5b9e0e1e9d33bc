use std::io::Write;

use blif_netlist::{
    BlifError, BlifFile, Dialect, NodeKind, NullSink, PortLists, ReadOptions,
};
use rstest::*;

macro_rules! test_data {
    ($fname:expr) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/", $fname)
    };
}

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn check(src: &str) -> Result<BlifFile, blif_netlist::Diagnostic> {
    init_log();
    let mut f = BlifFile::from_source("test.blif", src);
    f.check_blif(&mut NullSink)?;
    Ok(f)
}

fn check_err(src: &str) -> (usize, BlifError) {
    let err = check(src).map(|_| ()).unwrap_err();
    (err.line, err.error)
}

#[test]
fn adder_is_valid() {
    init_log();
    let mut f = BlifFile::new(test_data!("adder.eblif"));
    f.check_blif(&mut NullSink).unwrap();
    assert_eq!(f.dialect(), Dialect::Eblif);
    assert_eq!(f.inputs(), ["a", "b", "cin", "clk", "rst"]);
    assert_eq!(f.outputs(), ["cout", "sum"]);

    let n = f.netlist().unwrap();
    assert_eq!(n.model(), Some("adder"));
    assert_eq!(n.fabric().len(), 4);
    let reg = n.node(n.find_fabric("sum").unwrap());
    assert_eq!(reg.kind, NodeKind::Subckt);
    assert_eq!(reg.cname.as_deref(), Some("sum_reg"));
    assert_eq!(reg.parent, n.find_output_port("sum"));

    let cout = n.node(n.find_fabric("cout").unwrap());
    assert_eq!(cout.tokens, vec!["a", "b", "cin", "cout"]);
}

#[test]
fn mux_is_valid() {
    init_log();
    let mut f = BlifFile::new(test_data!("mux.blif"));
    f.check_blif(&mut NullSink).unwrap();
    assert_eq!(f.dialect(), Dialect::Blif);

    let mut lists = PortLists::default();
    f.emit(&mut lists);
    assert_eq!(lists.inputs, vec!["a", "b", "s"]);
    assert_eq!(lists.outputs, vec!["y"]);
    let outputs: Vec<&str> = lists.cells.iter().map(|c| c.output.as_str()).collect();
    assert_eq!(outputs, vec!["ns", "t0", "t1", "y"]);
}

#[test]
fn dangling_file_reports_line_and_sink() {
    init_log();
    let mut f = BlifFile::new(test_data!("dangling.blif"));
    let mut reports: Vec<(usize, String)> = vec![];
    let err = f.check_blif(&mut reports).unwrap_err();
    assert_eq!(err.error, BlifError::DanglingCellOutput("w".to_owned()));
    assert_eq!(err.line, 4);
    assert!(err.to_string().ends_with("dangling.blif:4: output w of fabric cell is not consumed"));
    assert_eq!(reports.last().map(|r| r.0), Some(4));
    assert_eq!(f.error(), Some(&err));
    assert_eq!(f.err_line(), 4);
}

#[test]
fn missing_file() {
    let mut f = BlifFile::new(test_data!("no_such_file.blif"));
    let err = f.read_blif().unwrap_err();
    assert!(matches!(err.error, BlifError::FileNotFound(_)));
    assert_eq!(err.line, 0);
}

#[test]
fn empty_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut f = BlifFile::new(file.path());
    let err = f.check_blif(&mut NullSink).unwrap_err();
    assert!(matches!(err.error, BlifError::FileEmpty(_)));
}

#[test]
fn directory_is_not_accessible() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = BlifFile::new(dir.path());
    let err = f.read_blif().unwrap_err();
    assert!(matches!(err.error, BlifError::FileNotAccessible(..)));
}

#[test]
fn continuation_matches_prejoined_file() {
    let mut joined = tempfile::Builder::new().suffix(".blif").tempfile().unwrap();
    write!(joined, ".inputs a b\n.outputs z\n.names a b z\n11 1\n").unwrap();
    let mut split = tempfile::Builder::new().suffix(".blif").tempfile().unwrap();
    write!(split, ".inputs a \\\n b\n.outputs z\n.names a \\\nb \\\n z\n11 1\n").unwrap();

    let nodes = |path: &std::path::Path| {
        let mut f = BlifFile::new(path);
        f.check_blif(&mut NullSink).unwrap();
        f.netlist()
            .unwrap()
            .nodes()
            .iter()
            .map(|n| (n.kind, n.tokens.clone(), n.output_contact.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(nodes(joined.path()), nodes(split.path()));
}

#[test]
fn scenario_a_valid() {
    let f = check(".inputs a b\n.outputs z\n.names a b z\n").unwrap();
    let n = f.netlist().unwrap();
    let cell = n.find_fabric("z").unwrap();
    assert_eq!(n.driver_of("z"), Some(cell));
    assert_eq!(n.consumers_of("a"), vec![cell]);
    assert_eq!(n.consumers_of("b"), vec![cell]);
    let out = n.find_output_port("z").unwrap();
    assert_eq!(n.node(out).children, vec![cell]);
}

#[test]
fn scenario_b_dangling_before_undriven() {
    assert_eq!(
        check_err(".inputs a\n.outputs z\n.names a w\n"),
        (3, BlifError::DanglingCellOutput("w".to_owned()))
    );
}

#[test]
fn scenario_c_reset_pin_before_output() {
    let f = check(".inputs a b rst\n.outputs sum\n.subckt ADDER A=a B=b R=rst O=sum\n").unwrap();
    let n = f.netlist().unwrap();
    let adder = n.node(n.find_fabric("sum").unwrap());
    assert_eq!(adder.output_contact, "sum");
    assert_eq!(n.find_fabric("rst"), None);
}

#[test]
fn scenario_d_overlap() {
    assert_eq!(
        check_err(".inputs clk\n.outputs clk\n.names clk clk\n"),
        (2, BlifError::DeclarationOverlap("clk".to_owned()))
    );
}

#[rstest]
#[case(
    ".inputs a b a\n.outputs z\n.names a b z\n",
    1,
    BlifError::DuplicateDeclaredName { directive: ".inputs".to_owned(), name: "a".to_owned() }
)]
#[case(
    ".inputs a b a\n.outputs a\n",
    1,
    BlifError::DuplicateDeclaredName { directive: ".inputs".to_owned(), name: "a".to_owned() }
)]
#[case(
    ".inputs a\n.outputs z z\n.names a z\n",
    2,
    BlifError::DuplicateDeclaredName { directive: ".outputs".to_owned(), name: "z".to_owned() }
)]
#[case(".model m\n.end\n", 0, BlifError::MissingDirective)]
#[case(".inputs\n.outputs\n.names a z\n", 2, BlifError::EmptyDeclaration)]
#[case(".inputs a\n.outputs y z\n.names a y\n", 2, BlifError::UndrivenOutputPort("z".to_owned()))]
#[case(".inputs a b\n.outputs z\n.names a z\n", 1, BlifError::DanglingInputPort("b".to_owned()))]
#[case(".inputs a\n.outputs z\n.end\n", 0, BlifError::IncompleteDesign)]
#[case(".inputs q\n.outputs z\n.names p=q z\n", 1, BlifError::DanglingInputPort("q".to_owned()))]
fn first_failure_is_reported(
    #[case] src: &str,
    #[case] line: usize,
    #[case] expected: BlifError,
) {
    assert_eq!(check_err(src), (line, expected));
}

#[test]
fn names_tokens_are_nets_as_written() {
    let f = check(".inputs p=q\n.outputs z\n.names p=q z\n").unwrap();
    let n = f.netlist().unwrap();
    let cell = n.find_fabric("z").unwrap();
    assert_eq!(n.consumers_of("p=q"), vec![cell]);
    assert!(n.consumers_of("q").is_empty());

    let f = check(".inputs q\n.outputs z\n.gate BUF A=q Y=z\n").unwrap();
    let n = f.netlist().unwrap();
    assert_eq!(n.consumers_of("q"), vec![n.find_fabric("z").unwrap()]);
}

#[test]
fn incomplete_cell_fails_unless_allowed() {
    let src = ".inputs a\n.outputs z\n.subckt LUT1 a y\n.names a z\n";
    let (line, err) = check_err(src);
    assert_eq!(line, 3);
    assert!(matches!(err, BlifError::IncompleteCell { .. }));

    let mut f = BlifFile::from_source("test.blif", src);
    f.options_mut().allow_incomplete = true;
    f.check_blif(&mut NullSink).unwrap();
    assert_eq!(f.netlist().unwrap().skipped().len(), 1);
}

#[test]
fn output_feeding_reset_pin_is_accepted() {
    let src = ".inputs d c\n.outputs rst q\n.names c rst\n.subckt DFF D=d C=c R=rst Q=q\n";
    check(src).unwrap();
    let (line, err) = check_err(
        ".inputs d c\n.outputs rst q\n.names c rst\n.subckt DFF D=rst C=c Q=q\n",
    );
    assert_eq!(line, 4);
    assert_eq!(err, BlifError::OutputContactsFabricInput("rst".to_owned()));
}

#[test]
fn lines_are_logical() {
    init_log();
    let mut f = BlifFile::from_source("test.blif", "\n\n.inputs a\n\n.outputs z\n.names a w\n");
    let err = f.check_blif(&mut NullSink).unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(f.lines().raw_line(err.line), Some(6));

    let mut f = BlifFile::from_source("test.blif", "\n\n.inputs a\n\n.outputs z\n.names a w\n");
    *f.options_mut() = ReadOptions {
        skip_blank: false,
        ..Default::default()
    };
    let err = f.check_blif(&mut NullSink).unwrap_err();
    assert_eq!(err.line, 6);
}

#[test]
fn forced_dialect_ignores_eblif_directives() {
    let src = ".inputs a\n.outputs z\n.conn a z\n";
    let mut f = BlifFile::from_source("test.eblif", src);
    f.check_blif(&mut NullSink).unwrap();

    let mut f = BlifFile::from_source("test.eblif", src);
    f.options_mut().dialect = Some(Dialect::Blif);
    let err = f.check_blif(&mut NullSink).unwrap_err();
    assert_eq!(err.error, BlifError::IncompleteDesign);
}

#[rstest]
#[case(1, 1)]
#[case(3, 2)]
#[case(8, 5)]
fn well_formed_netlist_round_trip(#[case] n_in: usize, #[case] n_out: usize) {
    let inputs: Vec<String> = (0..n_in).map(|i| format!("i{i}")).collect();
    let outputs: Vec<String> = (0..n_out).map(|o| format!("o{o}")).collect();
    let mut src = format!(
        ".model gen\n.inputs {}\n.outputs {}\n",
        inputs.join(" "),
        outputs.join(" ")
    );
    for i in 0..n_in {
        src += &format!(".names i{i} b{i}\n1 1\n");
    }
    let buffers: Vec<String> = (0..n_in).map(|i| format!("b{i}")).collect();
    for o in 0..n_out {
        src += &format!(".names {} o{o}\n", buffers.join(" "));
    }
    src += ".end\n";

    let f = check(&src).unwrap();
    let n = f.netlist().unwrap();
    assert_eq!(n.top_inputs().len(), n_in);
    assert_eq!(n.top_outputs().len(), n_out);
    assert_eq!(n.fabric().len(), n_in + n_out);
    for &port in n.top_outputs() {
        assert!(!n.node(port).children.is_empty());
    }
}
