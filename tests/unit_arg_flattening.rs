use rustainer::{flatten_args, Arg, CommandRequest, ExecOptions, OptionSet};

/// Three-level nesting flattens depth-first into the flat ordered argv.
#[test]
fn test_three_level_nesting() {
    let args = vec![
        Arg::from("a"),
        Arg::List(vec![
            Arg::from("b"),
            Arg::List(vec![Arg::from("c"), Arg::from("d")]),
        ]),
        Arg::from("e"),
    ];
    assert_eq!(flatten_args(&args), ["a", "b", "c", "d", "e"]);
}

#[test]
fn test_option_set_as_fragment() {
    let mut set = OptionSet::new();
    set.add_all(["--pwd", "/work"]);
    let req = CommandRequest::new("apptainer")
        .arg("exec")
        .arg(Arg::from(&set))
        .arg("alpine.sif")
        .arg("ls");
    assert_eq!(
        req.argv(),
        ["apptainer", "exec", "--pwd", "/work", "alpine.sif", "ls"]
    );
}

#[test]
fn test_builder_tokens_as_fragment() {
    let mut opts = ExecOptions::new();
    opts.contain().env("A", "1");
    let req = CommandRequest::new("apptainer")
        .arg("exec")
        .arg(Arg::from(opts.tokens()))
        .arg("alpine.sif");
    assert_eq!(
        req.argv(),
        ["apptainer", "exec", "--contain", "--env", "A=1", "alpine.sif"]
    );
}

#[test]
fn test_deeply_nested_mixed_fragments() {
    let inner: Arg = vec![Arg::from("x"), Arg::from(vec!["y".to_string(), "z".to_string()])].into();
    let args = vec![Arg::from("start"), inner, Arg::from("end")];
    assert_eq!(flatten_args(&args), ["start", "x", "y", "z", "end"]);
}
