use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

#[test]
fn loop_exposes_a_zero_based_dollar_i() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run("loop 3 { print $i }", RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["0".to_owned(), "1".to_owned(), "2".to_owned()]);
}
