use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

#[test]
fn multiplication_binds_tighter_than_addition() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run("set $x = 2 + 3 * 4\nprint $x", RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["14".to_owned()]);
}
