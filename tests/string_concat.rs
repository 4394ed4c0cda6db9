use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

#[test]
fn plus_concatenates_strings() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run("set $s = \"ab\"\nprint $s + \"c\"", RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["abc".to_owned()]);
}
